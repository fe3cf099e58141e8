//! # Permission Policies
//!
//! A secondary, orthogonal gate evaluated after the RBAC decision already
//! passed: per-permission or wildcard-pattern rules checked against the
//! current user and an optional subject. The registry permits by default
//! when no rule matches; registered rules can only narrow access, never
//! widen it.

use std::any::Any;

use regex::Regex;

/// A policy rule: `(user, subject, permission) -> bool`.
pub type PolicyRule<U> = Box<dyn Fn(&U, Option<&dyn Any>, &str) -> bool + Send + Sync>;

struct PolicyEntry<U> {
    key: String,
    pattern: Option<Regex>,
    rule: PolicyRule<U>,
}

/// Registry of per-permission and wildcard policy rules.
///
/// Rules registered under the same key overwrite each other (map
/// semantics). When several distinct rules match one permission, all of
/// them must return `true`; a single denying rule blocks access.
///
/// Note: when *no* rule matches, the registry permits. This fail-open
/// default means the registry only ever narrows an RBAC decision; wire it
/// behind [`crate::PermissionGate`] rather than using it standalone.
///
/// # Example
///
/// ```
/// use palisade_rbac::PermissionPolicyRegistry;
///
/// struct User {
///     verified: bool,
/// }
///
/// let mut policies = PermissionPolicyRegistry::new();
/// policies.define_pattern("article.*", |user: &User, _subject, _permission| user.verified);
///
/// let verified = User { verified: true };
/// let unverified = User { verified: false };
///
/// assert!(policies.allows(&verified, "article.base.read", None));
/// assert!(!policies.allows(&unverified, "article.base.read", None));
/// // No rule matches: permitted by default.
/// assert!(policies.allows(&unverified, "comment.base.read", None));
/// ```
pub struct PermissionPolicyRegistry<U> {
    policies: Vec<PolicyEntry<U>>,
}

impl<U> PermissionPolicyRegistry<U> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Register a rule for an exact permission name.
    pub fn define<F>(&mut self, permission: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&U, Option<&dyn Any>, &str) -> bool + Send + Sync + 'static,
    {
        self.insert(permission.into(), Box::new(rule));
        self
    }

    /// Register a rule for a wildcard pattern.
    ///
    /// `*` matches zero or more characters; everything else is literal.
    pub fn define_pattern<F>(&mut self, pattern: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&U, Option<&dyn Any>, &str) -> bool + Send + Sync + 'static,
    {
        self.insert(pattern.into(), Box::new(rule));
        self
    }

    fn insert(&mut self, key: String, rule: PolicyRule<U>) {
        if let Some(entry) = self.policies.iter_mut().find(|entry| entry.key == key) {
            entry.rule = rule;
            return;
        }

        let pattern = key.contains('*').then(|| compile_pattern(&key));
        self.policies.push(PolicyEntry { key, pattern, rule });
    }

    /// Evaluate every rule matching `permission`.
    ///
    /// Returns `true` when no rule matches (open policy with explicit
    /// overrides only), otherwise `true` only if every matched rule agrees.
    pub fn allows(&self, user: &U, permission: &str, subject: Option<&dyn Any>) -> bool {
        for entry in &self.policies {
            let applies = entry.key == permission
                || entry
                    .pattern
                    .as_ref()
                    .is_some_and(|pattern| pattern.is_match(permission));
            if !applies {
                continue;
            }

            if !(entry.rule)(user, subject, permission) {
                return false;
            }
        }

        true
    }

    /// Get the count of registered rules.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl<U> Default for PermissionPolicyRegistry<U> {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_pattern(pattern: &str) -> Regex {
    let escaped = regex::escape(pattern).replace("\\*", ".*");
    // An escaped pattern with `.*` substitutions is always a valid regex.
    Regex::new(&format!("^{escaped}$")).expect("wildcard pattern compiles")
}

/// Ownership rules for `own`-scoped permissions.
///
/// Builds policy rules that compare the current user's id against the
/// subject's owner id; the rule denies when the subject is absent, has a
/// different type, or either id is unknown.
pub struct OwnershipPolicy;

impl OwnershipPolicy {
    /// Build an ownership rule from two id extractors.
    ///
    /// # Example
    ///
    /// ```
    /// use palisade_rbac::{OwnershipPolicy, PermissionPolicyRegistry};
    ///
    /// struct User { id: u64 }
    /// struct Article { owner_id: u64 }
    ///
    /// let mut policies = PermissionPolicyRegistry::new();
    /// policies.define(
    ///     "article.own.update",
    ///     OwnershipPolicy::by(
    ///         |user: &User| Some(user.id.to_string()),
    ///         |article: &Article| Some(article.owner_id.to_string()),
    ///     ),
    /// );
    ///
    /// let user = User { id: 7 };
    /// let own = Article { owner_id: 7 };
    /// let foreign = Article { owner_id: 9 };
    ///
    /// assert!(policies.allows(&user, "article.own.update", Some(&own)));
    /// assert!(!policies.allows(&user, "article.own.update", Some(&foreign)));
    /// assert!(!policies.allows(&user, "article.own.update", None));
    /// ```
    pub fn by<U, S, FU, FO>(user_id: FU, owner_id: FO) -> PolicyRule<U>
    where
        S: 'static,
        FU: Fn(&U) -> Option<String> + Send + Sync + 'static,
        FO: Fn(&S) -> Option<String> + Send + Sync + 'static,
    {
        Box::new(move |user, subject, _permission| {
            let Some(subject) = subject.and_then(|subject| subject.downcast_ref::<S>()) else {
                return false;
            };
            match (user_id(user), owner_id(subject)) {
                (Some(user), Some(owner)) => user == owner,
                _ => false,
            }
        })
    }
}
