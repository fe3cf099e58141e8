//! # Permission Resolver
//!
//! Expands a single grant into the list of concrete permission names it
//! covers. A grant may reference a registered resource model, spell out an
//! explicit `resource`/`actions`/`scope` triple, or just be a raw
//! permission name.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::actions::ActionRef;
use crate::model::ModelRegistry;
use crate::naming::{DefaultPermissionNameFormatter, PermissionNameFormatter, DEFAULT_SCOPE};

/// A declarative request to allow one or more permissions.
///
/// `resource` may name a registered resource model, or be a plain resource
/// slug, or — when `actions` is absent — a literal permission name.
///
/// # Example
///
/// ```
/// use palisade_rbac::{Action, PermissionGrant};
///
/// // Literal permission name
/// let literal = PermissionGrant::new("admin.access");
///
/// // Explicit triple
/// let triple = PermissionGrant::new("article")
///     .with_actions([Action::Read, Action::Update])
///     .with_scope("own");
/// assert_eq!(triple.scope.as_deref(), Some("own"));
/// # let _ = literal;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Model identifier, resource slug, or literal permission name.
    pub resource: String,
    /// Actions to expand; when absent the model's own actions apply, or the
    /// resource is taken as a literal permission name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionRef>>,
    /// Scope override; defaults to the model's scope or [`DEFAULT_SCOPE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl PermissionGrant {
    /// Create a grant for a resource or literal permission name.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            actions: None,
            scope: None,
        }
    }

    /// Set the actions to expand.
    pub fn with_actions<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionRef>,
    {
        self.actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    /// Set the scope segment.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

impl From<&str> for PermissionGrant {
    fn from(resource: &str) -> Self {
        PermissionGrant::new(resource)
    }
}

impl From<String> for PermissionGrant {
    fn from(resource: String) -> Self {
        PermissionGrant::new(resource)
    }
}

/// Expands grants into concrete permission names.
///
/// Resolution rules:
/// - `resource` names a registered model: the model's scope and actions
///   apply unless the grant overrides them.
/// - plain `resource` with no `actions`: the trimmed resource is the
///   permission name itself (empty resolves to nothing).
/// - plain `resource` with `actions`: one name per action, scope defaulting
///   to [`DEFAULT_SCOPE`].
pub struct PermissionResolver {
    formatter: Arc<dyn PermissionNameFormatter>,
    registry: Arc<ModelRegistry>,
}

impl PermissionResolver {
    /// Create a resolver with the default formatter.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self::with_formatter(registry, Arc::new(DefaultPermissionNameFormatter::new()))
    }

    /// Create a resolver with a custom formatter.
    pub fn with_formatter(
        registry: Arc<ModelRegistry>,
        formatter: Arc<dyn PermissionNameFormatter>,
    ) -> Self {
        Self { formatter, registry }
    }

    /// Resolve a grant into the permission names it covers.
    ///
    /// Order follows the grant's action order; duplicates are kept (callers
    /// collect into sets).
    pub fn resolve(&self, grant: &PermissionGrant) -> Vec<String> {
        if let Some(model) = self.registry.get(&grant.resource) {
            let scope = grant.scope.clone().unwrap_or_else(|| model.scope());
            let actions = grant.actions.clone().unwrap_or_else(|| model.actions());
            return self.expand(&model.resource(), &actions, &scope);
        }

        match &grant.actions {
            None => {
                let name = grant.resource.trim();
                if name.is_empty() {
                    Vec::new()
                } else {
                    vec![name.to_string()]
                }
            }
            Some(actions) => {
                let scope = grant.scope.as_deref().unwrap_or(DEFAULT_SCOPE);
                self.expand(&grant.resource, actions, scope)
            }
        }
    }

    /// Resolve a plain string grant: a registered model identifier expands
    /// to the model's permissions, anything else is a literal name.
    pub fn resolve_name(&self, name: &str) -> Vec<String> {
        self.resolve(&PermissionGrant::new(name))
    }

    fn expand(&self, resource: &str, actions: &[ActionRef], scope: &str) -> Vec<String> {
        actions
            .iter()
            .map(|action| self.formatter.format(resource, action.value(), scope))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::model::ResourceModel;

    struct ArticlePermission;

    impl ResourceModel for ArticlePermission {}

    struct ReportPermission;

    impl ResourceModel for ReportPermission {
        fn resource(&self) -> String {
            "report".to_string()
        }

        fn scope(&self) -> String {
            "own".to_string()
        }

        fn actions(&self) -> Vec<ActionRef> {
            vec![Action::Read.into(), Action::Update.into(), Action::Delete.into()]
        }
    }

    fn resolver() -> PermissionResolver {
        let registry = Arc::new(
            ModelRegistry::new()
                .register(ArticlePermission)
                .register(ReportPermission),
        );
        PermissionResolver::new(registry)
    }

    #[test]
    fn test_resolve_model_identifier() {
        let mut names = resolver().resolve_name("ReportPermission");
        names.sort();
        assert_eq!(
            names,
            vec!["report.own.delete", "report.own.read", "report.own.update"]
        );
    }

    #[test]
    fn test_resolve_literal_name() {
        assert_eq!(
            resolver().resolve_name("  admin.access  "),
            vec!["admin.access"]
        );
        assert!(resolver().resolve_name("   ").is_empty());
    }

    #[test]
    fn test_resolve_model_grant_uses_model_defaults() {
        let grant = PermissionGrant::new("ArticlePermission");
        let names = resolver().resolve(&grant);
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"article.base.read".to_string()));
    }

    #[test]
    fn test_resolve_model_grant_with_overrides() {
        let grant = PermissionGrant::new("ReportPermission")
            .with_actions([Action::Read])
            .with_scope("team");
        assert_eq!(resolver().resolve(&grant), vec!["report.team.read"]);
    }

    #[test]
    fn test_resolve_plain_grant_without_actions_is_literal() {
        let grant = PermissionGrant::new("article.base.read");
        assert_eq!(resolver().resolve(&grant), vec!["article.base.read"]);
    }

    #[test]
    fn test_resolve_plain_grant_with_actions_expands() {
        let grant = PermissionGrant::new("comment").with_actions([Action::Read, Action::Delete]);
        assert_eq!(
            resolver().resolve(&grant),
            vec!["comment.base.read", "comment.base.delete"]
        );
    }

    #[test]
    fn test_resolve_plain_grant_with_custom_action_and_scope() {
        let grant = PermissionGrant::new("comment")
            .with_actions(["moderate"])
            .with_scope("own");
        assert_eq!(resolver().resolve(&grant), vec!["comment.own.moderate"]);
    }
}
