//! # Role Definitions
//!
//! Declarative descriptions of roles: an allow-all flag, explicit grants,
//! and explicit denials. Definitions are built with a consuming builder and
//! become effectively immutable once handed to the compile or sync step.

use serde::{Deserialize, Serialize};

use crate::catalog::PermissionDefinition;
use crate::resolver::PermissionGrant;

/// A named bundle of allow/deny permission decisions.
///
/// # Example
///
/// ```
/// use palisade_rbac::{Action, PermissionGrant, RoleDefinition};
///
/// let editor = RoleDefinition::named("editor")
///     .label("Editor")
///     .allow(PermissionGrant::new("article").with_actions([Action::Read, Action::Update]))
///     .allow("comment.base.read")
///     .deny("article.base.delete");
///
/// assert_eq!(editor.name, "editor");
/// assert_eq!(editor.grants().len(), 2);
/// assert_eq!(editor.denied(), ["article.base.delete"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Role name; the join key into compiled maps and the persistent store.
    pub name: String,
    /// Optional human-readable label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether this role carries the admin-access flag.
    #[serde(default)]
    pub admin_access: bool,
    /// Whether this role is the root role.
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    allow_all: bool,
    #[serde(default)]
    grants: Vec<PermissionGrant>,
    #[serde(default)]
    denied: Vec<String>,
}

impl RoleDefinition {
    /// Create a plain role.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            admin_access: false,
            root: false,
            allow_all: false,
            grants: Vec::new(),
            denied: Vec::new(),
        }
    }

    /// Create a role with the admin-access flag set.
    pub fn admin(name: impl Into<String>) -> Self {
        let mut role = Self::named(name);
        role.admin_access = true;
        role
    }

    /// Create the root role: admin access plus the root flag.
    pub fn root(name: impl Into<String>) -> Self {
        let mut role = Self::admin(name);
        role.root = true;
        role
    }

    /// Set the human-readable label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Grant every permission in the catalog.
    ///
    /// Denials still apply; deny always wins over allow-all.
    pub fn allow_all(mut self) -> Self {
        self.allow_all = true;
        self
    }

    /// Add one grant.
    pub fn allow(mut self, grant: impl Into<PermissionGrant>) -> Self {
        self.grants.push(grant.into());
        self
    }

    /// Add several grants.
    pub fn allow_many<I, G>(mut self, grants: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<PermissionGrant>,
    {
        self.grants.extend(grants.into_iter().map(Into::into));
        self
    }

    /// Deny a permission name. Blank names are ignored.
    pub fn deny(mut self, permission: impl Into<String>) -> Self {
        let permission = permission.into();
        let permission = permission.trim();
        if !permission.is_empty() {
            self.denied.push(permission.to_string());
        }
        self
    }

    /// Whether this role grants the whole catalog.
    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    /// Declared grants, in declaration order.
    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    /// Declared denials, in declaration order.
    pub fn denied(&self) -> &[String] {
        &self.denied
    }
}

/// Immutable aggregate of role definitions plus catalog inputs.
///
/// Produced once per compilation/synchronization cycle by a definition
/// provider; never partially applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleDefinitionSet {
    /// Declared roles.
    pub roles: Vec<RoleDefinition>,
    /// Identifiers of registered resource models contributing to the
    /// catalog.
    #[serde(default)]
    pub permission_models: Vec<String>,
    /// Extra permission definitions outside any model.
    #[serde(default)]
    pub permissions: Vec<PermissionDefinition>,
}

impl RoleDefinitionSet {
    /// Create a definition set from its parts.
    pub fn new(
        roles: Vec<RoleDefinition>,
        permission_models: Vec<String>,
        permissions: Vec<PermissionDefinition>,
    ) -> Self {
        Self {
            roles,
            permission_models,
            permissions,
        }
    }
}
