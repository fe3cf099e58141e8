//! # Role-Permission Map
//!
//! Compiles role definitions, the catalog, and the resolver into a
//! read-optimized per-role set of allowed/denied permission names. The
//! compiled map is immutable, holds no reference to the source
//! definitions, and is safe to share across concurrent authorization
//! checks; rebuild it whenever the definition set changes.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::PermissionCatalog;
use crate::definition::RoleDefinitionSet;
use crate::error::RbacResult;
use crate::resolver::PermissionResolver;

/// Compiled decision object for one role.
///
/// Deny always wins over allow, including over the allow-all flag.
#[derive(Debug, Clone)]
pub struct RolePermissionSet {
    /// Role name.
    pub name: String,
    /// Whether the role was granted the whole catalog.
    pub allow_all: bool,
    /// Whether the role carries the admin-access flag.
    pub admin_access: bool,
    /// Whether the role is the root role.
    pub root: bool,
    allowed: BTreeSet<String>,
    denied: BTreeSet<String>,
}

impl RolePermissionSet {
    /// The authorization primitive: is this permission allowed?
    ///
    /// Checks, in order: denied (always `false`), allow-all (always
    /// `true`), then allowed-set membership.
    pub fn allows(&self, permission: &str) -> bool {
        if self.denied.contains(permission) {
            return false;
        }
        if self.allow_all {
            return true;
        }
        self.allowed.contains(permission)
    }

    /// Allowed permission names, in sorted order.
    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    /// Denied permission names, in sorted order.
    pub fn denied(&self) -> impl Iterator<Item = &str> {
        self.denied.iter().map(String::as_str)
    }
}

/// Immutable mapping from role name to compiled permission set.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use palisade_rbac::{
///     ModelRegistry, PermissionCatalog, PermissionResolver, RoleDefinition, RoleDefinitionSet,
///     RolePermissionMap,
/// };
///
/// let registry = Arc::new(ModelRegistry::new());
/// let resolver = PermissionResolver::new(registry.clone());
/// let catalog = PermissionCatalog::new(registry);
///
/// let set = RoleDefinitionSet::new(
///     vec![RoleDefinition::named("editor")
///         .allow("article.base.read")
///         .deny("article.base.delete")],
///     vec![],
///     vec![],
/// );
///
/// let map = RolePermissionMap::build(&set, &resolver, &catalog).unwrap();
/// let editor = map.role("editor").unwrap();
/// assert!(editor.allows("article.base.read"));
/// assert!(!editor.allows("article.base.delete"));
/// ```
#[derive(Debug, Clone)]
pub struct RolePermissionMap {
    roles: BTreeMap<String, RolePermissionSet>,
}

impl RolePermissionMap {
    /// Compile a definition set into a decision map.
    ///
    /// Duplicate role names take map semantics: the last definition wins.
    ///
    /// # Errors
    ///
    /// [`crate::RbacError::InvalidModel`] when the set references an
    /// unregistered resource model.
    pub fn build(
        definitions: &RoleDefinitionSet,
        resolver: &PermissionResolver,
        catalog: &PermissionCatalog,
    ) -> RbacResult<Self> {
        let all_permissions: BTreeSet<String> = catalog
            .build(&definitions.permission_models, &definitions.permissions)?
            .into_iter()
            .map(|definition| definition.name)
            .collect();

        let mut roles = BTreeMap::new();
        for role in &definitions.roles {
            let mut allowed: BTreeSet<String> = if role.allows_all() {
                all_permissions.clone()
            } else {
                role.grants()
                    .iter()
                    .flat_map(|grant| resolver.resolve(grant))
                    .collect()
            };

            let denied: BTreeSet<String> = role
                .denied()
                .iter()
                .flat_map(|name| resolver.resolve_name(name))
                .collect();

            for name in &denied {
                allowed.remove(name);
            }

            roles.insert(
                role.name.clone(),
                RolePermissionSet {
                    name: role.name.clone(),
                    allow_all: role.allows_all(),
                    admin_access: role.admin_access,
                    root: role.root,
                    allowed,
                    denied,
                },
            );
        }

        Ok(Self { roles })
    }

    /// Look up one role's compiled set.
    pub fn role(&self, name: &str) -> Option<&RolePermissionSet> {
        self.roles.get(name)
    }

    /// Iterate over all compiled sets.
    pub fn all(&self) -> impl Iterator<Item = &RolePermissionSet> {
        self.roles.values()
    }

    /// Get the count of compiled roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
