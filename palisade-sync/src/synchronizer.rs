//! # Role Synchronizer
//!
//! Converges a persistent roles/permissions store to the declared
//! definition set: creates missing rows, updates labels and flags, deletes
//! obsolete rows (detaching links first), and diffs each role's attached
//! permissions against its resolved grants.
//!
//! A run is idempotent: re-running against an unchanged definition set
//! issues no further mutations. There is no rollback; a store failure
//! aborts the run and a later re-run completes the convergence. Runs are
//! not safe to execute concurrently against the same store; callers
//! serialize them.

use std::collections::BTreeSet;
use std::sync::Arc;

use palisade_rbac::{
    ModelRegistry, PermissionCatalog, PermissionDefinition, PermissionNameFormatter,
    PermissionResolver, RoleDefinitionProvider, RoleDefinitionSet,
};
use tracing::{debug, info};

use crate::error::SyncResult;
use crate::plan::RoleSyncPlan;
use crate::store::{PermissionId, PermissionStore, RolePermissionStore, RoleStore};

/// Synchronizes declared roles and permissions into the store.
pub struct RoleSynchronizer {
    definitions: Arc<dyn RoleDefinitionProvider>,
    permissions: Arc<dyn PermissionStore>,
    roles: Arc<dyn RoleStore>,
    role_permissions: Arc<dyn RolePermissionStore>,
    registry: Arc<ModelRegistry>,
    resolver: PermissionResolver,
    catalog: PermissionCatalog,
}

impl RoleSynchronizer {
    /// Create a synchronizer with the default permission-name formatter.
    pub fn new(
        definitions: Arc<dyn RoleDefinitionProvider>,
        permissions: Arc<dyn PermissionStore>,
        roles: Arc<dyn RoleStore>,
        role_permissions: Arc<dyn RolePermissionStore>,
        registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            definitions,
            permissions,
            roles,
            role_permissions,
            resolver: PermissionResolver::new(registry.clone()),
            catalog: PermissionCatalog::new(registry.clone()),
            registry,
        }
    }

    /// Replace the permission-name formatter.
    ///
    /// The same formatter must be used on the read path, or names will not
    /// compare equal across compile and sync.
    pub fn with_formatter(mut self, formatter: Arc<dyn PermissionNameFormatter>) -> Self {
        self.resolver =
            PermissionResolver::with_formatter(self.registry.clone(), formatter.clone());
        self.catalog = PermissionCatalog::with_formatter(self.registry.clone(), formatter);
        self
    }

    /// Converge the store to the declared definition set.
    ///
    /// # Errors
    ///
    /// Definition/model errors and store failures abort the run; partial
    /// convergence is possible and a re-run completes it.
    pub fn sync(&self) -> SyncResult<()> {
        let set = self.definitions.load()?;
        let definitions = self
            .catalog
            .build(&set.permission_models, &set.permissions)?;

        let existing_permissions = self.permissions.list_ids_by_name()?;
        let mut permission_ids = existing_permissions.clone();
        let expected_permissions = self.expected_permissions(&set, &definitions);

        // Catalog definitions: create missing rows, refresh labels.
        for definition in &definitions {
            match permission_ids.get(&definition.name) {
                Some(&id) => {
                    if let Some(label) = &definition.label {
                        self.permissions.update_label(id, Some(label))?;
                    }
                }
                None => {
                    let id = self
                        .permissions
                        .create(&definition.name, definition.label.as_deref())?;
                    debug!(permission = %definition.name, %id, "created permission");
                    permission_ids.insert(definition.name.clone(), id);
                }
            }
        }

        // Names referenced only via grants or denials still need rows.
        for name in &expected_permissions {
            if !permission_ids.contains_key(name) {
                let id = self.permissions.create(name, None)?;
                debug!(permission = %name, %id, "created referenced permission");
                permission_ids.insert(name.clone(), id);
            }
        }

        // Obsolete permissions: detach from every role before deleting.
        let mut obsolete_permission_ids = BTreeSet::new();
        for (name, id) in &existing_permissions {
            if !expected_permissions.contains(name) {
                obsolete_permission_ids.insert(*id);
                permission_ids.remove(name);
            }
        }
        for id in &obsolete_permission_ids {
            self.role_permissions.detach_by_permission_id(*id)?;
        }
        if !obsolete_permission_ids.is_empty() {
            let ids: Vec<PermissionId> = obsolete_permission_ids.iter().copied().collect();
            self.permissions.delete_by_ids(&ids)?;
            debug!(count = ids.len(), "deleted obsolete permissions");
        }

        // Obsolete roles, same detach-before-delete ordering.
        let existing_roles = self.roles.list_ids_by_name()?;
        let expected_roles: BTreeSet<&str> =
            set.roles.iter().map(|role| role.name.as_str()).collect();
        let mut obsolete_role_ids = BTreeSet::new();
        for (name, id) in &existing_roles {
            if !expected_roles.contains(name.as_str()) {
                obsolete_role_ids.insert(*id);
            }
        }
        for id in &obsolete_role_ids {
            self.role_permissions.detach_by_role_id(*id)?;
        }
        if !obsolete_role_ids.is_empty() {
            let ids: Vec<_> = obsolete_role_ids.iter().copied().collect();
            self.roles.delete_by_ids(&ids)?;
            debug!(count = ids.len(), "deleted obsolete roles");
        }

        // Declared roles: upsert the row, then diff attached permissions.
        for role in &set.roles {
            let role_id = match self.roles.find_id_by_name(&role.name)? {
                Some(id) => {
                    self.roles
                        .update(&role.name, role.label.as_deref(), role.admin_access)?;
                    id
                }
                None => {
                    let id = self
                        .roles
                        .create(&role.name, role.label.as_deref(), role.admin_access)?;
                    debug!(role = %role.name, %id, "created role");
                    id
                }
            };

            let mut allowed: BTreeSet<String> = if role.allows_all() {
                permission_ids.keys().cloned().collect()
            } else {
                role.grants()
                    .iter()
                    .flat_map(|grant| self.resolver.resolve(grant))
                    .collect()
            };
            for deny in role.denied() {
                for name in self.resolver.resolve_name(deny) {
                    allowed.remove(&name);
                }
            }

            let mut target_ids = BTreeSet::new();
            for name in &allowed {
                let id = match permission_ids.get(name) {
                    Some(&id) => id,
                    None => {
                        let id = self.permissions.create(name, None)?;
                        permission_ids.insert(name.clone(), id);
                        id
                    }
                };
                target_ids.insert(id);
            }

            let current: BTreeSet<PermissionId> = self
                .role_permissions
                .list_permission_ids(role_id)?
                .into_iter()
                .collect();

            for id in target_ids.difference(&current) {
                self.role_permissions.attach(role_id, *id)?;
                debug!(role = %role.name, permission_id = %id, "attached permission");
            }
            for id in current.difference(&target_ids) {
                self.role_permissions.detach(role_id, *id)?;
                debug!(role = %role.name, permission_id = %id, "detached permission");
            }
        }

        info!(
            roles = set.roles.len(),
            permissions = permission_ids.len(),
            "role synchronization complete"
        );

        Ok(())
    }

    /// Compute the diff without mutating the store.
    pub fn plan(&self) -> SyncResult<RoleSyncPlan> {
        let set = self.definitions.load()?;
        let definitions = self
            .catalog
            .build(&set.permission_models, &set.permissions)?;

        let expected_permissions = self.expected_permissions(&set, &definitions);
        let existing_permissions = self.permissions.list_ids_by_name()?;

        let permissions_to_create = expected_permissions
            .iter()
            .filter(|name| !existing_permissions.contains_key(*name))
            .cloned()
            .collect();
        let permissions_to_delete = existing_permissions
            .keys()
            .filter(|name| !expected_permissions.contains(*name))
            .cloned()
            .collect();

        let expected_roles: BTreeSet<&str> =
            set.roles.iter().map(|role| role.name.as_str()).collect();
        let existing_roles = self.roles.list_ids_by_name()?;

        let roles_to_create = expected_roles
            .iter()
            .filter(|&&name| !existing_roles.contains_key(name))
            .map(|name| name.to_string())
            .collect();
        let roles_to_delete = existing_roles
            .keys()
            .filter(|name| !expected_roles.contains(name.as_str()))
            .cloned()
            .collect();

        Ok(RoleSyncPlan {
            roles_to_create,
            roles_to_delete,
            permissions_to_create,
            permissions_to_delete,
        })
    }

    /// Every permission name the declarations expect to exist: the catalog
    /// plus everything resolved from grants and denials. Denied names get
    /// rows too, so they can be referenced and audited.
    fn expected_permissions(
        &self,
        set: &RoleDefinitionSet,
        definitions: &[PermissionDefinition],
    ) -> BTreeSet<String> {
        let mut expected: BTreeSet<String> = definitions
            .iter()
            .map(|definition| definition.name.clone())
            .collect();

        for role in &set.roles {
            for grant in role.grants() {
                expected.extend(self.resolver.resolve(grant));
            }
            for deny in role.denied() {
                expected.extend(self.resolver.resolve_name(deny));
            }
        }

        expected
    }
}
