//! # User-Role Manager
//!
//! Assignment of persisted roles to users. Role names are resolved to ids
//! before anything is attached, so an unknown name never leaves a partial
//! assignment behind.

use std::sync::Arc;

use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::store::{RoleId, RoleStore, UserId, UserRoleStore};

/// Manages which persisted roles a user holds.
pub struct UserRoleManager {
    user_roles: Arc<dyn UserRoleStore>,
    roles: Arc<dyn RoleStore>,
}

impl UserRoleManager {
    /// Create a manager over the given stores.
    pub fn new(user_roles: Arc<dyn UserRoleStore>, roles: Arc<dyn RoleStore>) -> Self {
        Self { user_roles, roles }
    }

    /// Role names assigned to the user, in assignment order.
    pub fn roles(&self, user: UserId) -> SyncResult<Vec<String>> {
        Ok(self.user_roles.list_role_names_by_user_id(user)?)
    }

    /// The user's first assigned role, if any.
    pub fn role(&self, user: UserId) -> SyncResult<Option<String>> {
        Ok(self.roles(user)?.into_iter().next())
    }

    /// The user's first assigned role.
    ///
    /// # Errors
    ///
    /// [`SyncError::RoleNotAssigned`] when the user has no roles.
    pub fn require_role(&self, user: UserId) -> SyncResult<String> {
        self.role(user)?.ok_or(SyncError::RoleNotAssigned)
    }

    /// All assigned role names.
    ///
    /// # Errors
    ///
    /// [`SyncError::RoleNotAssigned`] when the user has no roles.
    pub fn require_roles(&self, user: UserId) -> SyncResult<Vec<String>> {
        let roles = self.roles(user)?;
        if roles.is_empty() {
            return Err(SyncError::RoleNotAssigned);
        }
        Ok(roles)
    }

    /// Assign one role to the user, keeping existing assignments.
    pub fn assign_role(&self, user: UserId, role_name: &str) -> SyncResult<()> {
        self.assign_roles(user, [role_name], false)
    }

    /// Assign roles to the user.
    ///
    /// With `replace` set, every current assignment is detached first; the
    /// role list then becomes exactly `role_names`. Without it, only the
    /// missing assignments are attached.
    ///
    /// # Errors
    ///
    /// [`SyncError::RoleNotFound`] when any name has no persisted role; no
    /// assignment is touched in that case.
    pub fn assign_roles<I, S>(&self, user: UserId, role_names: I, replace: bool) -> SyncResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in role_names {
            let name = name.as_ref();
            if !names.iter().any(|seen| seen == name) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() {
            if replace {
                self.user_roles.detach_all(user)?;
            }
            return Ok(());
        }

        let role_ids = self.resolve_role_ids(&names)?;

        if replace {
            self.user_roles.detach_all(user)?;
            for role_id in &role_ids {
                self.user_roles.attach(user, *role_id)?;
            }
            debug!(%user, roles = names.len(), "replaced role assignments");
            return Ok(());
        }

        let current = self.user_roles.list_role_ids_by_user_id(user)?;
        for role_id in role_ids {
            if !current.contains(&role_id) {
                self.user_roles.attach(user, role_id)?;
            }
        }

        Ok(())
    }

    /// Remove one role from the user.
    ///
    /// # Errors
    ///
    /// [`SyncError::RoleNotFound`] when the name has no persisted role.
    pub fn remove_role(&self, user: UserId, role_name: &str) -> SyncResult<()> {
        let Some(role_id) = self.roles.find_id_by_name(role_name)? else {
            return Err(SyncError::RoleNotFound(role_name.to_string()));
        };
        self.user_roles.detach(user, role_id)?;
        Ok(())
    }

    /// Replace the user's assignments with exactly `role_names`.
    pub fn replace_roles<I, S>(&self, user: UserId, role_names: I) -> SyncResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.assign_roles(user, role_names, true)
    }

    fn resolve_role_ids(&self, names: &[String]) -> SyncResult<Vec<RoleId>> {
        let mut role_ids = Vec::with_capacity(names.len());
        for name in names {
            let Some(role_id) = self.roles.find_id_by_name(name)? else {
                return Err(SyncError::RoleNotFound(name.clone()));
            };
            if !role_ids.contains(&role_id) {
                role_ids.push(role_id);
            }
        }
        Ok(role_ids)
    }
}
