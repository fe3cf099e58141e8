//! # Store Contracts
//!
//! Collaborator contracts for the persistent roles/permissions store. The
//! synchronizer issues discrete read/write calls against these traits and
//! trusts implementations to provide their own consistency; row ids are
//! owned by the store layer and opaque to the engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque id of a persisted permission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionId(pub i64);

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque id of a persisted role row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(pub i64);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque id of a user known to the store layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A failed store operation (connectivity, constraint violation, ...).
///
/// Store implementations construct these; the synchronizer propagates them
/// unmodified and aborts the current run.
#[derive(Debug, Error)]
#[error("store operation failed: {message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent permission rows, keyed by canonical name.
pub trait PermissionStore: Send + Sync {
    /// Find a permission id by name.
    fn find_id_by_name(&self, name: &str) -> StoreResult<Option<PermissionId>>;

    /// Create a permission row; returns the new id.
    fn create(&self, name: &str, label: Option<&str>) -> StoreResult<PermissionId>;

    /// Update a permission's label.
    fn update_label(&self, id: PermissionId, label: Option<&str>) -> StoreResult<()>;

    /// List every permission as a name-to-id map.
    fn list_ids_by_name(&self) -> StoreResult<BTreeMap<String, PermissionId>>;

    /// Delete permission rows by id.
    fn delete_by_ids(&self, ids: &[PermissionId]) -> StoreResult<()>;
}

/// Persistent role rows, keyed by name.
pub trait RoleStore: Send + Sync {
    /// Find a role id by name.
    fn find_id_by_name(&self, name: &str) -> StoreResult<Option<RoleId>>;

    /// Create a role row; returns the new id.
    fn create(&self, name: &str, label: Option<&str>, admin_access: bool) -> StoreResult<RoleId>;

    /// Overwrite a role's label and admin-access flag.
    fn update(&self, name: &str, label: Option<&str>, admin_access: bool) -> StoreResult<()>;

    /// List every role as a name-to-id map.
    fn list_ids_by_name(&self) -> StoreResult<BTreeMap<String, RoleId>>;

    /// Delete role rows by id.
    fn delete_by_ids(&self, ids: &[RoleId]) -> StoreResult<()>;
}

/// Role-to-permission links.
pub trait RolePermissionStore: Send + Sync {
    /// Permission ids attached to a role.
    fn list_permission_ids(&self, role_id: RoleId) -> StoreResult<Vec<PermissionId>>;

    /// Attach a permission to a role.
    fn attach(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()>;

    /// Detach a permission from a role.
    fn detach(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()>;

    /// Detach every permission from a role.
    fn detach_by_role_id(&self, role_id: RoleId) -> StoreResult<()>;

    /// Detach a permission from every role.
    fn detach_by_permission_id(&self, permission_id: PermissionId) -> StoreResult<()>;
}

/// User-to-role assignments.
pub trait UserRoleStore: Send + Sync {
    /// Role ids assigned to a user.
    fn list_role_ids_by_user_id(&self, user_id: UserId) -> StoreResult<Vec<RoleId>>;

    /// Role names assigned to a user, in assignment order.
    fn list_role_names_by_user_id(&self, user_id: UserId) -> StoreResult<Vec<String>>;

    /// Assign a role to a user.
    fn attach(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()>;

    /// Remove a role from a user.
    fn detach(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()>;

    /// Remove every role from a user.
    fn detach_all(&self, user_id: UserId) -> StoreResult<()>;
}
