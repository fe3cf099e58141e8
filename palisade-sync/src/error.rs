//! Error types for synchronization and role-management operations.

use palisade_rbac::RbacError;
use thiserror::Error;

use crate::store::StoreError;

/// Synchronization and role-management error types.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Loading or resolving the declarative definitions failed
    #[error(transparent)]
    Definitions(#[from] RbacError),

    /// A store operation failed; the current run was aborted
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A role referenced by name does not exist in the store
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// The user has no assigned roles where one is required
    #[error("user has no assigned roles")]
    RoleNotAssigned,
}

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;
