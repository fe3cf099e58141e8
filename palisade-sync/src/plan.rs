//! # Sync Plans
//!
//! A dry-run report of what [`crate::RoleSynchronizer::sync`] would change,
//! computed without issuing any store mutation.

use serde::{Deserialize, Serialize};

/// The diff between declared and persisted roles/permissions.
///
/// Each list is lexicographically sorted for deterministic display and
/// testing. Computed fresh per `plan()` call; read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSyncPlan {
    /// Declared roles absent from the store.
    pub roles_to_create: Vec<String>,
    /// Persisted roles absent from the declarations.
    pub roles_to_delete: Vec<String>,
    /// Expected permissions absent from the store.
    pub permissions_to_create: Vec<String>,
    /// Persisted permissions absent from the expectations.
    pub permissions_to_delete: Vec<String>,
}

impl RoleSyncPlan {
    /// Whether applying this plan would mutate the store at all.
    pub fn has_changes(&self) -> bool {
        !self.roles_to_create.is_empty()
            || !self.roles_to_delete.is_empty()
            || !self.permissions_to_create.is_empty()
            || !self.permissions_to_delete.is_empty()
    }
}
