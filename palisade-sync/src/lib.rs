//! # Palisade Sync (Role Store Synchronization)
//!
//! The write path of the Palisade RBAC crates: this crate keeps a
//! persistent roles/permissions store converged with the declarative
//! definitions that `palisade-rbac` compiles for the read path.
//!
//! ## Overview
//!
//! The palisade-sync crate handles:
//! - **Store Contracts**: permission, role, role-permission, and user-role
//!   store traits implemented by the persistence layer
//! - **Role Synchronizer**: diffs declared against persisted state and
//!   issues the minimal create/update/delete/attach/detach operations
//! - **Sync Plans**: the same diff as a dry-run report
//! - **User-Role Manager**: assignment of persisted roles to users
//! - **In-Memory Stores**: reference implementations for tests
//!
//! ## Architecture
//!
//! ```text
//! Provider -> RoleDefinitionSet -> RoleSynchronizer -> {PermissionStore,
//!                                                       RoleStore,
//!                                                       RolePermissionStore}
//! ```
//!
//! Synchronization is idempotent and convergent: running it twice with no
//! intervening definition change issues zero additional mutations, and a
//! run aborted by a store failure is completed by the next run. Obsolete
//! rows are detached from every role before deletion, so the store never
//! holds a dangling role-permission link.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use palisade_rbac::{ModelRegistry, RoleDefinition, StaticRoleDefinitionProvider};
//! use palisade_sync::{
//!     MemoryPermissionStore, MemoryRolePermissionStore, MemoryRoleStore, RoleSynchronizer,
//! };
//!
//! let provider = Arc::new(StaticRoleDefinitionProvider::new(vec![
//!     RoleDefinition::admin("admin").allow_all(),
//!     RoleDefinition::named("viewer").allow("article.base.read"),
//! ]));
//!
//! let permissions = Arc::new(MemoryPermissionStore::new());
//! let roles = Arc::new(MemoryRoleStore::new());
//! let role_permissions = Arc::new(MemoryRolePermissionStore::new());
//!
//! let synchronizer = RoleSynchronizer::new(
//!     provider,
//!     permissions.clone(),
//!     roles.clone(),
//!     role_permissions,
//!     Arc::new(ModelRegistry::new()),
//! );
//!
//! let plan = synchronizer.plan().unwrap();
//! assert!(plan.has_changes());
//!
//! synchronizer.sync().unwrap();
//! assert_eq!(roles.names(), vec!["admin", "viewer"]);
//! assert!(!synchronizer.plan().unwrap().has_changes());
//! ```

pub mod error;
pub mod manager;
pub mod memory;
pub mod plan;
pub mod store;
pub mod synchronizer;

// Re-export main types for convenience
pub use error::{SyncError, SyncResult};
pub use manager::UserRoleManager;
pub use memory::{
    MemoryPermissionStore, MemoryRolePermissionStore, MemoryRoleStore, MemoryUserRoleStore,
};
pub use plan::RoleSyncPlan;
pub use store::{
    PermissionId, PermissionStore, RoleId, RolePermissionStore, RoleStore, StoreError,
    StoreResult, UserId, UserRoleStore,
};
pub use synchronizer::RoleSynchronizer;
