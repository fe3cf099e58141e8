//! # Palisade RBAC (Role-Based Access Control)
//!
//! This crate turns declarative role/permission definitions into fast
//! authorization decisions for the Palisade platform.
//!
//! ## Overview
//!
//! The palisade-rbac crate handles:
//! - **Permission Naming**: canonical `resource.scope.action` names
//! - **Resource Models**: typed declarations of permission-bearing entities
//! - **Permission Catalog**: every permission name a system defines
//! - **Permission Resolver**: expanding grants into concrete names
//! - **Role Definitions**: declarative allow/deny bundles per role
//! - **Role-Permission Map**: the compiled, read-optimized decision structure
//! - **Policies and Gate**: per-permission callback rules layered on RBAC
//!
//! ## Architecture
//!
//! ```text
//! Provider -> RoleDefinitionSet -> {Catalog, Resolver} -> RolePermissionMap
//!
//! Permission name = resource.scope.action
//!
//! Examples:
//!   "article.base.read"     - Read any article
//!   "article.own.update"    - Update own articles
//!   "admin.access"          - Enter the admin area
//! ```
//!
//! The compiled [`RolePermissionMap`] is immutable and safe to share
//! read-only across concurrent checks; rebuild it whenever the definition
//! set changes. Deny always wins over allow, including over a role's
//! allow-all flag.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use palisade_rbac::{
//!     Action, ModelRegistry, PermissionCatalog, PermissionGrant, PermissionResolver,
//!     ResourceModel, RoleDefinition, RoleDefinitionSet, RolePermissionMap,
//! };
//!
//! // A typed resource model; defaults cover scope, actions, and labels.
//! struct ArticlePermission;
//! impl ResourceModel for ArticlePermission {}
//!
//! let registry = Arc::new(ModelRegistry::new().register(ArticlePermission));
//! let resolver = PermissionResolver::new(registry.clone());
//! let catalog = PermissionCatalog::new(registry);
//!
//! // Declare roles.
//! let set = RoleDefinitionSet::new(
//!     vec![
//!         RoleDefinition::admin("admin").allow_all(),
//!         RoleDefinition::named("editor")
//!             .allow(PermissionGrant::new("ArticlePermission").with_actions([Action::Read, Action::Update]))
//!             .deny("article.base.delete"),
//!     ],
//!     vec!["ArticlePermission".to_string()],
//!     vec![],
//! );
//!
//! // Compile and decide.
//! let map = RolePermissionMap::build(&set, &resolver, &catalog).unwrap();
//! let editor = map.role("editor").unwrap();
//! assert!(editor.allows("article.base.read"));
//! assert!(!editor.allows("article.base.delete"));
//! ```
//!
//! ## Integration with palisade-sync
//!
//! The write path lives in `palisade-sync`: it shares this crate's catalog
//! and resolver to diff declared roles/permissions against a persistent
//! store and converge the store to the declarations.

pub mod actions;
pub mod catalog;
pub mod checker;
pub mod definition;
pub mod error;
pub mod map;
pub mod model;
pub mod naming;
pub mod policy;
pub mod provider;
pub mod resolver;

// Re-export main types for convenience
pub use actions::{Action, ActionRef};
pub use catalog::{PermissionCatalog, PermissionDefinition};
pub use checker::{
    DefinitionPermissionChecker, NullPermissionChecker, PermissionChecker, PermissionGate,
    RoleResolver, ADMIN_PERMISSION,
};
pub use definition::{RoleDefinition, RoleDefinitionSet};
pub use error::{RbacError, RbacResult};
pub use map::{RolePermissionMap, RolePermissionSet};
pub use model::{ModelRegistry, ResourceModel};
pub use naming::{
    normalize_resource_name, DefaultPermissionNameFormatter, PermissionNameFormatter,
    DEFAULT_SCOPE,
};
pub use policy::{OwnershipPolicy, PermissionPolicyRegistry, PolicyRule};
pub use provider::{
    CompositeRoleDefinitionProvider, JsonFileRoleDefinitionProvider, RoleDefinitionProvider,
    StaticRoleDefinitionProvider,
};
pub use resolver::{PermissionGrant, PermissionResolver};
