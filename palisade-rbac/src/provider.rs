//! # Role Definition Providers
//!
//! A provider supplies a [`RoleDefinitionSet`] from some declarative
//! source: typed values, JSON files on disk, or a composition of other
//! providers. All providers validate on load and fail fast on a malformed
//! definition; a set is never partially registered.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::PermissionDefinition;
use crate::definition::{RoleDefinition, RoleDefinitionSet};
use crate::error::{RbacError, RbacResult};
use crate::resolver::PermissionGrant;

/// Supplies role definition sets from a declarative source.
pub trait RoleDefinitionProvider: Send + Sync {
    /// Load the full definition set.
    ///
    /// # Errors
    ///
    /// [`RbacError::InvalidDefinition`] for malformed definitions (empty
    /// role names, unreadable sources); nothing is partially loaded.
    fn load(&self) -> RbacResult<RoleDefinitionSet>;
}

fn validate(set: &RoleDefinitionSet) -> RbacResult<()> {
    for role in &set.roles {
        if role.name.trim().is_empty() {
            return Err(RbacError::InvalidDefinition(
                "role name must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Provider over an in-memory list of typed definitions.
///
/// # Example
///
/// ```
/// use palisade_rbac::{
///     PermissionDefinition, RoleDefinition, RoleDefinitionProvider, StaticRoleDefinitionProvider,
/// };
///
/// let provider = StaticRoleDefinitionProvider::new(vec![
///     RoleDefinition::admin("admin").allow_all(),
///     RoleDefinition::named("viewer").allow("article.base.read"),
/// ])
/// .with_permissions(vec![PermissionDefinition::labeled("admin.access", "Admin area")]);
///
/// let set = provider.load().unwrap();
/// assert_eq!(set.roles.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRoleDefinitionProvider {
    set: RoleDefinitionSet,
}

impl StaticRoleDefinitionProvider {
    /// Create a provider over the given roles.
    pub fn new(roles: Vec<RoleDefinition>) -> Self {
        Self {
            set: RoleDefinitionSet::new(roles, Vec::new(), Vec::new()),
        }
    }

    /// Create a provider over a complete definition set.
    pub fn from_set(set: RoleDefinitionSet) -> Self {
        Self { set }
    }

    /// Add resource-model identifiers contributing to the catalog.
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set
            .permission_models
            .extend(models.into_iter().map(Into::into));
        self
    }

    /// Add extra permission definitions outside any model.
    pub fn with_permissions(mut self, permissions: Vec<PermissionDefinition>) -> Self {
        self.set.permissions.extend(permissions);
        self
    }
}

impl RoleDefinitionProvider for StaticRoleDefinitionProvider {
    fn load(&self) -> RbacResult<RoleDefinitionSet> {
        validate(&self.set)?;
        Ok(self.set.clone())
    }
}

/// Provider that merges the sets of other providers, in order.
///
/// Later providers append to earlier ones; duplicate role names keep map
/// semantics downstream (the compiled map takes the last definition).
pub struct CompositeRoleDefinitionProvider {
    providers: Vec<Box<dyn RoleDefinitionProvider>>,
}

impl CompositeRoleDefinitionProvider {
    /// Create a composite over the given providers.
    pub fn new(providers: Vec<Box<dyn RoleDefinitionProvider>>) -> Self {
        Self { providers }
    }

    /// Append another provider.
    pub fn push(mut self, provider: Box<dyn RoleDefinitionProvider>) -> Self {
        self.providers.push(provider);
        self
    }
}

impl RoleDefinitionProvider for CompositeRoleDefinitionProvider {
    fn load(&self) -> RbacResult<RoleDefinitionSet> {
        let mut merged = RoleDefinitionSet::default();

        for provider in &self.providers {
            let set = provider.load()?;
            merged.roles.extend(set.roles);
            merged.permission_models.extend(set.permission_models);
            merged.permissions.extend(set.permissions);
        }

        validate(&merged)?;
        Ok(merged)
    }
}

/// Provider that loads JSON role definition documents from disk.
///
/// Each configured path may be a file, a directory (walked recursively for
/// `.json` files), or a pattern containing `*` (expanded via glob). Files
/// are loaded in sorted path order and their `roles`, `models`, and
/// `permissions` keys merged.
///
/// Document shape:
///
/// ```json
/// {
///   "roles": [
///     {
///       "name": "editor",
///       "label": "Editor",
///       "permissions": [
///         "comment.base.read",
///         { "resource": "ArticlePermission", "actions": ["read", "update"] }
///       ],
///       "deny": ["article.base.delete"]
///     }
///   ],
///   "models": ["ArticlePermission"],
///   "permissions": { "admin.access": "Admin area" }
/// }
/// ```
pub struct JsonFileRoleDefinitionProvider {
    paths: Vec<PathBuf>,
}

impl JsonFileRoleDefinitionProvider {
    /// Create a provider over one path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }

    /// Add another path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    fn collect_files(&self) -> RbacResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                files.push(path.clone());
                continue;
            }

            let raw = path.to_string_lossy();
            if raw.contains('*') {
                let matches = glob::glob(&raw).map_err(|error| {
                    RbacError::InvalidDefinition(format!(
                        "invalid role definition pattern {raw}: {error}"
                    ))
                })?;
                for entry in matches {
                    let matched = entry.map_err(|error| RbacError::DefinitionIo {
                        path: error.path().to_path_buf(),
                        source: error.into_error(),
                    })?;
                    if matched.is_file() {
                        files.push(matched);
                    }
                }
                continue;
            }

            if path.is_dir() {
                collect_json_files(path, &mut files)?;
                continue;
            }

            return Err(RbacError::InvalidDefinition(format!(
                "role definition file not found: {}",
                path.display()
            )));
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

impl RoleDefinitionProvider for JsonFileRoleDefinitionProvider {
    fn load(&self) -> RbacResult<RoleDefinitionSet> {
        let mut merged = RoleDefinitionSet::default();

        for file in self.collect_files()? {
            let contents = fs::read_to_string(&file).map_err(|source| RbacError::DefinitionIo {
                path: file.clone(),
                source,
            })?;
            let document: RoleDocument =
                serde_json::from_str(&contents).map_err(|source| RbacError::DefinitionParse {
                    path: file.clone(),
                    source,
                })?;

            for entry in document.roles {
                merged.roles.push(entry.into_definition()?);
            }
            merged.permission_models.extend(document.models);
            merged
                .permissions
                .extend(document.permissions.into_definitions());
        }

        validate(&merged)?;
        Ok(merged)
    }
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> RbacResult<()> {
    let entries = fs::read_dir(dir).map_err(|source| RbacError::DefinitionIo {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| RbacError::DefinitionIo {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    Ok(())
}

/// One role definition document.
#[derive(Debug, Default, Deserialize)]
struct RoleDocument {
    #[serde(default)]
    roles: Vec<RoleEntry>,
    #[serde(default, alias = "permission_models")]
    models: Vec<String>,
    #[serde(default)]
    permissions: ExtraPermissions,
}

#[derive(Debug, Deserialize)]
struct RoleEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    admin_access: bool,
    #[serde(default)]
    root: bool,
    #[serde(default, alias = "allow_all")]
    all: bool,
    #[serde(default)]
    permissions: Vec<GrantEntry>,
    #[serde(default, alias = "except")]
    deny: Vec<String>,
}

impl RoleEntry {
    fn into_definition(self) -> RbacResult<RoleDefinition> {
        if self.name.trim().is_empty() {
            return Err(RbacError::InvalidDefinition(
                "role name is required".to_string(),
            ));
        }

        let mut role = RoleDefinition::named(self.name);
        role.label = self.label;
        role.admin_access = self.admin_access;
        role.root = self.root;

        if self.all {
            role = role.allow_all();
        }
        for grant in self.permissions {
            match grant {
                GrantEntry::Name(name) => role = role.allow(name),
                GrantEntry::Grant(grant) => {
                    if !grant.resource.trim().is_empty() {
                        role = role.allow(grant);
                    }
                }
            }
        }
        for permission in self.deny {
            role = role.deny(permission);
        }

        Ok(role)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GrantEntry {
    Name(String),
    Grant(PermissionGrant),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtraPermissions {
    List(Vec<String>),
    Map(BTreeMap<String, Option<String>>),
}

impl Default for ExtraPermissions {
    fn default() -> Self {
        ExtraPermissions::List(Vec::new())
    }
}

impl ExtraPermissions {
    fn into_definitions(self) -> Vec<PermissionDefinition> {
        match self {
            ExtraPermissions::List(names) => {
                names.into_iter().map(PermissionDefinition::new).collect()
            }
            ExtraPermissions::Map(entries) => entries
                .into_iter()
                .map(|(name, label)| PermissionDefinition { name, label })
                .collect(),
        }
    }
}
