//! # Permission Catalog
//!
//! Enumerates every permission name a system defines, from registered
//! resource models and from ad-hoc name lists, deduplicated by name.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RbacError, RbacResult};
use crate::model::ModelRegistry;
use crate::naming::{DefaultPermissionNameFormatter, PermissionNameFormatter};

/// One grantable capability: a canonical name plus an optional label.
///
/// Identity is the `name`; catalogs deduplicate by it, last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    /// Canonical permission name, e.g. `article.base.read`.
    pub name: String,
    /// Optional human-readable label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PermissionDefinition {
    /// Create an unlabeled definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }

    /// Create a labeled definition.
    pub fn labeled(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
        }
    }
}

/// Builds the full list of permission definitions a system declares.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use palisade_rbac::{ModelRegistry, PermissionCatalog, PermissionDefinition, ResourceModel};
///
/// struct ArticlePermission;
/// impl ResourceModel for ArticlePermission {}
///
/// let registry = Arc::new(ModelRegistry::new().register(ArticlePermission));
/// let catalog = PermissionCatalog::new(registry);
///
/// let definitions = catalog
///     .build(
///         &["ArticlePermission".to_string()],
///         &[PermissionDefinition::labeled("admin.access", "Admin area")],
///     )
///     .unwrap();
///
/// assert!(definitions.iter().any(|d| d.name == "article.base.read"));
/// assert!(definitions.iter().any(|d| d.name == "admin.access"));
/// ```
pub struct PermissionCatalog {
    formatter: Arc<dyn PermissionNameFormatter>,
    registry: Arc<ModelRegistry>,
}

impl PermissionCatalog {
    /// Create a catalog with the default `resource.scope.action` formatter.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self::with_formatter(registry, Arc::new(DefaultPermissionNameFormatter::new()))
    }

    /// Create a catalog with a custom formatter.
    pub fn with_formatter(
        registry: Arc<ModelRegistry>,
        formatter: Arc<dyn PermissionNameFormatter>,
    ) -> Self {
        Self { formatter, registry }
    }

    /// Build the deduplicated list of permission definitions.
    ///
    /// Expands each model identifier via [`PermissionCatalog::from_model`],
    /// appends the extra definitions (blank names are skipped), and
    /// deduplicates by name. A repeated name keeps its first-seen position
    /// but takes the last-written definition.
    ///
    /// # Errors
    ///
    /// [`RbacError::InvalidModel`] when a model identifier is not
    /// registered; no partial entries from that model are emitted.
    pub fn build(
        &self,
        models: &[String],
        extra: &[PermissionDefinition],
    ) -> RbacResult<Vec<PermissionDefinition>> {
        let mut definitions = Vec::new();

        for model in models {
            definitions.extend(self.from_model(model)?);
        }

        for definition in extra {
            let name = definition.name.trim();
            if name.is_empty() {
                continue;
            }
            definitions.push(PermissionDefinition {
                name: name.to_string(),
                label: definition.label.clone(),
            });
        }

        Ok(unique_by_name(definitions))
    }

    /// Expand one registered model into its permission definitions.
    ///
    /// Reads the model's resource, scope, and labels once, then formats one
    /// name per action. Labels are looked up by action value first, then by
    /// the final permission name.
    ///
    /// # Errors
    ///
    /// [`RbacError::InvalidModel`] when the identifier is not registered.
    pub fn from_model(&self, model: &str) -> RbacResult<Vec<PermissionDefinition>> {
        let Some(resolved) = self.registry.get(model) else {
            return Err(RbacError::InvalidModel(model.to_string()));
        };

        let resource = resolved.resource();
        let scope = resolved.scope();
        let labels = resolved.labels();

        let mut definitions = Vec::new();
        for action in resolved.actions() {
            let value = action.value();
            let name = self.formatter.format(&resource, value, &scope);
            let label = labels.get(value).or_else(|| labels.get(&name)).cloned();
            definitions.push(PermissionDefinition { name, label });
        }

        Ok(unique_by_name(definitions))
    }
}

/// Deduplicate by name: last write wins, first-seen position is kept.
fn unique_by_name(definitions: Vec<PermissionDefinition>) -> Vec<PermissionDefinition> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(definitions.len());
    let mut out: Vec<PermissionDefinition> = Vec::with_capacity(definitions.len());

    for definition in definitions {
        match index.get(&definition.name) {
            Some(&position) => out[position] = definition,
            None => {
                index.insert(definition.name.clone(), out.len());
                out.push(definition);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::actions::{Action, ActionRef};
    use crate::model::ResourceModel;

    struct ArticlePermission;

    impl ResourceModel for ArticlePermission {}

    struct ReportPermission;

    impl ResourceModel for ReportPermission {
        fn resource(&self) -> String {
            "report".to_string()
        }

        fn actions(&self) -> Vec<ActionRef> {
            vec![Action::Read.into(), "export".into(), Action::Read.into()]
        }

        fn labels(&self) -> HashMap<String, String> {
            HashMap::from([
                ("read".to_string(), "Read reports".to_string()),
                ("report.base.export".to_string(), "Export reports".to_string()),
            ])
        }
    }

    fn catalog() -> PermissionCatalog {
        let registry = Arc::new(
            ModelRegistry::new()
                .register(ArticlePermission)
                .register(ReportPermission),
        );
        PermissionCatalog::new(registry)
    }

    #[test]
    fn test_from_model_formats_each_action() {
        let definitions = catalog().from_model("ArticlePermission").unwrap();
        let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "article.base.create",
                "article.base.read",
                "article.base.update",
                "article.base.delete",
                "article.base.restore",
            ]
        );
    }

    #[test]
    fn test_from_model_labels_by_action_and_by_name() {
        let definitions = catalog().from_model("ReportPermission").unwrap();
        let by_name: HashMap<&str, &PermissionDefinition> =
            definitions.iter().map(|d| (d.name.as_str(), d)).collect();

        assert_eq!(
            by_name["report.base.read"].label.as_deref(),
            Some("Read reports")
        );
        assert_eq!(
            by_name["report.base.export"].label.as_deref(),
            Some("Export reports")
        );
    }

    #[test]
    fn test_from_model_deduplicates() {
        let definitions = catalog().from_model("ReportPermission").unwrap();
        assert_eq!(definitions.len(), 2);
    }

    #[test]
    fn test_from_model_unknown_identifier() {
        let error = catalog().from_model("CommentPermission").unwrap_err();
        assert!(matches!(error, RbacError::InvalidModel(name) if name == "CommentPermission"));
    }

    #[test]
    fn test_build_merges_models_and_extras() {
        let definitions = catalog()
            .build(
                &["ArticlePermission".to_string()],
                &[
                    PermissionDefinition::labeled("admin.access", "Admin area"),
                    PermissionDefinition::new("  "),
                ],
            )
            .unwrap();

        assert!(definitions.iter().any(|d| d.name == "article.base.read"));
        assert!(definitions.iter().any(|d| d.name == "admin.access"));
        assert!(!definitions.iter().any(|d| d.name.is_empty()));
    }

    #[test]
    fn test_build_last_write_wins() {
        let definitions = catalog()
            .build(
                &["ArticlePermission".to_string()],
                &[PermissionDefinition::labeled("article.base.read", "Read articles")],
            )
            .unwrap();

        let read: Vec<&PermissionDefinition> = definitions
            .iter()
            .filter(|d| d.name == "article.base.read")
            .collect();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].label.as_deref(), Some("Read articles"));
    }

    #[test]
    fn test_build_propagates_invalid_model() {
        let error = catalog()
            .build(&["MissingPermission".to_string()], &[])
            .unwrap_err();
        assert!(matches!(error, RbacError::InvalidModel(_)));
    }
}
