//! # Resource Models
//!
//! A resource model is a typed declaration of a permission-bearing entity:
//! its resource slug, default scope, action list, and optional labels.
//! Models are registered by identifier in a [`ModelRegistry`]; the catalog
//! and resolver look identifiers up there and never depend on concrete
//! model types.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::actions::{Action, ActionRef};
use crate::naming::{normalize_resource_name, DEFAULT_SCOPE};

/// A typed declaration of a permission-bearing entity.
///
/// Every method has a default: the resource slug is derived from the
/// implementing type's name, the scope is [`DEFAULT_SCOPE`], the action
/// list is every known [`Action`], and there are no labels. A minimal model
/// is therefore just an empty impl:
///
/// ```
/// use palisade_rbac::ResourceModel;
///
/// struct ArticlePermission;
///
/// impl ResourceModel for ArticlePermission {}
///
/// assert_eq!(ArticlePermission.resource(), "article");
/// assert_eq!(ArticlePermission.scope(), "base");
/// assert_eq!(ArticlePermission.actions().len(), 5);
/// ```
pub trait ResourceModel: Send + Sync {
    /// Resource slug used as the first permission-name segment.
    fn resource(&self) -> String {
        normalize_resource_name(type_name_of(self))
    }

    /// Scope segment, e.g. `base` or `own`.
    fn scope(&self) -> String {
        DEFAULT_SCOPE.to_string()
    }

    /// Actions this resource supports.
    fn actions(&self) -> Vec<ActionRef> {
        Action::all().into_iter().map(ActionRef::from).collect()
    }

    /// Human-readable labels, keyed by action value or by full permission
    /// name.
    fn labels(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

fn type_name_of<T: ?Sized>(_value: &T) -> &'static str {
    type_name::<T>()
}

/// Registry of resource models, keyed by identifier.
///
/// Declarative sources (role definition sets, definition files) reference
/// models by name; the registry is what decides whether such an identifier
/// resolves to a type with the resource-model capability.
///
/// # Example
///
/// ```
/// use palisade_rbac::{ModelRegistry, ResourceModel};
///
/// struct ArticlePermission;
/// impl ResourceModel for ArticlePermission {}
///
/// let registry = ModelRegistry::new().register(ArticlePermission);
/// assert!(registry.contains("ArticlePermission"));
/// assert!(!registry.contains("CommentPermission"));
/// ```
#[derive(Default, Clone)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn ResourceModel>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its type name (final path segment).
    pub fn register<M>(self, model: M) -> Self
    where
        M: ResourceModel + 'static,
    {
        let name = short_type_name::<M>().to_string();
        self.register_as(name, Arc::new(model))
    }

    /// Register a model under an explicit identifier.
    pub fn register_as(mut self, name: impl Into<String>, model: Arc<dyn ResourceModel>) -> Self {
        self.models.insert(name.into(), model);
        self
    }

    /// Look up a model by identifier.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ResourceModel>> {
        self.models.get(name).cloned()
    }

    /// Check whether an identifier resolves to a registered model.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Iterate over registered identifiers, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Get the count of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn short_type_name<T>() -> &'static str {
    let name = type_name::<T>();
    match name.rfind("::") {
        Some(index) => &name[index + 2..],
        None => name,
    }
}
