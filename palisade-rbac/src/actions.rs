//! # Actions
//!
//! Defines the known actions that can be performed on permission-bearing
//! resources, plus the `ActionRef` union used wherever a declaration may
//! name either a known action or a free-form one.

use serde::{Deserialize, Serialize};

/// Known actions that can be granted on a resource.
///
/// These are the default actions a resource model exposes when it does not
/// declare its own list:
/// - **Create**: create new resource instances
/// - **Read**: view/access resource data
/// - **Update**: modify existing resource data
/// - **Delete**: remove resource instances
/// - **Restore**: bring soft-deleted resources back
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create new resource.
    Create,

    /// Read/view resource.
    Read,

    /// Update existing resource.
    Update,

    /// Delete resource.
    Delete,

    /// Restore a soft-deleted resource.
    Restore,
}

impl Action {
    /// Get the string representation of the action.
    ///
    /// This is the segment that ends up in formatted permission names,
    /// e.g. the `read` in `article.base.read`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Restore => "restore",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Example
    ///
    /// ```
    /// use palisade_rbac::Action;
    ///
    /// assert_eq!(Action::parse("read"), Some(Action::Read));
    /// assert_eq!(Action::parse("edit"), Some(Action::Update)); // Alias
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" | "add" | "new" => Some(Action::Create),
            "read" | "view" | "get" => Some(Action::Read),
            "update" | "edit" | "write" | "modify" => Some(Action::Update),
            "delete" | "remove" | "destroy" => Some(Action::Delete),
            "restore" | "recover" => Some(Action::Restore),
            _ => None,
        }
    }

    /// Get all known actions, in declaration order.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Restore,
        ]
    }
}

/// A reference to an action inside a declaration.
///
/// Resource models and grants may list either a known [`Action`] enumerant
/// or a raw string for domain-specific operations (`"publish"`,
/// `"export"`, ...). Both forms format identically into permission names.
///
/// # Example
///
/// ```
/// use palisade_rbac::{Action, ActionRef};
///
/// assert_eq!(ActionRef::from(Action::Read).value(), "read");
/// assert_eq!(ActionRef::from("publish").value(), "publish");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ActionRef {
    /// A known action enumerant.
    Known(Action),
    /// A free-form action identifier.
    Custom(String),
}

impl ActionRef {
    /// Get the action value used when formatting permission names.
    pub fn value(&self) -> &str {
        match self {
            ActionRef::Known(action) => action.as_str(),
            ActionRef::Custom(value) => value.as_str(),
        }
    }
}

impl From<Action> for ActionRef {
    fn from(action: Action) -> Self {
        ActionRef::Known(action)
    }
}

impl From<&str> for ActionRef {
    fn from(value: &str) -> Self {
        ActionRef::Custom(value.to_string())
    }
}

impl From<String> for ActionRef {
    fn from(value: String) -> Self {
        ActionRef::Custom(value)
    }
}
