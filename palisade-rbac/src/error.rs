//! Error types for RBAC operations
//!
//! This module defines all error types that can occur while loading role
//! definitions, building permission catalogs, and compiling role-permission
//! maps.

use std::path::PathBuf;

use thiserror::Error;

/// RBAC error types.
///
/// These errors cover definition loading and catalog/resolver failures.
/// Authorization decisions themselves never produce an error; an unknown
/// permission or role simply means "not allowed".
#[derive(Debug, Error)]
pub enum RbacError {
    /// A role definition is malformed (empty name, invalid declarative source)
    #[error("invalid role definition: {0}")]
    InvalidDefinition(String),

    /// A referenced permission model is not registered
    #[error("unknown permission model: {0}")]
    InvalidModel(String),

    /// A role definition file could not be read
    #[error("failed to read role definition file {}: {source}", .path.display())]
    DefinitionIo {
        /// Path of the file that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A role definition file could not be parsed
    #[error("failed to parse role definition file {}: {source}", .path.display())]
    DefinitionParse {
        /// Path of the file that failed to parse
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for RBAC operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Check if this error originates from a declarative definition source.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            RbacError::InvalidDefinition(_)
                | RbacError::DefinitionIo { .. }
                | RbacError::DefinitionParse { .. }
        )
    }
}
