//! Resolution errors
//!
//! Resolution stops at the first error; nothing is generated for a program
//! that fails to resolve.

use quack_types::TypeError;
use thiserror::Error;

/// Errors detected while resolving a program
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No type in the receiver's ancestor chain declares the method
    #[error("Unknown method '{method}' on type {ty}")]
    UnknownMethod {
        /// Method name
        method: String,
        /// Static type of the receiver
        ty: String,
    },

    /// A variable or field is read before any assignment to it
    #[error("Use of uninitialized variable '{name}'")]
    UninitializedUse {
        /// Variable name, or `receiver.field` for fields
        name: String,
    },

    /// A type name in a parameter, return or variable annotation is not registered
    #[error("Unknown type '{name}'")]
    UnknownType {
        /// Type name
        name: String,
    },

    /// An instantiated or extended class is not registered
    #[error("Unknown class '{name}'")]
    UnknownClass {
        /// Class name
        name: String,
    },

    /// A type, method or parameter is declared twice
    #[error("Duplicate declaration of '{name}'")]
    DuplicateDeclaration {
        /// Declared name
        name: String,
    },
}

impl ResolveError {
    /// The name the error is about
    pub fn name(&self) -> &str {
        match self {
            ResolveError::UnknownMethod { method, .. } => method,
            ResolveError::UninitializedUse { name }
            | ResolveError::UnknownType { name }
            | ResolveError::UnknownClass { name }
            | ResolveError::DuplicateDeclaration { name } => name,
        }
    }
}

impl From<TypeError> for ResolveError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownType { name } => ResolveError::UnknownType { name },
            TypeError::UnknownMethod { method, ty } => ResolveError::UnknownMethod { method, ty },
            TypeError::DuplicateType { name } | TypeError::SecondRoot { name } => {
                ResolveError::DuplicateDeclaration { name }
            }
            TypeError::DuplicateMethod { method, ty } => ResolveError::DuplicateDeclaration {
                name: format!("{}.{}", ty, method),
            },
        }
    }
}
