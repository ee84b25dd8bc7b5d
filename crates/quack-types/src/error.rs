//! Type lattice errors

use thiserror::Error;

/// Errors raised while registering or querying types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A type name is not present in the lattice
    #[error("Unknown type: {name}")]
    UnknownType {
        /// Type name that was not found
        name: String,
    },

    /// A type with this name is already registered
    #[error("Duplicate type declaration: {name}")]
    DuplicateType {
        /// Name registered twice
        name: String,
    },

    /// No type in the receiver's ancestor chain declares the method
    #[error("Unknown method '{method}' on type {ty}")]
    UnknownMethod {
        /// Method name
        method: String,
        /// Receiver type the lookup started from
        ty: String,
    },

    /// The same type declares a method twice
    #[error("Duplicate method '{method}' on type {ty}")]
    DuplicateMethod {
        /// Method name
        method: String,
        /// Declaring type
        ty: String,
    },

    /// A parentless type was registered after the root already exists
    #[error("Type {name} has no parent, but the root type is already defined")]
    SecondRoot {
        /// Name of the parentless type
        name: String,
    },
}
