//! Core type definitions for the Quack type lattice

use rustc_hash::FxHashMap;
use std::fmt;

/// Handle to a type registered in a [`TypeLattice`](crate::TypeLattice)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Method signature registered on a type
///
/// Types are referenced by name, since a user method may mention a class
/// that is resolved after the signature is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Name of the returned type
    pub return_type: String,
    /// Parameters in declaration order: (name, type name)
    pub params: Vec<(String, String)>,
}

impl Method {
    /// Create a method with no parameters
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn with_param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.params.push((name.into(), ty.into()));
        self
    }
}

/// A named type: parent link, method table and property table
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Type name
    pub name: String,
    /// Parent type (`None` only for the root)
    pub parent: Option<TypeId>,
    /// Methods declared directly on this type
    pub methods: FxHashMap<String, Method>,
    /// Properties (fields) and their unified types
    pub properties: FxHashMap<String, TypeId>,
}

impl TypeDef {
    pub(crate) fn new(name: String, parent: Option<TypeId>) -> Self {
        Self {
            name,
            parent,
            methods: FxHashMap::default(),
            properties: FxHashMap::default(),
        }
    }

    /// Whether this type itself declares `method`
    pub fn declares(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
