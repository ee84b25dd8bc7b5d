//! Quack Type System
//!
//! Nominal type lattice used by the Quack resolver and code generator.
//!
//! Every type except the root `Obj` has exactly one parent, so the lattice is a
//! tree. Method lookup walks the parent chain, and the types observed for one
//! variable are unified with [`TypeLattice::join`].

#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod lattice;
pub mod ty;

pub use error::TypeError;
pub use lattice::TypeLattice;
pub use ty::{Method, TypeDef, TypeId};
