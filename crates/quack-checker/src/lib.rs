//! Quack Resolver
//!
//! Name and type resolution for Quack programs.
//!
//! This crate provides:
//! - Field and local symbol tables with flow-insensitive type accumulation
//! - The resolution pass (AST → annotated [`Resolution`])
//! - Diagnostics for resolution errors
//!
//! # Usage
//!
//! ```ignore
//! use quack_checker::Resolver;
//!
//! let resolution = Resolver::new("Main").resolve_program(&statements)?;
//! let ty = resolution.type_name_of(&statements[0]);
//! ```

pub mod diagnostic;
pub mod error;
pub mod resolution;
pub mod resolver;
pub mod symbols;

pub use diagnostic::{create_files, Diagnostic, ErrorCode};
pub use error::ResolveError;
pub use resolution::Resolution;
pub use resolver::{Resolver, DEFAULT_PROGRAM_NAME};
pub use symbols::{ScopeKey, Symbol, SymbolTable, Symbols, CONSTRUCTOR};
