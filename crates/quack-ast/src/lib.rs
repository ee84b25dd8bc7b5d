//! Quack AST
//!
//! The tree handed to the compiler core by the parsing stage. Operators are
//! already lowered to method calls (see [`lower`]), so the node set is small
//! and closed: both compiler passes match on [`Node`] exhaustively.

#![warn(missing_docs)]

pub mod lower;
pub mod node;

pub use lower::{BinaryOp, UnaryOp};
pub use node::*;
