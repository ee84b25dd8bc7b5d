//! Compilation errors

use quack_checker::{Diagnostic, ResolveError};
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Generation reached a node the resolver never annotated
    #[error("Internal compiler error: no resolved {what} for {kind} node")]
    Unresolved { kind: String, what: String },
}

impl CompileError {
    pub(crate) fn unresolved(kind: &str, what: &str) -> Self {
        CompileError::Unresolved {
            kind: kind.to_string(),
            what: what.to_string(),
        }
    }

    /// User-facing diagnostic, for errors caused by the program itself
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            CompileError::Resolve(err) => Some(Diagnostic::from_resolve_error(err)),
            CompileError::Unresolved { .. } => None,
        }
    }
}
