//! Compiler configuration

use quack_checker::DEFAULT_PROGRAM_NAME;
use serde::{Deserialize, Serialize};

/// Options for one compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Name of the top-level program class
    pub unit_name: String,
    /// Prefix each method with a `# Class.method` line
    pub emit_comments: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            unit_name: DEFAULT_PROGRAM_NAME.to_string(),
            emit_comments: false,
        }
    }
}

impl CompileOptions {
    pub fn new(unit_name: impl Into<String>) -> Self {
        Self {
            unit_name: unit_name.into(),
            ..Self::default()
        }
    }

    pub fn with_comments(mut self, emit_comments: bool) -> Self {
        self.emit_comments = emit_comments;
        self
    }
}
