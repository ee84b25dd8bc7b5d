//! Diagnostic rendering for resolution errors
//!
//! Wraps codespan-reporting so resolution failures can be shown on a
//! terminal, captured as plain text, or exported as JSON for tooling.
//! The tree carries no source positions, so labels are attached only when a
//! front end supplies a byte range.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;
use termcolor::{ColorChoice, NoColor, StandardStream};

use crate::error::ResolveError;

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with optional source context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.inner = self.inner.with_code(code.0);
        self.code = Some(code);
        self
    }

    /// Point at the offending source range
    pub fn with_primary_label(mut self, file_id: usize, range: Range<usize>, message: impl Into<String>) -> Self {
        self.inner
            .labels
            .push(Label::primary(file_id, range).with_message(message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create a diagnostic from a resolution error
    pub fn from_resolve_error(error: &ResolveError) -> Self {
        use ResolveError::*;

        let diag = Diagnostic::error(error.to_string()).with_code(error_code(error));
        match error {
            UnknownMethod { method, ty } => diag
                .with_note(format!("no ancestor of '{}' declares '{}'", ty, method)),
            UninitializedUse { .. } => {
                diag.with_help("assign a value before the first read")
            }
            UnknownType { .. } => diag,
            UnknownClass { name } => {
                diag.with_help(format!("declare class '{}' before it is used", name))
            }
            DuplicateDeclaration { .. } => diag,
        }
    }

    /// Emit to stderr with colors
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Render without colors
    pub fn render_to_string(&self, files: &SimpleFiles<String, String>) -> Result<String, codespan_reporting::files::Error> {
        let mut writer = NoColor::new(Vec::new());
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    /// Convert to JSON for tooling
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from_diagnostic(self, files))
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    /// "primary" or "secondary"
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;

                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: label.message.clone(),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Error code for a resolution error
pub fn error_code(error: &ResolveError) -> ErrorCode {
    use ResolveError::*;

    match error {
        UnknownMethod { .. } => ErrorCode("E1001"),
        UninitializedUse { .. } => ErrorCode("E1002"),
        UnknownType { .. } => ErrorCode("E1003"),
        UnknownClass { .. } => ErrorCode("E1004"),
        DuplicateDeclaration { .. } => ErrorCode("E1005"),
    }
}

/// Build a file database holding one source file
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown_method() -> ResolveError {
        ResolveError::UnknownMethod {
            method: "frobnicate".to_string(),
            ty: "Int".to_string(),
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code(&unknown_method()), ErrorCode("E1001"));
        let err = ResolveError::DuplicateDeclaration { name: "Dog".to_string() };
        assert_eq!(error_code(&err).as_str(), "E1005");
    }

    #[test]
    fn test_from_resolve_error() {
        let diag = Diagnostic::from_resolve_error(&unknown_method());
        assert_eq!(diag.inner().severity, Severity::Error);
        assert_eq!(diag.code(), Some(&ErrorCode("E1001")));
        assert!(diag.inner().message.contains("frobnicate"));
        assert!(diag.inner().labels.is_empty());
    }

    #[test]
    fn test_render_to_string() {
        let files = create_files("main.qk", "x = 3\nx.frobnicate()\n");
        let diag = Diagnostic::from_resolve_error(&unknown_method())
            .with_primary_label(0, 8..18, "not declared");
        let text = diag.render_to_string(&files).unwrap();
        assert!(text.contains("error[E1001]"));
        assert!(text.contains("main.qk"));
        assert!(text.contains("not declared"));
    }

    #[test]
    fn test_json_output() {
        let files = create_files("main.qk", "x = 3\nx.frobnicate()\n");
        let diag = Diagnostic::from_resolve_error(&unknown_method())
            .with_primary_label(0, 8..18, "not declared");
        let json = diag.to_json(&files).unwrap();

        let parsed: JsonDiagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.code.as_deref(), Some("E1001"));
        assert_eq!(parsed.severity, "error");
        assert_eq!(parsed.labels.len(), 1);
        assert_eq!(parsed.labels[0].start_line, 2);
        assert_eq!(parsed.labels[0].style, "primary");
    }
}
