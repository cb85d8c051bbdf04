//! Whole-match validation and result assembly.
//!
//! The composite pattern decides pass or fail. Only a failing filename is
//! handed to the token walker, which explains where it went wrong.

use serde::Serialize;

use super::compiler::CompiledTemplate;
use super::walker;

/// What kind of divergence a [`Diagnostic`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    TokenMismatch,
    MissingSeparator,
    TrailingContent,
    /// The token walk succeeded but the composite pattern rejected the filename.
    TemplateMismatch,
}

/// One located explanation of why a filename was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Token name, or `separator after <token>`.
    pub subject: String,
    pub expected: String,
    pub found: String,
    /// Byte offset into the filename where the divergence starts.
    pub position: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    fn pass() -> Self {
        Self {
            passed: true,
            diagnostics: Vec::new(),
        }
    }

    /// Message of the first diagnostic.
    pub fn summary(&self) -> Option<&str> {
        self.diagnostics.first().map(|d| d.message.as_str())
    }

    /// Human-readable report listing every diagnostic, or `None` on a pass.
    pub fn report(&self) -> Option<String> {
        if self.passed {
            return None;
        }
        let mut report = String::from("Filename doesn't match the expected format:");
        for diagnostic in &self.diagnostics {
            report.push_str("\n- ");
            report.push_str(&diagnostic.message);
        }
        Some(report)
    }
}

/// Whether `filename` matches the whole composite pattern.
pub fn validate(compiled: &CompiledTemplate, filename: &str) -> bool {
    compiled.composite.is_match(filename)
}

/// Validate `filename` and explain a failure.
///
/// `filename` is a basename; callers strip directories first.
pub fn validate_filename(compiled: &CompiledTemplate, filename: &str) -> ValidationResult {
    if validate(compiled, filename) {
        return ValidationResult::pass();
    }
    ValidationResult {
        passed: false,
        diagnostics: vec![walker::diagnose(compiled, filename)],
    }
}

impl CompiledTemplate {
    pub fn is_match(&self, filename: &str) -> bool {
        validate(self, filename)
    }

    pub fn validate_filename(&self, filename: &str) -> ValidationResult {
        validate_filename(self, filename)
    }
}
