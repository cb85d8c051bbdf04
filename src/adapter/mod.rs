pub mod json_adapter;
pub mod text_adapter;

use crate::lint::{LintReport, Linter};

/// Abstracts output-format differences across the text and JSON endpoints.
pub trait Endpoint {
    /// The render paths to lint, in the order they were given.
    fn extract_paths(&self) -> Result<Vec<String>, anyhow::Error>;

    /// Write the report in the endpoint's format and return the exit code.
    fn handle_report(&self, report: &LintReport) -> Result<i32, anyhow::Error>;

    /// Handle an error with format-specific error reporting. Returns the exit code.
    fn handle_error(&self, error: anyhow::Error) -> i32;
}

/// 1 when any issue has error severity, otherwise 0.
pub fn exit_code(report: &LintReport) -> i32 {
    if report.has_errors() { 1 } else { 0 }
}

/// Run the common lint flow for any endpoint.
///
/// 1. Extract the paths from the endpoint's input
/// 2. Lint every path against the active template
/// 3. Hand the report to the endpoint for output
pub fn run(endpoint: &dyn Endpoint, linter: &Linter) -> i32 {
    let paths = match endpoint.extract_paths() {
        Ok(paths) => paths,
        Err(e) => return endpoint.handle_error(e),
    };

    let report = linter.lint_paths(&paths);
    tracing::debug!(
        paths = paths.len(),
        issues = report.issues().count(),
        "lint finished"
    );

    match endpoint.handle_report(&report) {
        Ok(code) => code,
        Err(e) => endpoint.handle_error(e),
    }
}
