use serde::{Deserialize, Serialize};

use crate::config::Severity;
use crate::lint::{LintReport, PathReport};

use super::{Endpoint, exit_code};

/// stdin JSON input for `shotlint check`.
#[derive(Debug, Deserialize)]
pub struct CheckInput {
    pub paths: Vec<String>,
}

/// JSON document written to stdout by `shotlint check --format json`.
#[derive(Debug, Serialize, PartialEq)]
pub struct CheckOutput<'a> {
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_severity: Option<Severity>,
    pub results: &'a [PathReport],
}

pub struct JsonAdapter {
    paths: Vec<String>,
}

impl JsonAdapter {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }
}

pub fn build_check_output(report: &LintReport) -> CheckOutput<'_> {
    CheckOutput {
        passed: !report.has_errors(),
        max_severity: report.max_severity(),
        results: &report.results,
    }
}

impl Endpoint for JsonAdapter {
    fn extract_paths(&self) -> Result<Vec<String>, anyhow::Error> {
        Ok(self.paths.clone())
    }

    fn handle_report(&self, report: &LintReport) -> Result<i32, anyhow::Error> {
        let json = serde_json::to_string(&build_check_output(report))?;
        println!("{json}");
        Ok(exit_code(report))
    }

    fn handle_error(&self, error: anyhow::Error) -> i32 {
        let json = serde_json::json!({ "error": error.to_string() });
        println!("{json}");
        2
    }
}
