use std::fmt::Write as _;

use crate::lint::LintReport;

use super::{Endpoint, exit_code};

/// Human-readable endpoint: one block per path plus a closing tally.
pub struct TextAdapter {
    paths: Vec<String>,
}

impl TextAdapter {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }
}

pub fn render_report(report: &LintReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        if result.is_clean() {
            let _ = writeln!(out, "ok    {}", result.path);
            continue;
        }
        let _ = writeln!(out, "FAIL  {}", result.path);
        for issue in &result.issues {
            let _ = writeln!(
                out,
                "      [{}] {}: {}",
                issue.severity,
                issue.kind.as_str(),
                issue.expected
            );
            // the first detail repeats `expected`
            for detail in issue.details.iter().skip(1) {
                let _ = writeln!(out, "        - {detail}");
            }
        }
    }
    let failing = report.results.iter().filter(|r| !r.is_clean()).count();
    let _ = write!(
        out,
        "{} path(s) checked, {} with issues",
        report.results.len(),
        failing
    );
    out
}

impl Endpoint for TextAdapter {
    fn extract_paths(&self) -> Result<Vec<String>, anyhow::Error> {
        Ok(self.paths.clone())
    }

    fn handle_report(&self, report: &LintReport) -> Result<i32, anyhow::Error> {
        println!("{}", render_report(report));
        Ok(exit_code(report))
    }

    fn handle_error(&self, error: anyhow::Error) -> i32 {
        eprintln!("shotlint: {error:#}");
        2
    }
}
