use serde::Serialize;

use crate::config::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingFilePath,
    AbsolutePathDetected,
    NamingConventionViolation,
    MissingVersionToken,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingFilePath => "missing_file_path",
            IssueKind::AbsolutePathDetected => "absolute_path_detected",
            IssueKind::NamingConventionViolation => "naming_convention_violation",
            IssueKind::MissingVersionToken => "missing_version_token",
        }
    }
}

/// One problem found on a render path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: String,
    /// The offending value as found in the path.
    pub current: String,
    pub expected: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathReport {
    pub path: String,
    pub issues: Vec<Issue>,
}

impl PathReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Outcome of linting a batch of paths, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub results: Vec<PathReport>,
}

impl LintReport {
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.results.iter().flat_map(|result| result.issues.iter())
    }

    /// Highest severity among all issues.
    pub fn max_severity(&self) -> Option<Severity> {
        self.issues().map(|issue| issue.severity).max()
    }

    pub fn has_errors(&self) -> bool {
        self.max_severity() == Some(Severity::Error)
    }

    pub fn is_clean(&self) -> bool {
        self.results.iter().all(PathReport::is_clean)
    }
}
