use std::path::Path;

use regex::Regex;

use crate::config::{Config, ConfigError, Severity};
use crate::template::SharedTemplate;

use super::{Issue, IssueKind, LintReport, PathReport};

const DEFAULT_VERSION_TOKEN: &str = r"v\d{2,3}";

/// Path checks resolved from the `file_paths` and `versioning` sections.
#[derive(Debug, Clone)]
pub struct LintSettings {
    pub relative_path_required: bool,
    pub severity_relative_path: Severity,
    pub severity_naming_pattern: Severity,
    pub require_version_token: bool,
    pub version_token: Regex,
    pub severity_require_token: Severity,
}

impl LintSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let fallback = config
            .defaults
            .as_ref()
            .and_then(|d| d.severity)
            .unwrap_or_default();
        let file_paths = config.file_paths.clone().unwrap_or_default();
        let versioning = config.versioning.clone().unwrap_or_default();

        let pattern = versioning
            .version_token_regex
            .as_deref()
            .unwrap_or(DEFAULT_VERSION_TOKEN);
        let version_token = Regex::new(pattern).map_err(|e| {
            ConfigError::Validation(vec![format!("versioning.version_token_regex: {e}")])
        })?;

        Ok(Self {
            relative_path_required: file_paths.relative_path_required.unwrap_or(false),
            severity_relative_path: file_paths.severity_relative_path.unwrap_or(fallback),
            severity_naming_pattern: file_paths.severity_naming_pattern.unwrap_or(Severity::Error),
            require_version_token: versioning.require_version_token.unwrap_or(false),
            version_token,
            severity_require_token: versioning.severity_require_token.unwrap_or(fallback),
        })
    }
}

/// Runs the render-path checks against the active template.
pub struct Linter {
    template: SharedTemplate,
    settings: LintSettings,
}

impl Linter {
    pub fn new(template: SharedTemplate, settings: LintSettings) -> Self {
        Self { template, settings }
    }

    pub fn template(&self) -> &SharedTemplate {
        &self.template
    }

    pub fn lint_path(&self, path: &str) -> Vec<Issue> {
        let issue = |kind, current: &str, expected: String, severity| Issue {
            kind,
            path: path.to_string(),
            current: current.to_string(),
            expected,
            severity,
            details: Vec::new(),
        };

        if path.trim().is_empty() {
            return vec![issue(
                IssueKind::MissingFilePath,
                path,
                "a render file path".to_string(),
                Severity::Error,
            )];
        }

        let mut issues = Vec::new();

        if self.settings.relative_path_required && is_absolute(path) {
            issues.push(issue(
                IssueKind::AbsolutePathDetected,
                path,
                "a path relative to the project root".to_string(),
                self.settings.severity_relative_path,
            ));
        }

        let name = basename(path);
        let result = self.template.validate_filename(name);
        if let Some(summary) = result.summary() {
            issues.push(Issue {
                details: result
                    .diagnostics
                    .iter()
                    .map(|d| d.message.clone())
                    .collect(),
                ..issue(
                    IssueKind::NamingConventionViolation,
                    name,
                    summary.to_string(),
                    self.settings.severity_naming_pattern,
                )
            });
        }

        if self.settings.require_version_token && !self.settings.version_token.is_match(name) {
            issues.push(issue(
                IssueKind::MissingVersionToken,
                name,
                format!(
                    "a version token matching '{}'",
                    self.settings.version_token.as_str()
                ),
                self.settings.severity_require_token,
            ));
        }

        tracing::debug!(path, issues = issues.len(), "linted path");
        issues
    }

    pub fn lint_paths<I, S>(&self, paths: I) -> LintReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let results = paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref();
                PathReport {
                    path: path.to_string(),
                    issues: self.lint_path(path),
                }
            })
            .collect();
        LintReport { results }
    }
}

/// Final component of `path`, accepting both `/` and `\` separators.
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Absolute on this platform, or absolute in Windows form (`C:\`, `C:/`, `\\server`).
fn is_absolute(path: &str) -> bool {
    if Path::new(path).is_absolute() || path.starts_with("\\\\") || path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}
