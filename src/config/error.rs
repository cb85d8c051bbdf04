use crate::template::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_saphyr::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: TemplateError,
    },
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
    #[error("no template selected: set defaults.template or pass --template")]
    NoTemplate,
    #[error("validation errors:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}
