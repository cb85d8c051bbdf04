/// Configuration errors raised while building or compiling a template.
///
/// These describe a broken template, never a broken filename: a filename that
/// does not conform is reported through `ValidationResult` instead.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template has no tokens")]
    EmptyTemplate,
    #[error("duplicate token '{0}' in template")]
    DuplicateToken(String),
    #[error("unknown token '{0}'")]
    UnknownToken(String),
    #[error("token '{token}' has an empty choice set")]
    EmptyChoices { token: String },
    #[error("token '{token}' has invalid bounds: min {min} is greater than max {max}")]
    InvalidBounds { token: String, min: u32, max: u32 },
    #[error("token '{token}' bounds {min}..={max} are outside the allowed range {lower}..={upper}")]
    BoundsOutOfRange {
        token: String,
        min: u32,
        max: u32,
        lower: u32,
        upper: u32,
    },
    #[error("token '{token}' does not offer the option '{value}'")]
    UnknownOption { token: String, value: String },
    #[error("value '{value}' for token '{token}' does not match its pattern '{pattern}'")]
    LiteralMismatch {
        token: String,
        value: String,
        pattern: String,
    },
    #[error("token '{0}' is required and cannot be omitted")]
    IllegalOmit(String),
    #[error("token '{token}' does not accept a {selection} selection")]
    SelectionMismatch {
        token: String,
        selection: &'static str,
    },
    #[error("invalid pattern for token '{token}': {source}")]
    InvalidFragment {
        token: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid composite pattern: {0}")]
    InvalidComposite(#[source] regex::Error),
    #[error(
        "tokens '{left}' and '{right}' are both variable-length and need a non-empty separator between them"
    )]
    AmbiguousAdjacency { left: String, right: String },
}
