use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::template::{
    Bounds, Catalogue, CompiledTemplate, ControlKind, Selection, Template, TemplateError,
    TokenDefinition,
};

/// Name of the template assembled from the built-in catalogue when the
/// configuration defines none.
pub const BUILTIN_TEMPLATE: &str = "default";

pub const BUILTIN_TOKEN_ORDER: [&str; 10] = [
    "sequence",
    "shotNumber",
    "description",
    "pixelMappingName",
    "resolution",
    "colorspaceGamma",
    "fps",
    "version",
    "frame_padding",
    "extension",
];

/// Limits for a custom bounded token that does not declare its own.
const DEFAULT_LIMITS: Bounds = Bounds::new(1, 16);

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub defaults: Option<Defaults>,
    pub token_definitions: Option<BTreeMap<String, TokenDefinitionEntry>>,
    pub templates: Option<BTreeMap<String, TemplateEntry>>,
    pub file_paths: Option<FilePaths>,
    pub versioning: Option<Versioning>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Defaults {
    pub severity: Option<Severity>,
    pub template: Option<String>,
}

#[derive(
    Debug, Deserialize, Serialize, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Fixed,
    Bounded,
    Choice,
    MultiChoice,
}

/// A scalar in an option or example list. YAML reads `24` as an integer, so
/// both forms are accepted and compared as text.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    Text(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{n}"),
            Literal::Text(text) => f.write_str(text),
        }
    }
}

/// Custom or overriding token definition under `token_definitions`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TokenDefinitionEntry {
    pub control: Control,
    pub pattern: Option<String>,
    pub options: Option<Vec<Literal>>,
    pub min_value: Option<u32>,
    pub max_value: Option<u32>,
    pub min_limit: Option<u32>,
    pub max_limit: Option<u32>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub examples: Option<Vec<Literal>>,
    pub separator: Option<String>,
    pub optional: Option<bool>,
    pub case_insensitive: Option<bool>,
}

impl TokenDefinitionEntry {
    /// Convert into a catalogue definition, or describe why it cannot be.
    pub fn to_definition(&self, name: &str) -> Result<TokenDefinition, String> {
        let control = match self.control {
            Control::Fixed => ControlKind::Fixed {
                pattern: self.require_pattern(name)?,
            },
            Control::Bounded => {
                let pattern = self.require_pattern(name)?;
                let default = match (self.min_value, self.max_value) {
                    (Some(min), Some(max)) => Bounds::new(min, max),
                    (Some(n), None) | (None, Some(n)) => Bounds::exact(n),
                    (None, None) => {
                        return Err(format!(
                            "token_definitions.{name}: bounded token needs min_value or max_value"
                        ));
                    }
                };
                let limits = Bounds::new(
                    self.min_limit.unwrap_or(DEFAULT_LIMITS.min.min(default.min)),
                    self.max_limit.unwrap_or(DEFAULT_LIMITS.max.max(default.max)),
                );
                ControlKind::Bounded {
                    pattern,
                    default,
                    limits,
                }
            }
            Control::Choice => ControlKind::Choice {
                options: self.require_options(name)?,
            },
            Control::MultiChoice => ControlKind::MultiChoice {
                options: self.require_options(name)?,
            },
        };

        let mut def = TokenDefinition::new(name, control);
        if let Some(label) = &self.label {
            def = def.with_label(label.clone());
        }
        if let Some(description) = &self.description {
            def = def.with_description(description.clone());
        }
        if let Some(examples) = &self.examples {
            def = def.with_examples(examples.iter().map(Literal::to_string));
        }
        if let Some(separator) = &self.separator {
            def = def.with_separator(separator.clone());
        }
        if self.optional == Some(true) {
            def = def.optional();
        }
        if self.case_insensitive == Some(true) {
            def = def.case_insensitive();
        }
        Ok(def)
    }

    fn require_pattern(&self, name: &str) -> Result<String, String> {
        self.pattern
            .clone()
            .ok_or_else(|| format!("token_definitions.{name}: pattern is required"))
    }

    fn require_options(&self, name: &str) -> Result<Vec<String>, String> {
        match &self.options {
            Some(options) if !options.is_empty() => {
                Ok(options.iter().map(Literal::to_string).collect())
            }
            _ => Err(format!("token_definitions.{name}: options must not be empty")),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompositePolicy {
    /// Rebuild the composite from the token list.
    #[default]
    Derive,
    /// Validate whole filenames against the authored `pattern`.
    Authored,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct TemplateEntry {
    pub composite: Option<CompositePolicy>,
    pub pattern: Option<String>,
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TokenEntry {
    pub name: String,
    pub value: Option<TokenValue>,
    pub min_value: Option<u32>,
    pub max_value: Option<u32>,
    pub separator: Option<String>,
}

/// Selected value of a template token: a count, a single literal or a subset.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TokenValue {
    Count(u32),
    Text(String),
    List(Vec<Literal>),
}

impl TokenEntry {
    /// Translate the entry's value into a selection for `def`.
    ///
    /// A count selects exact bounds on a bounded token and is a literal
    /// everywhere else; `none` omits an optional token.
    pub fn selection(&self, def: &TokenDefinition) -> Option<Selection> {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => return Some(Selection::Bounds(Bounds::new(min, max))),
            (Some(n), None) | (None, Some(n)) => return Some(Selection::Bounds(Bounds::exact(n))),
            (None, None) => {}
        }

        let selection = match self.value.as_ref()? {
            TokenValue::Count(n) => match def.control {
                ControlKind::Bounded { .. } => Selection::Bounds(Bounds::exact(*n)),
                _ => Selection::One(n.to_string()),
            },
            TokenValue::Text(text) if text == "none" => Selection::Omit,
            TokenValue::Text(text) => Selection::One(text.clone()),
            TokenValue::List(items) => Selection::Many(items.iter().map(Literal::to_string).collect()),
        };
        Some(selection)
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct FilePaths {
    pub relative_path_required: Option<bool>,
    pub severity_relative_path: Option<Severity>,
    pub severity_naming_pattern: Option<Severity>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Versioning {
    pub require_version_token: Option<bool>,
    pub version_token_regex: Option<String>,
    pub severity_require_token: Option<Severity>,
}

impl Config {
    /// Validate the config structure.
    ///
    /// Collects all validation errors and returns them at once so that users
    /// can fix every issue in a single pass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (custom, mut errors) = self.custom_definitions();
        let catalogue = Catalogue::builtin().layered(custom);

        if let Some(default) = self.defaults.as_ref().and_then(|d| d.template.as_deref())
            && default != BUILTIN_TEMPLATE
            && !self
                .templates
                .as_ref()
                .is_some_and(|templates| templates.contains_key(default))
        {
            errors.push(format!(
                "defaults.template: '{default}' is not defined in templates"
            ));
        }

        for (name, entry) in self.templates.iter().flatten() {
            if entry.tokens.is_empty() {
                errors.push(format!("templates.{name}: token list is empty"));
            }

            let mut seen = HashSet::new();
            for (i, token) in entry.tokens.iter().enumerate() {
                if catalogue.get(&token.name).is_none() {
                    errors.push(format!(
                        "templates.{name}.tokens[{i}]: unknown token '{}'",
                        token.name
                    ));
                }
                if !seen.insert(token.name.as_str()) {
                    errors.push(format!(
                        "templates.{name}.tokens[{i}]: duplicate token '{}'",
                        token.name
                    ));
                }
            }

            if entry.composite == Some(CompositePolicy::Authored) && entry.pattern.is_none() {
                errors.push(format!(
                    "templates.{name}: composite 'authored' requires a pattern"
                ));
            }
        }

        if let Some(pattern) = self
            .versioning
            .as_ref()
            .and_then(|v| v.version_token_regex.as_deref())
            && let Err(e) = regex::Regex::new(pattern)
        {
            errors.push(format!("versioning.version_token_regex: {e}"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn custom_definitions(&self) -> (Vec<TokenDefinition>, Vec<String>) {
        let mut definitions = Vec::new();
        let mut errors = Vec::new();
        for (name, entry) in self.token_definitions.iter().flatten() {
            match entry.to_definition(name) {
                Ok(def) => definitions.push(def),
                Err(e) => errors.push(e),
            }
        }
        (definitions, errors)
    }

    /// The built-in catalogue with `token_definitions` layered on top.
    pub fn catalogue(&self) -> Result<Catalogue, ConfigError> {
        let (custom, errors) = self.custom_definitions();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        Ok(Catalogue::builtin().layered(custom))
    }

    /// Pick the template to use: the requested one, then `defaults.template`,
    /// then the only configured template, then the built-in one.
    pub fn selected_template<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str, ConfigError> {
        if let Some(name) =
            requested.or_else(|| self.defaults.as_ref().and_then(|d| d.template.as_deref()))
        {
            return Ok(name);
        }
        let mut names = self.templates.iter().flat_map(|templates| templates.keys());
        match (names.next(), names.next()) {
            (None, _) => Ok(BUILTIN_TEMPLATE),
            (Some(only), None) => Ok(only.as_str()),
            (Some(_), Some(_)) => Err(ConfigError::NoTemplate),
        }
    }

    /// Resolve the token entries of template `name` against `catalogue`.
    pub fn build_template(&self, name: &str, catalogue: &Catalogue) -> Result<Template, ConfigError> {
        let wrap = |source: TemplateError| ConfigError::Template {
            name: name.to_string(),
            source,
        };

        let Some(entry) = self.templates.as_ref().and_then(|t| t.get(name)) else {
            if name == BUILTIN_TEMPLATE {
                return Template::from_catalogue(catalogue, &BUILTIN_TOKEN_ORDER).map_err(wrap);
            }
            return Err(ConfigError::UnknownTemplate(name.to_string()));
        };

        let slots = entry
            .tokens
            .iter()
            .map(|token| {
                let def = catalogue
                    .get(&token.name)
                    .cloned()
                    .ok_or_else(|| TemplateError::UnknownToken(token.name.clone()))?;
                let def = match &token.separator {
                    Some(separator) => def.with_separator(separator.clone()),
                    None => def,
                };
                let selection = token.selection(&def);
                Ok((def, selection))
            })
            .collect::<Result<Vec<_>, TemplateError>>()
            .map_err(wrap)?;

        Template::new(slots).map_err(wrap)
    }

    /// Build and compile template `name`, applying its composite policy.
    pub fn compile_template(
        &self,
        name: &str,
        catalogue: &Catalogue,
    ) -> Result<CompiledTemplate, ConfigError> {
        let template = self.build_template(name, catalogue)?;
        let wrap = |source: TemplateError| ConfigError::Template {
            name: name.to_string(),
            source,
        };

        let entry = self.templates.as_ref().and_then(|t| t.get(name));
        let policy = entry.and_then(|e| e.composite).unwrap_or_default();
        let authored = entry.and_then(|e| e.pattern.as_deref());

        match (policy, authored) {
            (CompositePolicy::Authored, Some(pattern)) => {
                template.compile_with_composite(pattern).map_err(wrap)
            }
            (CompositePolicy::Authored, None) => Err(ConfigError::Validation(vec![format!(
                "templates.{name}: composite 'authored' requires a pattern"
            )])),
            (CompositePolicy::Derive, authored) => {
                let compiled = template.compile().map_err(wrap)?;
                if let Some(pattern) = authored
                    && pattern.trim() != compiled.derived_pattern()
                {
                    tracing::warn!(
                        template = name,
                        authored = pattern,
                        derived = compiled.derived_pattern(),
                        "authored composite pattern is stale, using the derived pattern"
                    );
                }
                Ok(compiled)
            }
        }
    }

    /// Compile the template chosen by [`Config::selected_template`].
    pub fn compile_selected(&self, requested: Option<&str>) -> Result<CompiledTemplate, ConfigError> {
        let name = self.selected_template(requested)?;
        let catalogue = self.catalogue()?;
        tracing::debug!(template = name, "compiling template");
        self.compile_template(name, &catalogue)
    }

    /// Merge two configs. `self` is the base (e.g. global), `other` is the override (e.g. local).
    ///
    /// - token_definitions / templates: per-key override
    /// - defaults / file_paths / versioning: field-wise override (local wins)
    pub fn merge(self, other: Config) -> Config {
        Config {
            defaults: Self::merge_sections(self.defaults, other.defaults, |b, o| Defaults {
                severity: o.severity.or(b.severity),
                template: o.template.or(b.template),
            }),
            token_definitions: Self::merge_maps(self.token_definitions, other.token_definitions),
            templates: Self::merge_maps(self.templates, other.templates),
            file_paths: Self::merge_sections(self.file_paths, other.file_paths, |b, o| FilePaths {
                relative_path_required: o.relative_path_required.or(b.relative_path_required),
                severity_relative_path: o.severity_relative_path.or(b.severity_relative_path),
                severity_naming_pattern: o.severity_naming_pattern.or(b.severity_naming_pattern),
            }),
            versioning: Self::merge_sections(self.versioning, other.versioning, |b, o| {
                Versioning {
                    require_version_token: o.require_version_token.or(b.require_version_token),
                    version_token_regex: o.version_token_regex.or(b.version_token_regex),
                    severity_require_token: o.severity_require_token.or(b.severity_require_token),
                }
            }),
        }
    }

    fn merge_sections<T>(base: Option<T>, over: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
        match (base, over) {
            (Some(b), Some(o)) => Some(merge(b, o)),
            (b, o) => b.or(o),
        }
    }

    fn merge_maps<V>(
        base: Option<BTreeMap<String, V>>,
        over: Option<BTreeMap<String, V>>,
    ) -> Option<BTreeMap<String, V>> {
        match (base, over) {
            (Some(mut b), Some(o)) => {
                b.extend(o);
                Some(b)
            }
            (b, o) => b.or(o),
        }
    }
}

/// Parse a YAML string into a `Config`.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_saphyr::from_str(yaml)?;
    Ok(config)
}

/// Parse a JSON string into a `Config`.
pub fn parse_config_json(json: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(json)?;
    Ok(config)
}
