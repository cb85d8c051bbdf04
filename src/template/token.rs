//! Token definitions and the catalogue they are looked up from.
//!
//! A [`TokenDefinition`] describes one slot of a filename template. Its
//! [`ControlKind`] decides how the definition's pattern is turned into a
//! concrete regex fragment once a template pins a [`Selection`] on it.

use std::collections::BTreeMap;

/// Inclusive repetition bounds for a bounded token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Bounds that accept exactly `n` repetitions.
    pub const fn exact(n: u32) -> Self {
        Self { min: n, max: n }
    }

    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }

    /// Whether `other` lies entirely within these bounds.
    pub fn contains(&self, other: &Bounds) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

/// How a definition's pattern is parameterized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    /// Pattern used unchanged.
    Fixed { pattern: String },
    /// Pattern with `MIN_VAL` / `MAX_VAL` / `{n}` size placeholders.
    Bounded {
        pattern: String,
        default: Bounds,
        limits: Bounds,
    },
    /// Exactly one literal out of `options`.
    Choice { options: Vec<String> },
    /// Any literal out of a selected subset of `options`.
    MultiChoice { options: Vec<String> },
}

impl ControlKind {
    /// Options offered by choice kinds; empty for pattern kinds.
    pub fn options(&self) -> &[String] {
        match self {
            ControlKind::Choice { options } | ControlKind::MultiChoice { options } => options,
            ControlKind::Fixed { .. } | ControlKind::Bounded { .. } => &[],
        }
    }
}

/// Concrete value a template pins on a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Bounds(Bounds),
    One(String),
    Many(Vec<String>),
    /// Drop an optional token (and its separator) from the template.
    Omit,
}

impl Selection {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Selection::Bounds(_) => "bounds",
            Selection::One(_) => "single value",
            Selection::Many(_) => "subset",
            Selection::Omit => "omit",
        }
    }
}

/// Immutable description of one template slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDefinition {
    pub name: String,
    /// Display form, e.g. `<sequence>`.
    pub label: String,
    pub description: String,
    pub control: ControlKind,
    pub examples: Vec<String>,
    /// Literal emitted after this token and before the next one.
    pub separator: String,
    /// The token and its separator may be absent as a unit.
    pub optional: bool,
    /// Compile the fragment inside a scoped `(?i:...)` group.
    pub case_insensitive: bool,
}

impl TokenDefinition {
    pub fn new(name: impl Into<String>, control: ControlKind) -> Self {
        let name = name.into();
        Self {
            label: format!("<{name}>"),
            name,
            description: String::new(),
            control,
            examples: Vec::new(),
            separator: String::new(),
            optional: false,
            case_insensitive: false,
        }
    }

    pub fn fixed(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            name,
            ControlKind::Fixed {
                pattern: pattern.into(),
            },
        )
    }

    pub fn bounded(
        name: impl Into<String>,
        pattern: impl Into<String>,
        default: Bounds,
        limits: Bounds,
    ) -> Self {
        Self::new(
            name,
            ControlKind::Bounded {
                pattern: pattern.into(),
                default,
                limits,
            },
        )
    }

    pub fn choice<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ControlKind::Choice {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn multi_choice<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ControlKind::MultiChoice {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// The unresolved pattern as shown to users: the pattern template for
    /// pattern kinds, the full option alternation for choice kinds.
    pub fn pattern_template(&self) -> String {
        match &self.control {
            ControlKind::Fixed { pattern } | ControlKind::Bounded { pattern, .. } => {
                pattern.clone()
            }
            ControlKind::Choice { options } | ControlKind::MultiChoice { options } => {
                options.join("|")
            }
        }
    }
}

/// Immutable name → definition mapping handed to template construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    tokens: BTreeMap<String, TokenDefinition>,
}

impl Catalogue {
    pub fn new(definitions: impl IntoIterator<Item = TokenDefinition>) -> Self {
        Self {
            tokens: definitions
                .into_iter()
                .map(|def| (def.name.clone(), def))
                .collect(),
        }
    }

    /// The studio token set used when a configuration defines no tokens of
    /// its own.
    pub fn builtin() -> Self {
        Self::new([
            TokenDefinition::bounded(
                "sequence",
                "[A-Za-z]{MIN_VAL,MAX_VAL}",
                Bounds::new(3, 4),
                Bounds::new(2, 8),
            )
            .with_description("Upper/lowercase sequence abbreviation")
            .with_examples(["WTFB", "KITC", "IGBI"]),
            TokenDefinition::bounded("shotNumber", r"\d{n}", Bounds::exact(4), Bounds::new(2, 8))
                .with_description("Shot number (digits)")
                .with_examples(["0010", "0020", "0101"])
                .with_separator("_"),
            TokenDefinition::fixed("description", ".+?")
                .with_description("Single word or hyphenated description")
                .with_examples(["comp", "roto-main", "compFinal"])
                .with_separator("_"),
            TokenDefinition::choice("pixelMappingName", ["LL180", "LL360"])
                .with_description("Pixel mapping name")
                .with_separator("_")
                .optional(),
            TokenDefinition::fixed("resolution", r"\d{1,2}[kK]")
                .with_description("Resolution abbreviation")
                .with_examples(["4k", "2k", "12k"])
                .with_separator("_"),
            TokenDefinition::multi_choice(
                "colorspaceGamma",
                [
                    "r709g24",
                    "sRGBg22",
                    "acescglin",
                    "ap0lin",
                    "ap1g22",
                    "p3g26",
                    "rec2020lin",
                ],
            )
            .with_description("Colorspace and gamma")
            .with_separator("_"),
            TokenDefinition::choice("fps", ["2997", "5994", "24", "25", "30", "50", "60"])
                .with_description("Frames per second")
                .with_separator("_"),
            TokenDefinition::fixed("version", r"v\d{2,3}")
                .with_description("Version (v + 2-3 digits)")
                .with_examples(["v001", "v010", "v114"])
                .with_separator("."),
            TokenDefinition::fixed("frame_padding", "(?:%0[4-8]d|#{4,8})")
                .with_description("Frame padding (%04d to %08d, #### to ########)")
                .with_examples(["%04d", "####"])
                .with_separator("."),
            TokenDefinition::multi_choice(
                "extension",
                ["exr", "jpg", "jpeg", "png", "mxf", "mov", "tiff", "dpx"],
            )
            .with_description("File extension")
            .case_insensitive(),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&TokenDefinition> {
        self.tokens.get(name)
    }

    /// A new catalogue with `overrides` added on top; a definition with an
    /// existing name replaces the old one.
    pub fn layered(&self, overrides: impl IntoIterator<Item = TokenDefinition>) -> Self {
        let mut tokens = self.tokens.clone();
        for def in overrides {
            tokens.insert(def.name.clone(), def);
        }
        Self { tokens }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
