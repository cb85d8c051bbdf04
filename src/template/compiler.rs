//! Pattern compiler.
//!
//! Resolves every token of a [`Template`] into a concrete regex fragment and
//! concatenates the fragments and their separators into one anchored
//! composite pattern. The per-token matchers, tails and lookahead chains that
//! the token walker needs are compiled alongside the composite so that
//! validating a filename never compiles a regex.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::TemplateError;
use super::token::{Bounds, Catalogue, ControlKind, Selection, TokenDefinition};

/// Upper bound on the compiled size of any single regex. Configuration
/// controls pattern shape, so an oversized pattern is rejected instead of
/// being compiled.
const REGEX_SIZE_LIMIT: usize = 1 << 20;
const DFA_SIZE_LIMIT: usize = 2 << 20;

/// Legacy unbraced quantifiers such as `\d4` or `[A-Z]4`.
static UNBRACED_QUANTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\\d|\[[^\]]+\])(\d+)([^}\d]|$)").expect("quantifier pattern is valid")
});

pub(crate) fn build_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(DFA_SIZE_LIMIT)
        .build()
}

/// One token of a template together with the value the template pins on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSlot {
    pub definition: TokenDefinition,
    pub selection: Option<Selection>,
}

/// Ordered, immutable token sequence. Changing a selection produces a new
/// template that has to be compiled again.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    slots: Vec<TemplateSlot>,
}

impl Template {
    pub fn new<I>(slots: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (TokenDefinition, Option<Selection>)>,
    {
        let slots: Vec<TemplateSlot> = slots
            .into_iter()
            .map(|(definition, selection)| TemplateSlot {
                definition,
                selection,
            })
            .collect();

        if slots.is_empty() {
            return Err(TemplateError::EmptyTemplate);
        }

        let mut seen = HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.definition.name.as_str()) {
                return Err(TemplateError::DuplicateToken(slot.definition.name.clone()));
            }
        }

        Ok(Self { slots })
    }

    /// Template where no token carries a selection.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = TokenDefinition>,
    {
        Self::new(definitions.into_iter().map(|def| (def, None)))
    }

    /// Template built from catalogue entries in the given order.
    pub fn from_catalogue(catalogue: &Catalogue, names: &[&str]) -> Result<Self, TemplateError> {
        let definitions = names
            .iter()
            .map(|name| {
                catalogue
                    .get(name)
                    .cloned()
                    .ok_or_else(|| TemplateError::UnknownToken((*name).to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_definitions(definitions)
    }

    pub fn slots(&self) -> &[TemplateSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// A copy of this template with `selection` pinned on token `name`.
    pub fn with_selection(
        &self,
        name: &str,
        selection: Option<Selection>,
    ) -> Result<Self, TemplateError> {
        let mut slots = self.slots.clone();
        let slot = slots
            .iter_mut()
            .find(|slot| slot.definition.name == name)
            .ok_or_else(|| TemplateError::UnknownToken(name.to_string()))?;
        slot.selection = selection;
        Ok(Self { slots })
    }

    pub fn compile(&self) -> Result<CompiledTemplate, TemplateError> {
        compile(self)
    }

    /// Compile the token list but validate whole filenames against an
    /// authored composite instead of the derived one.
    pub fn compile_with_composite(&self, authored: &str) -> Result<CompiledTemplate, TemplateError> {
        let mut compiled = compile(self)?;
        let anchored = format!("^(?:{authored})$");
        compiled.composite = build_regex(&anchored).map_err(TemplateError::InvalidComposite)?;
        compiled.composite_source = anchored;
        compiled.origin = CompositeOrigin::Authored;
        Ok(compiled)
    }
}

/// Where the whole-match pattern of a compiled template came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOrigin {
    Derived,
    Authored,
}

/// A resolved token ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledToken {
    pub name: String,
    pub label: String,
    /// Resolved fragment, case-insensitivity scoping included.
    pub fragment: String,
    /// Separator emitted after the fragment; always empty on the last token.
    pub separator: String,
    /// Separator emitted before the fragment. Only optional tokens after the
    /// last required one carry it, so an absent trailing token takes its
    /// separator with it.
    pub leading: String,
    pub optional: bool,
    pub example: String,
    /// Human-readable description of what the fragment accepts.
    pub expected: String,
    pub(crate) matcher: Regex,
    /// Units after this token, anchored at both ends. Runs on the text left
    /// once the token and its trailing separator are consumed.
    pub(crate) tail: Regex,
    /// `lookahead[k]` matches the next `k + 1` units as a prefix of that
    /// same text.
    pub(crate) lookahead: Vec<Regex>,
}

impl CompiledToken {
    /// Whether the fragment accepts exactly `text`.
    pub fn accepts(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Derived artifact of a [`Template`]: the composite pattern plus the
/// per-token matchers used for diagnosis.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: Template,
    tokens: Vec<CompiledToken>,
    pub(crate) composite: Regex,
    composite_source: String,
    derived_source: String,
    origin: CompositeOrigin,
}

impl CompiledTemplate {
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Tokens present in the compiled pattern, omitted tokens excluded.
    pub fn tokens(&self) -> &[CompiledToken] {
        &self.tokens
    }

    /// The pattern used for whole-filename matching.
    pub fn composite_pattern(&self) -> &str {
        &self.composite_source
    }

    /// The pattern derived from the token list, regardless of origin.
    pub fn derived_pattern(&self) -> &str {
        &self.derived_source
    }

    pub fn origin(&self) -> CompositeOrigin {
        self.origin
    }

    /// A conforming filename assembled from each token's example.
    pub fn example(&self) -> String {
        self.tokens
            .iter()
            .flat_map(|token| {
                [
                    token.leading.as_str(),
                    token.example.as_str(),
                    token.separator.as_str(),
                ]
            })
            .collect()
    }
}

/// Compile `template` into its composite pattern and per-token matchers.
pub fn compile(template: &Template) -> Result<CompiledTemplate, TemplateError> {
    let mut resolved = Vec::with_capacity(template.len());
    for slot in template.slots() {
        if let Some(token) = resolve(&slot.definition, slot.selection.as_ref())? {
            resolved.push((&slot.definition, token));
        }
    }
    if resolved.is_empty() {
        return Err(TemplateError::EmptyTemplate);
    }

    // Optional tokens after the last required one own the separator before
    // them instead of the one after.
    let trailing_start = resolved
        .iter()
        .rposition(|(def, _)| !def.optional)
        .map_or(resolved.len(), |i| i + 1);
    let definitions: Vec<&TokenDefinition> = resolved.iter().map(|(def, _)| *def).collect();
    let separators: Vec<(&str, &str)> = (0..definitions.len())
        .map(|i| {
            let leading = if i >= trailing_start {
                definitions[i - 1].separator.as_str()
            } else {
                ""
            };
            let trailing = if i + 1 >= trailing_start || i + 1 == definitions.len() {
                ""
            } else {
                definitions[i].separator.as_str()
            };
            (leading, trailing)
        })
        .collect();

    for (i, pair) in resolved.windows(2).enumerate() {
        let ((left_def, left), (right_def, right)) = (&pair[0], &pair[1]);
        let joined = separators[i].1.is_empty() && separators[i + 1].0.is_empty();
        if joined && is_unbounded(&left.fragment) && is_unbounded(&right.fragment) {
            return Err(TemplateError::AmbiguousAdjacency {
                left: left_def.name.clone(),
                right: right_def.name.clone(),
            });
        }
    }

    let units: Vec<String> = resolved
        .iter()
        .zip(&separators)
        .map(|((def, token), (leading, trailing))| {
            unit(&token.fragment, leading, trailing, def.optional)
        })
        .collect();

    let derived_source = format!("^{}$", units.concat());
    let composite = build_regex(&derived_source).map_err(TemplateError::InvalidComposite)?;

    let mut tokens = Vec::with_capacity(resolved.len());
    for (i, ((def, token), (leading, trailing))) in
        resolved.into_iter().zip(&separators).enumerate()
    {
        let rest = &units[i + 1..];
        let tail = build_regex(&format!("^{}$", rest.concat()))
            .map_err(TemplateError::InvalidComposite)?;
        let lookahead = (1..=rest.len())
            .map(|count| build_regex(&format!("^{}", rest[..count].concat())))
            .collect::<Result<Vec<_>, _>>()
            .map_err(TemplateError::InvalidComposite)?;

        tokens.push(CompiledToken {
            name: def.name.clone(),
            label: def.label.clone(),
            fragment: token.fragment,
            separator: (*trailing).to_string(),
            leading: (*leading).to_string(),
            optional: def.optional,
            example: token.example,
            expected: token.expected,
            matcher: token.matcher,
            tail,
            lookahead,
        });
    }

    Ok(CompiledTemplate {
        template: template.clone(),
        tokens,
        composite,
        composite_source: derived_source.clone(),
        derived_source,
        origin: CompositeOrigin::Derived,
    })
}

struct ResolvedToken {
    fragment: String,
    example: String,
    expected: String,
    matcher: Regex,
}

/// Resolve a definition and its selection into a concrete fragment.
/// Returns `None` for an omitted optional token.
fn resolve(
    def: &TokenDefinition,
    selection: Option<&Selection>,
) -> Result<Option<ResolvedToken>, TemplateError> {
    if let Some(Selection::Omit) = selection {
        return if def.optional {
            Ok(None)
        } else {
            Err(TemplateError::IllegalOmit(def.name.clone()))
        };
    }

    let mismatch = |selection: &Selection| TemplateError::SelectionMismatch {
        token: def.name.clone(),
        selection: selection.describe(),
    };

    let mut choices: Option<Vec<String>> = None;
    let (fragment, derived_example) = match (&def.control, selection) {
        (ControlKind::Fixed { pattern }, None) => (normalize_quantifiers(pattern), None),
        (ControlKind::Fixed { pattern }, Some(Selection::One(value))) => {
            let pattern = normalize_quantifiers(pattern);
            if !exact_matcher(&def.name, &pattern)?.is_match(value) {
                return Err(TemplateError::LiteralMismatch {
                    token: def.name.clone(),
                    value: value.clone(),
                    pattern,
                });
            }
            (regex::escape(value), Some(value.clone()))
        }
        (ControlKind::Fixed { .. }, Some(other)) => return Err(mismatch(other)),
        (
            ControlKind::Bounded {
                pattern,
                default,
                limits,
            },
            selection,
        ) => {
            let bounds = match selection {
                None => *default,
                Some(Selection::Bounds(bounds)) => *bounds,
                Some(other) => return Err(mismatch(other)),
            };
            check_bounds(def, bounds, *limits)?;
            let fragment = normalize_quantifiers(&substitute_bounds(pattern, bounds));
            let example = bounded_example(&fragment, bounds);
            (fragment, example)
        }
        (ControlKind::Choice { options }, selection) => {
            let chosen = match selection {
                None => options.clone(),
                Some(Selection::One(value)) => vec![check_option(def, options, value)?],
                Some(other) => return Err(mismatch(other)),
            };
            let fragment = alternation(def, &chosen)?;
            let example = chosen.first().cloned();
            choices = Some(chosen);
            (fragment, example)
        }
        (ControlKind::MultiChoice { options }, selection) => {
            let chosen = match selection {
                None => options.clone(),
                Some(Selection::Many(values)) if values.is_empty() => options.clone(),
                Some(Selection::Many(values)) => values
                    .iter()
                    .map(|value| check_option(def, options, value))
                    .collect::<Result<Vec<_>, _>>()?,
                Some(Selection::One(value)) => vec![check_option(def, options, value)?],
                Some(other) => return Err(mismatch(other)),
            };
            let fragment = alternation(def, &chosen)?;
            let example = chosen.first().cloned();
            choices = Some(chosen);
            (fragment, example)
        }
    };

    let fragment = if def.case_insensitive {
        format!("(?i:{fragment})")
    } else {
        fragment
    };
    let matcher = exact_matcher(&def.name, &fragment)?;

    let example = def
        .examples
        .iter()
        .chain(derived_example.iter())
        .find(|example| matcher.is_match(example))
        .cloned();

    let expected = match (&choices, &example) {
        (Some(chosen), _) => format!("one of [{}]", chosen.join(", ")),
        (None, Some(example)) => format!("'{fragment}' (e.g. '{example}')"),
        (None, None) => format!("'{fragment}'"),
    };

    Ok(Some(ResolvedToken {
        example: example.unwrap_or_else(|| def.label.clone()),
        fragment,
        expected,
        matcher,
    }))
}

fn exact_matcher(token: &str, fragment: &str) -> Result<Regex, TemplateError> {
    build_regex(&format!("^(?:{fragment})$")).map_err(|source| TemplateError::InvalidFragment {
        token: token.to_string(),
        source,
    })
}

fn check_bounds(def: &TokenDefinition, bounds: Bounds, limits: Bounds) -> Result<(), TemplateError> {
    if bounds.min > bounds.max {
        return Err(TemplateError::InvalidBounds {
            token: def.name.clone(),
            min: bounds.min,
            max: bounds.max,
        });
    }
    if !limits.contains(&bounds) {
        return Err(TemplateError::BoundsOutOfRange {
            token: def.name.clone(),
            min: bounds.min,
            max: bounds.max,
            lower: limits.min,
            upper: limits.max,
        });
    }
    Ok(())
}

fn check_option(
    def: &TokenDefinition,
    options: &[String],
    value: &str,
) -> Result<String, TemplateError> {
    options
        .iter()
        .find(|option| {
            if def.case_insensitive {
                option.eq_ignore_ascii_case(value)
            } else {
                option.as_str() == value
            }
        })
        .cloned()
        .ok_or_else(|| TemplateError::UnknownOption {
            token: def.name.clone(),
            value: value.to_string(),
        })
}

/// Alternation of escaped literals, longest first so that no option shadows
/// a longer one sharing its prefix.
fn alternation(def: &TokenDefinition, chosen: &[String]) -> Result<String, TemplateError> {
    if def.control.options().is_empty() || chosen.is_empty() {
        return Err(TemplateError::EmptyChoices {
            token: def.name.clone(),
        });
    }
    let mut literals: Vec<&String> = Vec::with_capacity(chosen.len());
    for option in chosen {
        if !literals.contains(&option) {
            literals.push(option);
        }
    }
    literals.sort_by_key(|option| std::cmp::Reverse(option.len()));
    Ok(literals
        .into_iter()
        .map(|option| regex::escape(option))
        .collect::<Vec<_>>()
        .join("|"))
}

fn substitute_bounds(pattern: &str, bounds: Bounds) -> String {
    let count = if bounds.is_exact() {
        format!("{{{}}}", bounds.min)
    } else {
        format!("{{{},{}}}", bounds.min, bounds.max)
    };
    pattern
        .replace("MIN_VAL", &bounds.min.to_string())
        .replace("MAX_VAL", &bounds.max.to_string())
        .replace("{n}", &count)
}

fn bounded_example(fragment: &str, bounds: Bounds) -> Option<String> {
    let count = bounds.min as usize;
    if fragment.contains(r"\d") {
        Some("0".repeat(count))
    } else if fragment.contains("[A-Za-z]")
        || fragment.contains("[a-zA-Z]")
        || fragment.contains("[A-Z]")
    {
        Some("A".repeat(count))
    } else if fragment.contains("[a-z]") {
        Some("a".repeat(count))
    } else {
        None
    }
}

/// Rewrite legacy unbraced quantifiers: `\d4` → `\d{4}`, `[A-Z]4` → `[A-Z]{4}`.
pub(crate) fn normalize_quantifiers(pattern: &str) -> String {
    let mut current = pattern.to_string();
    loop {
        let next = UNBRACED_QUANTIFIER
            .replace_all(&current, "${1}{${2}}${3}")
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Whether `fragment` can match arbitrarily long input: it contains `*`, `+`
/// or an open `{n,}` repetition outside escapes and character classes.
pub(crate) fn is_unbounded(fragment: &str) -> bool {
    let mut chars = fragment.chars().peekable();
    let mut in_class = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '*' | '+' if !in_class => return true,
            '{' if !in_class => {
                let mut body = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    body.push(c);
                }
                if let Some((lower, upper)) = body.split_once(',')
                    && !lower.trim().is_empty()
                    && upper.trim().is_empty()
                {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

fn unit(fragment: &str, leading: &str, trailing: &str, optional: bool) -> String {
    let unit = format!(
        "{}(?:{fragment}){}",
        regex::escape(leading),
        regex::escape(trailing)
    );
    if optional {
        format!("(?:{unit})?")
    } else {
        unit
    }
}
