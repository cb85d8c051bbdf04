//! Token walker: the diagnostic fallback that runs when a filename fails the
//! composite pattern.
//!
//! The walker consumes the filename token by token and reports the first
//! place where it diverges from the template. For each token it considers
//! every prefix the token's fragment accepts, and for optional tokens the
//! possibility that the token is absent, and keeps the candidate that lets
//! the rest of the filename get furthest through the template.

use super::compiler::{CompiledTemplate, CompiledToken};
use super::validator::{Diagnostic, DiagnosticKind};

const PREVIEW_CHARS: usize = 15;
const COMPLETE: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Absent,
    Present(usize),
}

/// Walk `filename` through the template's tokens. Returns the first
/// divergence, or `None` when every token and separator is consumed and
/// nothing is left over.
///
/// Each token tries every char boundary of the remaining text against the
/// units after it, so the walk is quadratic in the filename length. Inputs
/// are basenames, which keeps that bound small.
pub fn walk(compiled: &CompiledTemplate, filename: &str) -> Option<Diagnostic> {
    let tokens = compiled.tokens();
    let mut pos = 0;
    let mut last_present: Option<&CompiledToken> = None;

    for (i, token) in tokens.iter().enumerate() {
        let rest = &filename[pos..];
        let Some((candidate, rank)) = choose(token, rest) else {
            return Some(token_mismatch(token, rest, pos));
        };

        let end = match candidate {
            Candidate::Present(end) => end,
            Candidate::Absent if rank == COMPLETE => continue,
            Candidate::Absent => {
                if let Some(diagnostic) = explain_absence(tokens, i, rest, pos, rank) {
                    return Some(diagnostic);
                }
                continue;
            }
        };

        let after = &rest[end..];
        if !after.starts_with(token.separator.as_str()) {
            let next = tokens.get(i + 1).map_or("end", |next| next.name.as_str());
            return Some(missing_separator(
                &token.separator,
                &token.name,
                next,
                after,
                pos + end,
            ));
        }
        pos += end + token.separator.len();
        last_present = Some(token);
    }

    if pos < filename.len() {
        let last = last_present
            .or(tokens.last())
            .map_or("", |token| token.name.as_str());
        let found = preview(&filename[pos..], "");
        return Some(Diagnostic {
            kind: DiagnosticKind::TrailingContent,
            subject: last.to_string(),
            message: format!(
                "unexpected trailing content after '{last}': found {}",
                quote_found(&found)
            ),
            expected: "end of filename".to_string(),
            found,
            position: pos,
        });
    }

    None
}

/// Diagnose a filename that failed whole-match. When the walk itself finds
/// nothing wrong, the composite and the token list disagree and that
/// inconsistency is reported instead.
pub fn diagnose(compiled: &CompiledTemplate, filename: &str) -> Diagnostic {
    walk(compiled, filename).unwrap_or_else(|| Diagnostic {
        kind: DiagnosticKind::TemplateMismatch,
        subject: "template".to_string(),
        message: format!(
            "template mismatch: filename parses token-by-token but fails the composite pattern '{}'",
            compiled.composite_pattern()
        ),
        expected: compiled.composite_pattern().to_string(),
        found: filename.to_string(),
        position: 0,
    })
}

fn token_mismatch(token: &CompiledToken, rest: &str, position: usize) -> Diagnostic {
    let found = preview(rest, &token.separator);
    Diagnostic {
        kind: DiagnosticKind::TokenMismatch,
        subject: token.name.clone(),
        message: format!(
            "invalid '{}': expected {} but found {}",
            token.label,
            token.expected,
            quote_found(&found)
        ),
        expected: token.expected.clone(),
        found,
        position,
    }
}

fn missing_separator(
    separator: &str,
    left: &str,
    right: &str,
    rest: &str,
    position: usize,
) -> Diagnostic {
    let found = preview(rest, separator);
    Diagnostic {
        kind: DiagnosticKind::MissingSeparator,
        subject: format!("separator after {left}"),
        message: format!(
            "missing separator '{separator}' between '{left}' and '{right}': found {}",
            quote_found(&found)
        ),
        expected: format!("'{separator}'"),
        found,
        position,
    }
}

/// An optional token was skipped but the rest still fails. Blame the token
/// itself when treating its text as a malformed or unseparated occurrence
/// lets the rest of the filename get further than skipping it did.
fn explain_absence(
    tokens: &[CompiledToken],
    i: usize,
    rest: &str,
    pos: usize,
    absent_rank: usize,
) -> Option<Diagnostic> {
    let token = &tokens[i];
    let next = tokens.get(i + 1).map_or("end", |next| next.name.as_str());
    let beats = |remaining: &str| conformance(token, remaining) > absent_rank;

    if !token.leading.is_empty() && !rest.starts_with(token.leading.as_str()) {
        let previous = i.checked_sub(1).map_or("start", |p| tokens[p].name.as_str());
        return fragment_ends(token, rest)
            .filter(|&end| end > 0)
            .any(|end| beats(&rest[end..]))
            .then(|| missing_separator(&token.leading, previous, &token.name, rest, pos));
    }

    let body = &rest[token.leading.len()..];
    let body_pos = pos + token.leading.len();

    if !token.separator.is_empty()
        && let Some(end) = fragment_ends(token, body)
            .find(|&end| {
                end > 0
                    && !body[end..].starts_with(token.separator.as_str())
                    && beats(&body[end..])
            })
    {
        return Some(missing_separator(
            &token.separator,
            &token.name,
            next,
            &body[end..],
            body_pos + end,
        ));
    }

    // The span up to the next boundary as a malformed occurrence.
    let boundary = if token.separator.is_empty() {
        tokens.get(i + 1).map_or("", |next| next.leading.as_str())
    } else {
        token.separator.as_str()
    };
    let span_end = match (boundary.is_empty(), tokens.get(i + 1)) {
        (true, None) => body.len(),
        (true, Some(_)) => return None,
        (false, _) => body.find(boundary)?,
    };
    if span_end == 0 {
        return None;
    }
    let remaining = &body[span_end..];
    let remaining = remaining
        .strip_prefix(token.separator.as_str())
        .unwrap_or(remaining);
    beats(remaining).then(|| token_mismatch(token, body, body_pos))
}

/// Byte offsets into `text` at which a prefix is accepted by the token's
/// fragment.
fn fragment_ends<'a>(token: &'a CompiledToken, text: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .filter(move |&end| token.accepts(&text[..end]))
}

fn choose(token: &CompiledToken, rest: &str) -> Option<(Candidate, usize)> {
    let ends: Vec<Candidate> = match rest.strip_prefix(token.leading.as_str()) {
        Some(body) => fragment_ends(token, body)
            .map(|end| Candidate::Present(token.leading.len() + end))
            .collect(),
        None => Vec::new(),
    };
    let absent = token.optional.then_some(Candidate::Absent);

    let mut best: Option<(Candidate, usize)> = None;
    for candidate in absent.into_iter().chain(ends) {
        let rank = score(token, rest, candidate);
        if best.is_none_or(|(current, current_rank)| prefer(candidate, rank, current, current_rank)) {
            best = Some((candidate, rank));
        }
    }
    best
}

fn prefer(candidate: Candidate, score: usize, current: Candidate, current_score: usize) -> bool {
    if score != current_score {
        return score > current_score;
    }
    match (candidate, current) {
        (Candidate::Present(_), Candidate::Absent) => score > 0,
        (Candidate::Absent, _) => false,
        (Candidate::Present(a), Candidate::Present(b)) => {
            if score > 0 {
                a < b
            } else {
                a > b
            }
        }
    }
}

/// `COMPLETE` when the rest conforms to the remaining units, otherwise how
/// far the separator and the following units get as a prefix chain.
fn score(token: &CompiledToken, rest: &str, candidate: Candidate) -> usize {
    let remaining = match candidate {
        Candidate::Absent => rest,
        Candidate::Present(end) => match rest[end..].strip_prefix(token.separator.as_str()) {
            Some(remaining) => remaining,
            None => return 0,
        },
    };
    conformance(token, remaining)
}

/// How well `remaining` fits the units after `token`.
fn conformance(token: &CompiledToken, remaining: &str) -> usize {
    if token.tail.is_match(remaining) {
        return COMPLETE;
    }
    1 + token
        .lookahead
        .iter()
        .take_while(|chain| chain.is_match(remaining))
        .count()
}

/// Remaining text up to and including the next `separator`, or a truncated
/// head of it.
fn preview(rest: &str, separator: &str) -> String {
    if !separator.is_empty()
        && let Some(at) = rest.find(separator)
    {
        return rest[..at + separator.len()].to_string();
    }
    if rest.chars().count() > PREVIEW_CHARS {
        let head: String = rest.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        rest.to_string()
    }
}

fn quote_found(found: &str) -> String {
    if found.is_empty() {
        "end of filename".to_string()
    } else {
        format!("'{found}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::test_support::scenario_template;
    use crate::template::{Catalogue, Selection, Template, TokenDefinition};
    use rstest::{fixture, rstest};

    #[fixture]
    fn compiled() -> CompiledTemplate {
        scenario_template().compile().unwrap()
    }

    #[rstest]
    fn conforming_filename_walks_cleanly(compiled: CompiledTemplate) {
        assert_eq!(walk(&compiled, "WTFB0101_comp_4k_v001.exr"), None);
    }

    #[rstest]
    #[case::short_shot_number(
        "WTFB101_comp_4k_v001.exr",
        DiagnosticKind::TokenMismatch,
        "shotNumber",
        "101_",
        4
    )]
    #[case::missing_separator(
        "WTFB0101comp_4k_v001.exr",
        DiagnosticKind::MissingSeparator,
        "separator after shotNumber",
        "comp_",
        8
    )]
    #[case::bad_resolution(
        "WTFB0101_comp_4x_v001.exr",
        DiagnosticKind::TokenMismatch,
        "resolution",
        "4x_",
        14
    )]
    #[case::short_version(
        "WTFB0101_comp_4k_v1.exr",
        DiagnosticKind::TokenMismatch,
        "version",
        "v1.",
        17
    )]
    #[case::unknown_extension(
        "WTFB0101_comp_4k_v001.tiff",
        DiagnosticKind::TokenMismatch,
        "extension",
        "tiff",
        22
    )]
    #[case::missing_extension(
        "WTFB0101_comp_4k_v001.",
        DiagnosticKind::TokenMismatch,
        "extension",
        "",
        22
    )]
    #[case::trailing_content(
        "WTFB0101_comp_4k_v001.exr.bak",
        DiagnosticKind::TrailingContent,
        "extension",
        ".bak",
        25
    )]
    #[case::digit_in_sequence(
        "WT1B0101_comp_4k_v001.exr",
        DiagnosticKind::TokenMismatch,
        "sequence",
        "WT1B0101_comp_4...",
        0
    )]
    fn reports_first_divergence(
        compiled: CompiledTemplate,
        #[case] filename: &str,
        #[case] kind: DiagnosticKind,
        #[case] subject: &str,
        #[case] found: &str,
        #[case] position: usize,
    ) {
        let diagnostic = walk(&compiled, filename).unwrap();
        assert_eq!(diagnostic.kind, kind);
        assert_eq!(diagnostic.subject, subject);
        assert_eq!(diagnostic.found, found);
        assert_eq!(diagnostic.position, position);
    }

    #[rstest]
    fn token_mismatch_message_names_pattern_and_example(compiled: CompiledTemplate) {
        let diagnostic = walk(&compiled, "WTFB101_comp_4k_v001.exr").unwrap();
        assert_eq!(
            diagnostic.message,
            r"invalid '<shotNumber>': expected '\d{4}' (e.g. '0010') but found '101_'"
        );
        assert_eq!(diagnostic.expected, r"'\d{4}' (e.g. '0010')");
    }

    #[rstest]
    fn choice_mismatch_lists_options(compiled: CompiledTemplate) {
        let diagnostic = walk(&compiled, "WTFB0101_comp_4k_v001.tiff").unwrap();
        assert_eq!(
            diagnostic.message,
            "invalid '<extension>': expected one of [exr, mov] but found 'tiff'"
        );
    }

    #[rstest]
    fn missing_separator_message_names_both_neighbours(compiled: CompiledTemplate) {
        let diagnostic = walk(&compiled, "WTFB0101comp_4k_v001.exr").unwrap();
        assert_eq!(
            diagnostic.message,
            "missing separator '_' between 'shotNumber' and 'description': found 'comp_'"
        );
        assert_eq!(diagnostic.expected, "'_'");
    }

    #[rstest]
    fn empty_remainder_reads_end_of_filename(compiled: CompiledTemplate) {
        let diagnostic = walk(&compiled, "WTFB0101_comp_4k_v001.").unwrap();
        assert!(diagnostic.message.ends_with("but found end of filename"));
    }

    #[rstest]
    fn variable_token_does_not_swallow_separators(compiled: CompiledTemplate) {
        // The description could stretch to "comp_4x" but stopping at the
        // first separator pins the error on the resolution.
        let diagnostic = walk(&compiled, "WTFB0101_comp_4x_v001.exr").unwrap();
        assert_eq!(diagnostic.subject, "resolution");
    }

    #[rstest]
    fn description_may_contain_separator_when_rest_conforms(compiled: CompiledTemplate) {
        assert_eq!(walk(&compiled, "WTFB0101_comp_final_4k_v001.exr"), None);
    }

    #[test]
    fn optional_token_may_be_absent_or_present() {
        let compiled = Template::from_catalogue(
            &Catalogue::builtin(),
            &["description", "pixelMappingName", "resolution"],
        )
        .unwrap()
        .compile()
        .unwrap();
        assert_eq!(walk(&compiled, "comp_LL180_4k"), None);
        assert_eq!(walk(&compiled, "comp_4k"), None);

        let diagnostic = walk(&compiled, "comp_LL180_4x").unwrap();
        assert_eq!(diagnostic.subject, "resolution");
        assert_eq!(diagnostic.found, "4x");
    }

    fn pixel_mapping_between() -> CompiledTemplate {
        Template::from_definitions([
            TokenDefinition::fixed("description", "[a-z]+").with_separator("_"),
            TokenDefinition::choice("pixelMappingName", ["LL180", "LL360"])
                .with_separator("_")
                .optional(),
            TokenDefinition::fixed("resolution", r"\d{1,2}k"),
        ])
        .unwrap()
        .compile()
        .unwrap()
    }

    fn pixel_mapping_last() -> CompiledTemplate {
        Template::from_definitions([
            TokenDefinition::fixed("shot", r"\d{4}").with_separator("_"),
            TokenDefinition::fixed("version", r"v\d{3}").with_separator("_"),
            TokenDefinition::choice("pixelMappingName", ["LL180"]).optional(),
        ])
        .unwrap()
        .compile()
        .unwrap()
    }

    #[rstest]
    #[case::present_without_separator(
        "comp_LL1804k",
        DiagnosticKind::MissingSeparator,
        "separator after pixelMappingName",
        "4k",
        10,
        "missing separator '_' between 'pixelMappingName' and 'resolution': found '4k'"
    )]
    #[case::malformed_value(
        "comp_LL190_4k",
        DiagnosticKind::TokenMismatch,
        "pixelMappingName",
        "LL190_",
        5,
        "invalid '<pixelMappingName>': expected one of [LL180, LL360] but found 'LL190_'"
    )]
    #[case::absent_with_bad_resolution(
        "comp_4x",
        DiagnosticKind::TokenMismatch,
        "resolution",
        "4x",
        5,
        r"invalid '<resolution>': expected '\d{1,2}k' but found '4x'"
    )]
    fn optional_token_text_is_blamed_on_that_token(
        #[case] filename: &str,
        #[case] kind: DiagnosticKind,
        #[case] subject: &str,
        #[case] found: &str,
        #[case] position: usize,
        #[case] message: &str,
    ) {
        let diagnostic = walk(&pixel_mapping_between(), filename).unwrap();
        assert_eq!(diagnostic.kind, kind);
        assert_eq!(diagnostic.subject, subject);
        assert_eq!(diagnostic.found, found);
        assert_eq!(diagnostic.position, position);
        assert_eq!(diagnostic.message, message);
    }

    #[rstest]
    #[case::absent("0010_v001")]
    #[case::present("0010_v001_LL180")]
    fn trailing_optional_token_walks_cleanly(#[case] filename: &str) {
        assert_eq!(walk(&pixel_mapping_last(), filename), None);
    }

    #[rstest]
    #[case::dangling_separator(
        "0010_v001_",
        DiagnosticKind::TrailingContent,
        "version",
        "_"
    )]
    #[case::unseparated(
        "0010_v001LL180",
        DiagnosticKind::MissingSeparator,
        "separator after version",
        "LL180"
    )]
    #[case::malformed(
        "0010_v001_LL190",
        DiagnosticKind::TokenMismatch,
        "pixelMappingName",
        "LL190"
    )]
    fn trailing_optional_token_divergence(
        #[case] filename: &str,
        #[case] kind: DiagnosticKind,
        #[case] subject: &str,
        #[case] found: &str,
    ) {
        let diagnostic = walk(&pixel_mapping_last(), filename).unwrap();
        assert_eq!(diagnostic.kind, kind);
        assert_eq!(diagnostic.subject, subject);
        assert_eq!(diagnostic.found, found);
    }

    #[test]
    fn omitted_token_is_not_walked() {
        let template = Template::from_catalogue(
            &Catalogue::builtin(),
            &["description", "pixelMappingName", "resolution"],
        )
        .unwrap()
        .with_selection("pixelMappingName", Some(Selection::Omit))
        .unwrap();
        let compiled = template.compile().unwrap();
        let names: Vec<&str> = compiled.tokens().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["description", "resolution"]);
        assert_eq!(walk(&compiled, "comp_4k"), None);
        assert_eq!(walk(&compiled, "comp_").unwrap().subject, "resolution");
    }

    #[test]
    fn multibyte_text_is_walked_on_char_boundaries() {
        let compiled = scenario_template().compile().unwrap();
        assert_eq!(walk(&compiled, "WTFB0101_ébauche_4k_v001.exr"), None);
        let diagnostic = walk(&compiled, "WTFB0101_ébauche_4k_v001.ëxr").unwrap();
        assert_eq!(diagnostic.subject, "extension");
        assert_eq!(diagnostic.found, "ëxr");
    }

    #[test]
    fn stale_authored_composite_is_reported_as_template_mismatch() {
        let compiled = scenario_template()
            .compile_with_composite(r"[A-Z]{4}\d{4}_.+\.mov")
            .unwrap();
        let diagnostic = diagnose(&compiled, "WTFB0101_comp_4k_v001.exr");
        assert_eq!(diagnostic.kind, DiagnosticKind::TemplateMismatch);
        assert_eq!(diagnostic.found, "WTFB0101_comp_4k_v001.exr");
        assert!(diagnostic.message.starts_with("template mismatch:"));
    }

    #[test]
    fn diagnose_prefers_walker_divergence() {
        let compiled = scenario_template().compile().unwrap();
        let diagnostic = diagnose(&compiled, "WTFB0101_comp_4k_v1.exr");
        assert_eq!(diagnostic.kind, DiagnosticKind::TokenMismatch);
    }

    #[rstest]
    #[case("0101_comp", "_", "0101_")]
    #[case("short", "_", "short")]
    #[case("abcdefghijklmnopqrstuvwxyz", "_", "abcdefghijklmno...")]
    #[case("exactly15chars!", "", "exactly15chars!")]
    #[case("", "_", "")]
    fn previews_remaining_text(#[case] rest: &str, #[case] separator: &str, #[case] expected: &str) {
        assert_eq!(preview(rest, separator), expected);
    }

    #[test]
    fn single_token_template_reports_trailing_content() {
        let compiled = Template::from_definitions([TokenDefinition::fixed("shot", r"\d{4}")])
            .unwrap()
            .compile()
            .unwrap();
        let diagnostic = walk(&compiled, "00101").unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::TrailingContent);
        assert_eq!(diagnostic.found, "1");
    }
}
