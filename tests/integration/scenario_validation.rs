use rstest::{fixture, rstest};
use shotlint::config::Config;
use shotlint::template::{CompiledTemplate, DiagnosticKind, diagnose, validate};

use crate::common;

#[fixture]
fn compiled() -> CompiledTemplate {
    common::scenario()
}

#[rstest]
fn composite_pattern_is_derived_from_tokens(compiled: CompiledTemplate) {
    assert_eq!(
        compiled.composite_pattern(),
        r"^(?:[A-Za-z]{4})(?:\d{4})_(?:.+?)_(?:\d{1,2}k)_(?:v\d{2,3})\.(?:exr|mov)$"
    );
}

#[rstest]
#[case::conforming("WTFB0101_comp_4k_v001.exr")]
#[case::mov("KITC0020_roto-main_12k_v114.mov")]
#[case::underscore_in_description("WTFB0101_comp_final_4k_v01.exr")]
fn conforming_filenames_pass(compiled: CompiledTemplate, #[case] filename: &str) {
    let result = compiled.validate_filename(filename);
    assert!(result.passed);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.report(), None);
}

#[rstest]
#[case::short_shot_number(
    "WTFB101_comp_4k_v001.exr",
    r"invalid '<shotNumber>': expected '\d{4}' (e.g. '0010') but found '101_'"
)]
#[case::missing_separator(
    "WTFB0101comp_4k_v001.exr",
    "missing separator '_' between 'shotNumber' and 'description': found 'comp_'"
)]
#[case::bad_extension(
    "WTFB0101_comp_4k_v001.tiff",
    "invalid '<extension>': expected one of [exr, mov] but found 'tiff'"
)]
#[case::trailing_content(
    "WTFB0101_comp_4k_v001.exr.bak",
    "unexpected trailing content after 'extension': found '.bak'"
)]
fn failing_filenames_report_first_divergence(
    compiled: CompiledTemplate,
    #[case] filename: &str,
    #[case] message: &str,
) {
    let result = compiled.validate_filename(filename);
    assert!(!result.passed);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.summary(), Some(message));
    assert_eq!(
        result.report().unwrap(),
        format!("Filename doesn't match the expected format:\n- {message}")
    );
}

#[rstest]
fn validate_and_diagnose_agree(compiled: CompiledTemplate) {
    let filenames = [
        "WTFB0101_comp_4k_v001.exr",
        "WTFB0101_comp_4k_v001",
        "WTFB0101__4k_v001.exr",
        "WTFB0101_comp_4k_v1.exr",
        "wtfb0101_comp_4k_v001.mov",
        "",
    ];
    for filename in filenames {
        let passed = validate(&compiled, filename);
        assert_eq!(passed, compiled.validate_filename(filename).passed, "{filename}");
        if !passed {
            assert_ne!(
                diagnose(&compiled, filename).kind,
                DiagnosticKind::TemplateMismatch,
                "{filename}"
            );
        }
    }
}

#[test]
fn builtin_example_filename_conforms() {
    let compiled = Config::default().compile_selected(None).unwrap();
    let example = compiled.example();
    assert_eq!(example, "WTFB0010_comp_LL180_4k_r709g24_2997_v001.%04d.exr");
    assert!(compiled.is_match(&example));
}
