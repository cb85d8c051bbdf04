use shotlint::config::{Config, parse_config};
use shotlint::lint::{LintSettings, Linter};
use shotlint::template::{CompiledTemplate, SharedTemplate, Template, TokenDefinition};

/// `sequence shotNumber _ description _ resolution _ version . extension`
pub fn scenario_template() -> Template {
    Template::from_definitions([
        TokenDefinition::fixed("sequence", "[A-Za-z]{4}"),
        TokenDefinition::fixed("shotNumber", r"\d{4}")
            .with_examples(["0010"])
            .with_separator("_"),
        TokenDefinition::fixed("description", ".+?")
            .with_examples(["comp"])
            .with_separator("_"),
        TokenDefinition::fixed("resolution", r"\d{1,2}k")
            .with_examples(["4k"])
            .with_separator("_"),
        TokenDefinition::fixed("version", r"v\d{2,3}")
            .with_examples(["v001"])
            .with_separator("."),
        TokenDefinition::multi_choice("extension", ["exr", "mov"]),
    ])
    .unwrap_or_else(|e| panic!("scenario template: {e}"))
}

pub fn scenario() -> CompiledTemplate {
    scenario_template()
        .compile()
        .unwrap_or_else(|e| panic!("scenario compile: {e}"))
}

pub fn config(yaml: &str) -> Config {
    let config = parse_config(yaml).unwrap_or_else(|e| panic!("parse: {e}"));
    config
        .validate()
        .unwrap_or_else(|e| panic!("validate: {e}"));
    config
}

pub fn linter(yaml: &str) -> Linter {
    let config = config(yaml);
    let compiled = config
        .compile_selected(None)
        .unwrap_or_else(|e| panic!("compile: {e}"));
    let settings = LintSettings::from_config(&config).unwrap_or_else(|e| panic!("settings: {e}"));
    Linter::new(SharedTemplate::new(compiled), settings)
}
