use super::{Template, TokenDefinition};

/// `sequence shotNumber _ description _ resolution _ version . extension`
pub(crate) fn scenario_template() -> Template {
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
    .unwrap()
}
