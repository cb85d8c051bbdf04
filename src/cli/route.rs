use crate::adapter::Endpoint;
use crate::adapter::json_adapter::{CheckInput, JsonAdapter};
use crate::adapter::text_adapter::TextAdapter;

use super::{CheckArgs, OutputFormat};

/// Route `shotlint check` to the endpoint for `--format`, taking paths from
/// the command line or, when none are given, from stdin.
pub fn route_check(
    args: &CheckArgs,
    stdin: impl std::io::Read,
) -> Result<Box<dyn Endpoint>, anyhow::Error> {
    let paths = if args.paths.is_empty() {
        read_paths(stdin)?
    } else {
        args.paths.clone()
    };

    Ok(match args.format {
        OutputFormat::Text => Box::new(TextAdapter::new(paths)),
        OutputFormat::Json => Box::new(JsonAdapter::new(paths)),
    })
}

/// Read paths from stdin: a JSON object `{"paths": [...]}` or one path per line.
fn read_paths(mut stdin: impl std::io::Read) -> Result<Vec<String>, anyhow::Error> {
    let mut stdin_input = String::new();
    stdin.read_to_string(&mut stdin_input)?;

    // Only JSON objects are protocol input; other JSON values are plain lines.
    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(&stdin_input)
        && json_value.is_object()
    {
        if json_value.get("paths").is_none() {
            return Err(anyhow::anyhow!(
                "Unknown input format: expected a 'paths' field"
            ));
        }
        let input: CheckInput = serde_json::from_value(json_value)?;
        return Ok(input.paths);
    }

    let paths: Vec<String> = stdin_input
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if paths.is_empty() {
        return Err(anyhow::anyhow!("no paths provided on stdin"));
    }
    Ok(paths)
}
