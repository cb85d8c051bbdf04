use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use shotlint::adapter;
use shotlint::cli::{Cli, Commands, TemplateArgs, route_check};
use shotlint::config::{Config, ConfigError, ConfigLoader, DefaultConfigLoader, load_config_file};
use shotlint::lint::{LintSettings, Linter};
use shotlint::template::SharedTemplate;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let template_args = cli.command.template_args();
    let linter = match build_linter(template_args) {
        Ok(linter) => linter,
        Err(e) => {
            eprintln!("shotlint: config error: {e}");
            return ExitCode::from(2);
        }
    };

    let exit_code = match &cli.command {
        Commands::Check(args) => match route_check(args, std::io::stdin()) {
            Ok(endpoint) => adapter::run(endpoint.as_ref(), &linter),
            Err(e) => {
                eprintln!("shotlint: {e}");
                2
            }
        },
        Commands::Pattern(_) => {
            let compiled = linter.template().load();
            println!("{}", compiled.composite_pattern());
            println!("example: {}", compiled.example());
            0
        }
    };

    ExitCode::from(exit_code as u8)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_config(args: &TemplateArgs) -> Result<Config, ConfigError> {
    if let Some(path) = &args.config {
        return load_config_file(path);
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    DefaultConfigLoader::new().load(&cwd)
}

fn build_linter(args: &TemplateArgs) -> Result<Linter, ConfigError> {
    let config = load_config(args)?;
    let compiled = config.compile_selected(args.template.as_deref())?;
    tracing::debug!(pattern = compiled.composite_pattern(), "compiled template");
    let settings = LintSettings::from_config(&config)?;
    Ok(Linter::new(SharedTemplate::new(compiled), settings))
}
