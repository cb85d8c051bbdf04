mod route;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

pub use route::route_check;

#[derive(Parser)]
#[command(name = "shotlint", version, about = "Validate VFX render filenames against naming templates")]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub enum Commands {
    /// Check render paths against the naming template
    Check(CheckArgs),
    /// Print the compiled composite pattern and an example filename
    Pattern(PatternArgs),
}

impl Commands {
    pub fn template_args(&self) -> &TemplateArgs {
        match self {
            Commands::Check(args) => &args.template,
            Commands::Pattern(args) => &args.template,
        }
    }
}

#[derive(clap::Args)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct TemplateArgs {
    /// Template name (defaults to defaults.template in the config)
    #[arg(long)]
    pub template: Option<String>,

    /// Config file to use instead of the global and local shotlint.yml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct CheckArgs {
    /// Render paths to check (reads stdin when omitted)
    pub paths: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub template: TemplateArgs,
}

#[derive(clap::Args)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct PatternArgs {
    #[command(flatten)]
    pub template: TemplateArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
