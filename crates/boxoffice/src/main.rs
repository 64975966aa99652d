mod commands;
mod error;
mod logging;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use boxoffice_operations::BoxofficeConfig;
use clap::Parser;
use tracing::debug;

use crate::commands::Commands;
use crate::error::CliError;
use crate::logging::LogFormat;

#[derive(Parser)]
#[command(name = "boxoffice")]
#[command(about = "Sell event tickets through a compensating saga", long_about = None)]
struct Cli {
    /// TOML config file (default: built-in sample events, no faults)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = cli.command.execute(config) {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn load_config(path: Option<&Path>) -> Result<BoxofficeConfig, CliError> {
    match path {
        Some(path) => Ok(BoxofficeConfig::load(path)?),
        None => {
            debug!("no config file given, using defaults");
            Ok(BoxofficeConfig::default())
        }
    }
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
