//! # countries CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use country_cli::list::{run_list, ListArgs};
use country_cli::lookup::{
    run_code, run_info, run_name, run_valid, CodeArgs, InfoArgs, NameArgs, ValidArgs,
};
use country_cli::CliContext;

/// ISO 3166-1 country lists and lookups.
#[derive(Parser, Debug)]
#[command(name = "countries", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Locale for names and ordering (e.g. en, fr-CA, de_CH.UTF-8).
    #[arg(short, long, global = true, default_value = "en")]
    locale: String,

    /// Settings document (YAML, or JSON with a .json extension).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Translation catalog (YAML mapping locale → name → translation).
    #[arg(long, global = true)]
    translations: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the ordered country choices.
    List(ListArgs),

    /// Print the display name of a code.
    Name(NameArgs),

    /// Print the code for a country name.
    Code(CodeArgs),

    /// Check a code against the effective table.
    Valid(ValidArgs),

    /// Print every attribute of a country as JSON.
    Info(InfoArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "countries CLI starting");

    let result = CliContext::new(&cli.locale, cli.settings, cli.translations).and_then(|ctx| {
        match &cli.command {
            Commands::List(args) => run_list(args, &ctx),
            Commands::Name(args) => run_name(args, &ctx),
            Commands::Code(args) => run_code(args, &ctx),
            Commands::Valid(args) => run_valid(args, &ctx),
            Commands::Info(args) => run_info(args, &ctx),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
