pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tradein_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "tradein",
    about = "Trade-in quote engine operator CLI",
    long_about = "Price assessment sessions, inspect effective configuration, and run \
                  collaborator readiness checks.",
    after_help = "Examples:\n  tradein quote --session assessment.json --trace\n  tradein config\n  tradein doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute the quote for a carried session snapshot file")]
    Quote {
        #[arg(long, help = "Path to the session snapshot JSON file")]
        session: PathBuf,
        #[arg(long, help = "Show the step-by-step pricing trace")]
        trace: bool,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and probe collaborator endpoint reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Quote { session, trace, json } => commands::quote::run(&session, trace, json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging() {
    use tracing::Level;

    // Commands re-load and validate config themselves; logging falls back to
    // defaults when the config is unusable so diagnostics still come through.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let subscriber = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);
    // try_init: a global subscriber may already be installed under test harnesses.
    let _ = match config.logging.format {
        LogFormat::Compact => subscriber.compact().try_init(),
        LogFormat::Pretty => subscriber.pretty().try_init(),
        LogFormat::Json => subscriber.json().try_init(),
    };
}
