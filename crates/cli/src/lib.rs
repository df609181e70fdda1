pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use wearcast_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};

#[derive(Debug, Parser)]
#[command(
    name = "wearcast",
    about = "Weather-aware outfit recommendations",
    long_about = "Recommend outfits from a CSV catalog using live or manually entered weather, \
                  and inspect the catalog and configuration behind them.",
    after_help = "Examples:\n  wearcast recommend --city Istanbul\n  wearcast recommend --temp 12 --condition Rain --activity travel\n  wearcast doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rank catalog outfits for the given weather and preferences")]
    Recommend(commands::recommend::RecommendArgs),
    #[command(about = "Summarize the loaded catalog and its vocabulary")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Write the built-in sample catalog to the configured catalog path")]
    Seed {
        #[arg(long, help = "Overwrite an existing catalog file")]
        force: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog loading, and weather key readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(&logging);

    let result = match cli.command {
        Command::Recommend(args) => commands::recommend::run(args),
        Command::Catalog { json } => commands::catalog::run(json),
        Command::Seed { force } => commands::seed::run(force),
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

/// Logs go to stderr so command output on stdout stays parseable.
fn init_logging(logging: &LoggingConfig) {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
