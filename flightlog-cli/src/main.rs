//! FlightLog CLI - command-line interface
//!
//! Logs simulated flights from a telemetry stream and writes OFP reports.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flightlog::config::ConfigFile;
use flightlog::logging::init_logging;

use commands::config::ConfigCommands;
use commands::monitor::MonitorArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "flightlog", version, about = "Fix passage logging and OFP reports for simulated flights")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Monitor a flight and write its OFP report when it ends
    Monitor {
        /// Flight plan JSON file
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Telemetry JSON-lines file (reads stdin when omitted)
        #[arg(long)]
        telemetry: Option<PathBuf>,

        /// Report file (defaults to the configured report directory)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Polling interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Aircraft title shown in the report
        #[arg(long)]
        aircraft: Option<String>,

        /// Also print the report to stdout
        #[arg(long)]
        print: bool,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Monitor {
            plan,
            telemetry,
            output,
            interval_ms,
            aircraft,
            print,
        } => {
            let config = ConfigFile::load()?;
            let _log_guard = init_logging(&config.logging)?;
            tracing::info!(version = flightlog::VERSION, "FlightLog starting");

            commands::monitor::run(
                MonitorArgs {
                    plan,
                    telemetry,
                    output,
                    interval_ms,
                    aircraft,
                    print_report: print,
                },
                &config,
            )
        }
        Commands::Config { command } => commands::config::run(command),
    }
}
