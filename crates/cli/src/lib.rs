pub mod commands;
pub mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;

use cabinguard_core::DiagnosticLevel;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cabinguard",
    about = "Exchange booking code and cabin re-validation",
    long_about = "Re-validate candidate fares of a reissue or refund against the cabins and fare levels ticketed on the flown part of the journey.",
    after_help = "Examples:\n  cabinguard validate --scenario demos/refund-same-fare-break.json\n  cabinguard validate --scenario demos/refund-same-fare-break.json --diag detail\n  cabinguard config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate the candidate fares of an exchange scenario file")]
    Validate {
        #[arg(long, help = "Path to the JSON exchange scenario")]
        scenario: PathBuf,
        #[arg(long, help = "Diagnostic detail: off, summary (400) or detail (411)")]
        diag: Option<DiagnosticLevel>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate { scenario, diag } => commands::validate::run(&scenario, diag),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
