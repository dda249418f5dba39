//! Mileage CLI - trip and expense log for sports officials
//!
//! This is the command-line interface for Mileage. It provides an
//! interactive (or scripted) session over the core ledger, a one-shot
//! distance lookup and the OAuth token exchange endpoint.

mod app;
mod capture;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod output;
mod server;
mod ui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use log::LevelFilter;

use mileage_core::MileageError;

use crate::app::AppContext;
use crate::cli::{Cli, Commands, SessionArgs};
use crate::errors::CliError;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // RUST_LOG, when set, overrides the flag-derived level
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let app = AppContext::new(cli);

    match &cli.command {
        None => commands::handle_session(&app, &SessionArgs::default()),
        Some(Commands::Session(args)) => commands::handle_session(&app, args),
        Some(Commands::Distance(args)) => commands::handle_distance(&app, args),
        Some(Commands::Serve(args)) => commands::handle_serve(&app, args),
        Some(Commands::Doctor(args)) => commands::handle_doctor(&app, args),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "mileage", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => Ok(()),
        Err(err) => {
            let err = match err.downcast::<CliError>() {
                Ok(cli_err) => cli_err.exit(),
                Err(err) => err,
            };
            match err.downcast::<MileageError>() {
                Ok(core_err) => CliError::from(core_err).exit(),
                Err(err) => Err(err),
            }
        }
    }
}
