use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod hujson;
mod services;

use cli::Cli;
use commands::handle_sync;
use services::output::print_error;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(concat!(env!("CARGO_CRATE_NAME"), "=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match handle_sync(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(cli.json, &err);
            eprintln!("{}", Cli::command().render_usage());
            ExitCode::FAILURE
        }
    }
}
