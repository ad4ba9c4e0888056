mod ast;
mod cli;
mod commands;
mod detectors;
mod errors;
mod file;
mod report;
mod syntax;
mod utils;
mod walk;

use crate::utils::Config;
use clap::Parser;
use cli::Cli;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::fmt::time;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

fn init_tracing() {
    // stdout carries the report, so logs go to stderr
    let fmt_layer = fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .with_timer(time::UtcTime::rfc_3339());

    Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt_layer)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    tracing::debug!("CLI starting up");
    let cli = Cli::parse();
    let config = Config::default();

    match commands::handle_command(cli, &config) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{}: {e}", style("error").red().bold());
            ExitCode::FAILURE
        }
    }
}
