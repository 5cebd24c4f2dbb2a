//! Flamingo CLI entry point.

use std::{io, process, str::FromStr};

use clap::Parser;
use log::{debug, LevelFilter};

use flamingo_cli::Cli;

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            cli.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!("parsed arguments: {cli:?}");

    if let Err(err) = flamingo_cli::run(&cli) {
        flamingo_cli::report_error(&err, &mut io::stderr().lock());
        process::exit(1);
    }
}
