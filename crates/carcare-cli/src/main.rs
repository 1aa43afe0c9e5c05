//! Carcare - customer and service records for a small repair shop
//!
//! A CLI front end over the customer book: add, edit, delete, list and search entries.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;
use log::LevelFilter;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
