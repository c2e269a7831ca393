//! imh CLI - inter-module helper for multi-module Maven builds

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("imh=debug")
    } else {
        EnvFilter::new("imh=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Root(args) => commands::root::execute(args),
        Commands::Modules(args) => commands::modules::execute(args),
        Commands::Find(args) => commands::find::execute(args),
        Commands::Path(args) => commands::path::execute(args),
    }
}
