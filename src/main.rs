//! Fartgen CLI
//!
//! Command-line front end for the fartgen render engine.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fartgen::cli::{commands, Cli, Commands};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries events and results
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Fartgen v{}", env!("CARGO_PKG_VERSION"));

    let mut config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render(args) => {
            args.apply_overrides(&mut config);
            let request = match &args.request {
                Some(path) => commands::read_request(path)?,
                None => args.to_request(),
            };
            commands::render(&config, &request)?;
        }
        Commands::Validate { request } => {
            if !commands::validate(&request)? {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Library { library } => {
            if let Some(library) = library {
                config.library_path = library;
            }
            commands::library(&config)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
