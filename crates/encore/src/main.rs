// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encore - live song-request queue for karaoke venues.
//!
//! This is the binary entry point.

mod doctor;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Encore - live song-request queue for karaoke venues.
#[derive(Parser, Debug)]
#[command(name = "encore", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the queue server (default).
    Serve,
    /// Print the effective configuration as TOML.
    Config,
    /// Check configuration and storage health.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => encore_config::load_and_validate_path(path),
        None => encore_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            encore_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Config => match config.to_toml_string() {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
        Commands::Doctor { plain } => {
            if !doctor::run_doctor(&config, plain).await {
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["encore"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn doctor_flags_and_global_config() {
        let cli = Cli::try_parse_from(["encore", "doctor", "--plain", "-c", "venue.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Doctor { plain: true })));
        assert_eq!(cli.config, Some(PathBuf::from("venue.toml")));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = encore_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.queue.notification_capacity, 50);
    }
}
