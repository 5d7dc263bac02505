// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Numio - virtual number resale settlement service.
//!
//! This is the binary entry point for the Numio service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;
mod shutdown;

/// Numio - virtual number resale settlement service.
#[derive(Parser, Debug)]
#[command(name = "numio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook listener and background workers.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match numio_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            numio_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("numio: use --help for available commands");
        }
    }
}
