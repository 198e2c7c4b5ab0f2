// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storebot - customer-support chat backend for a retail store.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shell;
mod stack;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storebot_config::model::StorebotConfig;

/// Storebot - customer-support chat backend for a retail store.
#[derive(Parser, Debug)]
#[command(name = "storebot", version, about, long_about = None)]
struct Cli {
    /// Explicit configuration file. Defaults to the XDG lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Chat with the assistant in the terminal.
    Shell,
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => storebot_config::load_and_validate_path(path),
        None => storebot_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            storebot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => {
            init_tracing(&config.agent.log_level);
            serve::run_serve(config).await
        }
        Some(Commands::Shell) => {
            init_tracing(&config.agent.log_level);
            shell::run_shell(config).await
        }
        Some(Commands::Config) => {
            match render_config(&config) {
                Ok(text) => print!("{text}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        None => {
            println!("storebot: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,storebot={log_level},storebot_core={log_level},storebot_storage={log_level},\
             storebot_fireworks={log_level},storebot_catalog={log_level},\
             storebot_tools={log_level},storebot_agent={log_level},storebot_gateway={log_level},\
             tower_http={log_level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// The configuration as TOML with the API key masked.
fn render_config(config: &StorebotConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.fireworks.api_key.is_some() {
        shown.fireworks.api_key = Some("********".to_string());
    }
    toml::to_string_pretty(&shown)
}
