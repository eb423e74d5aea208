// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tessera - plugin runtime for the catalog administration host.
//!
//! This binary boots the runtime from configuration and inspects the result.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod runtime;

use std::io::IsTerminal;

use clap::{Parser, Subcommand};
use tessera_core::ComponentLocation;

/// Tessera - plugin runtime for the catalog administration host.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about, long_about = None)]
struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered plugins and their lifecycle status.
    Plugins,
    /// List mounted routes in resolution order.
    Routes,
    /// List mounted components.
    Components {
        /// Only show components at this location (header, sidebar, footer, modal, inline).
        #[arg(long)]
        location: Option<ComponentLocation>,
    },
    /// Show registry statistics.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Render the route mounted at PATH inside a fault boundary.
    Render {
        path: String,
        /// Include fault message and trace if rendering fails.
        #[arg(long)]
        details: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match tessera_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            tessera_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.runtime.log_level);

    let Some(command) = cli.command else {
        println!("tessera: use --help for available commands");
        return;
    };

    let (mut registry, _report) = runtime::bootstrap(&config).await;
    let use_color = !cli.plain && std::io::stdout().is_terminal();

    let output = match command {
        Commands::Plugins => Ok(inspect::plugins_table(&registry, use_color)),
        Commands::Routes => Ok(inspect::routes_table(&registry)),
        Commands::Components { location } => Ok(inspect::components_table(&registry, location)),
        Commands::Stats { json } => inspect::stats_report(&registry, json),
        Commands::Render { path, details } => inspect::render_route(&registry, &path, details),
    };

    let initialized: Vec<String> = registry
        .all_plugins()
        .iter()
        .filter(|p| registry.is_initialized(p.id().as_str()))
        .map(|p| p.id().to_string())
        .collect();
    for plugin_id in initialized {
        registry.disable_plugin(&plugin_id).await;
    }

    match output {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("tessera: {e}");
            std::process::exit(1);
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tessera={log_level},tessera_plugin={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
