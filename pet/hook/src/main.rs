//! Pet Hook - Assistant hook companion for claude-pet
//!
//! The assistant runs this binary for every subscribed hook, with the hook
//! payload on stdin. It forwards the payload to the running widget and exits.
//! It must never slow the assistant down or make a hook fail, so every
//! delivery problem is swallowed.
//!
//! # Usage
//!
//! ```bash
//! # Forward a payload (what the assistant runs)
//! echo '{"session_id":"s1","hook_event_name":"Stop"}' | pet-hook send
//!
//! # Register the hooks in ~/.claude/settings.json
//! pet-hook install
//!
//! # Verbose logging
//! RUST_LOG=debug pet-hook send
//! ```

mod install;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use pet_core::config::{load_config_from_path, ConfigSource, PetConfig};
use pet_core::send_payload;

/// How long to wait for the widget to accept a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Pet Hook - forwards assistant hook events to the claude-pet widget
#[derive(Parser, Debug)]
#[command(name = "pet-hook")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "PET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Widget port (overrides config)
    #[arg(short = 'p', long, value_name = "PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Forward the hook payload on stdin to the widget (default)
    Send,

    /// Register this binary as a hook in the assistant's settings
    Install {
        /// Settings file to edit
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,
    },
}

/// Initialize logging; quiet unless `RUST_LOG` says otherwise
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pet_hook=warn,pet_core=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_config(args: &Args) -> Result<PetConfig> {
    let path = args
        .config
        .clone()
        .or_else(pet_core::config::default_config_path);
    let mut config = load_config_from_path(path)?;
    if let Some(port) = args.port {
        config.port = port;
        config.set_source(ConfigSource::Cli);
    }
    Ok(config)
}

/// Forward stdin to the widget. Never fails.
async fn send(addr: Option<SocketAddr>) {
    let mut payload = Vec::new();
    if let Err(e) = tokio::io::stdin().read_to_end(&mut payload).await {
        tracing::debug!(error = %e, "Failed to read hook payload");
        return;
    }
    if payload.is_empty() {
        return;
    }
    if let Err(e) = serde_json::from_slice::<serde_json::Value>(&payload) {
        tracing::debug!(error = %e, "Hook payload is not JSON, not forwarding");
        return;
    }

    let Some(addr) = addr else {
        tracing::debug!("No usable widget address");
        return;
    };
    match send_payload(addr, &payload, CONNECT_TIMEOUT).await {
        Ok(()) => tracing::debug!(addr = %addr, bytes = payload.len(), "Hook payload delivered"),
        // Widget not running: nothing to do
        Err(e) => tracing::debug!(addr = %addr, error = %e, "Hook payload not delivered"),
    }
}

fn install(settings: Option<PathBuf>) -> Result<()> {
    let settings = match settings {
        Some(path) => path,
        None => install::default_settings_path()
            .context("Could not determine home directory; pass --settings")?,
    };
    let exe = std::env::current_exe().context("Could not determine executable path")?;
    let command = format!("{} send", exe.to_string_lossy().replace('\\', "/"));

    let report = install::register_hooks(&settings, &command)?;
    if !report.added.is_empty() {
        println!("Installed hooks: {}", report.added.join(", "));
    }
    if !report.skipped.is_empty() {
        println!("Already installed: {}", report.skipped.join(", "));
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    match args.command {
        None | Some(Command::Send) => {
            // A broken config must not break the assistant's hook
            let addr = match load_config(&args) {
                Ok(config) => config.listen_addr().ok(),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unusable configuration");
                    PetConfig::default().listen_addr().ok()
                }
            };
            send(addr).await;
            Ok(())
        }
        Some(Command::Install { ref settings }) => install(settings.clone()),
    }
}
