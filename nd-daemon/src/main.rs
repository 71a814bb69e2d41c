//! N2K Displays Daemon (n2k-displaysd)
//!
//! Runs the display bridge as a child of the host process. The host side of
//! the conversation is newline-delimited JSON on stdin/stdout; logging goes to
//! the systemd journal when available and to stderr otherwise, never stdout.
//!
//! # Lifecycle
//! - Settings are loaded and validated once, before anything is announced
//! - SIGINT, SIGTERM or EOF on stdin stops the bridge and releases every subscription

mod server;

use std::path::PathBuf;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::{error, info};

use nd_core::{load_settings, DisplayBridge, MemoryHost};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter
const LOG_ENV: &str = "N2K_DISPLAYS_LOG";

// ============================================================================
// CLI
// ============================================================================

fn print_help() {
    eprintln!("n2k-displaysd {} - Raymarine/Navico display control bridge", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    n2k-displaysd [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config PATH   Settings file (default: $XDG_CONFIG_HOME/n2k-displays/settings.json)");
    eprintln!("    -s, --self-urn URN  Context the host uses for this vessel (e.g. vessels.urn:mrn:imo:mmsi:...)");
    eprintln!("    -v, --version       Print version");
    eprintln!("    -h, --help          Print this help");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("    {}    Log level (trace, debug, info, warn, error)", LOG_ENV);
}

fn print_version() {
    println!("n2k-displaysd {}", VERSION);
}

// ============================================================================
// Logging
// ============================================================================

fn init_logging() -> bool {
    let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string());

    if std::path::Path::new("/run/systemd/journal/socket").exists() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                use tracing_subscriber::prelude::*;
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(tracing_subscriber::EnvFilter::new(&log_level))
                    .init();
                return true;
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stderr", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_env_filter(&log_level)
        .init();
    false
}

// ============================================================================
// Signals
// ============================================================================

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("SIGNAL: Received SIGINT"),
                    _ = term.recv() => info!("SIGNAL: Received SIGTERM"),
                }
                return;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for SIGINT: {}", e);
        std::future::pending::<()>().await;
    }
    info!("SIGNAL: Received SIGINT");
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut self_urn: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" => {
                print_version();
                return Ok(());
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(PathBuf::from(&args[i]));
            }
            "-s" | "--self-urn" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --self-urn requires a context argument");
                    std::process::exit(1);
                }
                self_urn = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let journald = init_logging();
    info!("STARTUP: n2k-displaysd {} starting", VERSION);
    info!("STARTUP: Logging to {}", if journald { "systemd journal" } else { "stderr" });

    let settings = load_settings(config_path.as_deref()).context("Failed to load settings")?;
    let config = settings.resolve().context("Invalid settings")?;
    info!(
        "STARTUP: Night color {}, day color {}, {} group mapping(s)",
        config.night_color.key(),
        config.day_color.key(),
        config.mappings.len()
    );

    let bridge = DisplayBridge::new(MemoryHost::new(), config)?;
    let mut session = server::Session::new(bridge);
    if let Some(urn) = self_urn {
        info!("STARTUP: Accepting deltas for {}", urn);
        session = session.with_self_urn(urn);
    }

    server::run(
        session,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown_signal(),
    )
    .await
    .context("Host stream failed")?;

    info!("SHUTDOWN: n2k-displaysd stopped");
    Ok(())
}
