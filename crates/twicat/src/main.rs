//! twicat: read SMS sent to a Twilio number from your terminal
//!
//! Usage:
//!   twicat           - Expose a callback, pick a number, print incoming SMS
//!   twicat --help    - Show help
//!   twicat --version - Show version

mod app;
mod cli;
mod error;

use app::App;
use cli::TerminalPrompter;
use tracing_subscriber::EnvFilter;
use twicat_core::{Config, RunContext};

/// Run mode
enum RunMode {
    /// Provision the endpoint and print messages
    Run,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("twicat {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Run => {}
    }

    // Logs go to stderr so received messages stay alone on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    tracing::debug!(?config, "Loaded configuration");

    let ctx = RunContext::new();
    let mut app = App::new(config, ctx.clone(), TerminalPrompter::new());

    // Cancellation comes from the tunnel's interrupt watcher, which has
    // already killed the subprocess by then.
    let result = tokio::select! {
        result = app.run() => result,
        _ = ctx.cancelled() => Ok(()),
    };

    // A prompt may still hold the terminal in raw mode
    let _ = crossterm::terminal::disable_raw_mode();

    match result {
        Ok(()) => {
            tracing::info!("Shutting down...");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", e);
            app.teardown().await;
            std::process::exit(1);
        }
    }
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Run
}

/// Print help message
fn print_help() {
    println!("twicat - read sms from a Twilio number");
    println!();
    println!("Usage:");
    println!("  twicat             Expose a local callback through ngrok and print incoming SMS");
    println!("  twicat --help      Show this help message");
    println!("  twicat --version   Show version");
    println!();
    println!("Configuration (twicat.toml or environment):");
    println!("  TWICAT_PROVIDER_BASE_URL   Twilio API base (default: https://api.twilio.com)");
    println!("  TWICAT_HTTP_TIMEOUT_SECS   HTTP request timeout (default: 5)");
    println!("  TWICAT_TUNNEL_BINARY       Tunnel executable (default: ngrok)");
    println!("  TWICAT_INSPECTOR_URL       Tunnel status API (default: http://127.0.0.1:4040)");
    println!("  TWICAT_INSPECT_ATTEMPTS    Status API attempts (default: 1)");
    println!("  TWICAT_INSPECT_BACKOFF_MS  Delay between attempts (default: 500)");
    println!("  TWICAT_LISTENER_HOST       Callback listener interface (default: 0.0.0.0)");
    println!("  RUST_LOG                   Log filter (default: warn)");
}
