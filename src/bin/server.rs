//! ArborKV Server Binary
//!
//! Starts the TCP server for ArborKV.

use std::sync::Arc;

use arborkv::network::Server;
use arborkv::{Config, Engine};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// ArborKV Server
#[derive(Parser, Debug)]
#[command(name = "arborkv-server")]
#[command(about = "Key-value store for addressable tree values")]
#[command(version)]
struct Args {
    /// Listen address (host:port); falls back to the PORT environment
    /// variable, then to 127.0.0.1:8088
    #[arg(short, long)]
    listen: Option<String>,

    /// Path of the operation log file
    #[arg(short = 'f', long, default_value = "./arborkv.csv")]
    log_file: String,

    /// Delete any existing log file before starting (empty store)
    #[arg(long)]
    overwrite: bool,

    /// Connection read timeout in milliseconds (0 disables)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Connection write timeout in milliseconds (0 disables)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,arborkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let listen_addr = resolve_listen_addr(args.listen);

    tracing::info!("ArborKV Server v{}", arborkv::VERSION);
    tracing::info!("Log file: {}", args.log_file);
    tracing::info!("Listen address: {}", listen_addr);

    // Build config from args
    let config = Config::builder()
        .listen_addr(listen_addr)
        .log_path(&args.log_file)
        .overwrite(args.overwrite)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    // Open engine (replays the log)
    let engine = match Engine::open(&config) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("failed to open engine: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("engine initialized");

    // Run the accept loop on the main thread
    let server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }

    tracing::info!("server stopped");
}

/// Pick the listen address: explicit flag, then PORT env, then default
fn resolve_listen_addr(flag: Option<String>) -> String {
    if let Some(addr) = flag {
        return addr;
    }
    if let Ok(port) = std::env::var("PORT") {
        return format!("127.0.0.1:{port}");
    }
    Config::default().listen_addr
}
