//! toyredis Server Binary
//!
//! Starts the TCP server for toyredis.

use std::sync::Arc;

use clap::Parser;
use toyredis::network::Server;
use toyredis::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// toyredis Server
#[derive(Parser, Debug)]
#[command(name = "toyredis-server")]
#[command(about = "Minimal RESP key-value server")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Longest line accepted before a CRLF, in bytes
    #[arg(long, default_value = "65536")]
    max_line_length: usize,

    /// Idle read timeout per connection in milliseconds (0 disables)
    #[arg(long, default_value = "300000")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,toyredis=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("toyredis Server v{}", toyredis::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_line_length(args.max_line_length)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    let server = match Server::bind(config, Arc::new(Engine::new())) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
