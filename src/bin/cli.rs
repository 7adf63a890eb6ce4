//! toyredis CLI Client
//!
//! Command-line interface for interacting with toyredis.

use clap::{Parser, Subcommand};
use toyredis::network::Client;
use toyredis::Value;

/// toyredis CLI
#[derive(Parser, Debug)]
#[command(name = "toyredis-cli")]
#[command(about = "CLI for the toyredis key-value server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Get several values at once
    Mget {
        /// Keys to get, in order
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Set several key-value pairs at once
    Mset {
        /// Alternating keys and values
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Delete keys
    Del {
        /// Keys to delete
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Remove every key
    Flushdb,
}

impl Commands {
    /// Wire form of the command: name followed by arguments
    fn into_parts(self) -> Vec<String> {
        let (name, args) = match self {
            Commands::Get { key } => ("GET", vec![key]),
            Commands::Set { key, value } => ("SET", vec![key, value]),
            Commands::Mget { keys } => ("MGET", keys),
            Commands::Mset { pairs } => ("MSET", pairs),
            Commands::Del { keys } => ("DEL", keys),
            Commands::Flushdb => ("FLUSHDB", Vec::new()),
        };
        std::iter::once(name.to_string()).chain(args).collect()
    }
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    match client.send(args.command.into_parts()) {
        Ok(reply) => {
            let failed = matches!(reply, Value::Error(_));
            println!("{}", render(&reply, 0));
            if failed {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format a reply the way redis-cli does
fn render(value: &Value, indent: usize) -> String {
    match value {
        Value::Null => "(nil)".to_string(),
        Value::Integer(n) => format!("(integer) {}", n),
        Value::SimpleString(text) => text.clone(),
        Value::BulkString(data) => format!("{:?}", String::from_utf8_lossy(data)),
        Value::Error(message) => format!("(error) {}", message),
        Value::Array(items) if items.is_empty() => "(empty array)".to_string(),
        Value::Array(items) => {
            let width = items.len().to_string().len();
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let pad = if i == 0 { String::new() } else { " ".repeat(indent) };
                    format!("{}{:>width$}) {}", pad, i + 1, render(item, indent + width + 2))
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
