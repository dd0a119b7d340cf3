//! ArborKV CLI Client
//!
//! Command-line interface for interacting with ArborKV.

use arborkv::Client;
use clap::{Parser, Subcommand};

/// ArborKV CLI
#[derive(Parser, Debug)]
#[command(name = "arborkv-cli")]
#[command(about = "CLI for the ArborKV tree-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8088")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a value: key followed by path tokens (`_`, `+`, `+ N`, map keys)
    Get {
        /// Top-level key, then path tokens
        #[arg(required = true, num_args = 1..)]
        args: Vec<String>,
    },

    /// Write a value: key, path tokens, then the payload last
    Set {
        /// Top-level key, path tokens, payload
        #[arg(required = true, num_args = 2..)]
        args: Vec<String>,
    },

    /// Append a value to a key's list slot
    Append {
        /// Top-level key
        key: String,

        /// Value to append
        value: String,
    },

    /// Print the scalar of each element in a key's list slot
    List {
        /// Top-level key
        key: String,
    },
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to connect to {}: {e}", args.server);
            std::process::exit(1);
        }
    };

    let outcome = match args.command {
        Commands::Get { args } => {
            let tokens: Vec<&str> = args.iter().map(String::as_str).collect();
            client.get(&tokens).map(|value| println!("{value}"))
        }
        Commands::Set { args } => {
            let tokens: Vec<&str> = args.iter().map(String::as_str).collect();
            client.set(&tokens)
        }
        Commands::Append { key, value } => client.append(&key, &value),
        Commands::List { key } => client.get_list(&key).map(|values| {
            for value in values {
                println!("{value}");
            }
        }),
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
