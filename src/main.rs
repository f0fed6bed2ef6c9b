//! s3meta daemon - local cache for S3 bucket listing metadata
//!
//! Remembers per bucket which object keys exist under a prefix and each
//! key's ETag, so repeated enumerations avoid round-tripping to S3. Clients
//! send JSON-array requests over TCP and get status-line framed replies.

mod cache;
mod commands;
mod ipc;
mod remote;

use std::env;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use cache::BucketRegistry;
use commands::CommandEngine;
use ipc::MetaServer;
use remote::AwsCliLister;

/// CLI command
#[derive(Debug)]
enum Command {
    /// Serve cache requests on a TCP port
    Serve { port: u16, host: String },
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"s3meta-daemon - Cache S3 bucket listing metadata locally

USAGE:
    s3meta-daemon <port>            # serve on 127.0.0.1:<port>
    s3meta-daemon <port> <host>     # serve on <host>:<port>
    s3meta-daemon help

PROTOCOL:
    One request per connection: a JSON array of strings, e.g.
        ["LIST","my-bucket","logs/2021/"]
        ["INVALIDATE","my-bucket"]
        ["SETETAG","my-bucket","logs/2021/a.txt","9a0364b9"]
        ["GETETAG","my-bucket","logs/2021/a.txt"]
        ["DELETE","my-bucket","logs/2021/a.txt"]
    The reply is "OK" or "ERROR" on the first line, the body after it.

ENVIRONMENT:
    S3META_PORT      Port to serve on (alternative to CLI arg)
    RUST_LOG         Log level (trace, debug, info, warn, error)

NOTE:
    Listing S3 requires the aws cli on PATH, configured with credentials.
"#
    );
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().collect();

    let raw_port = match args.get(1).map(String::as_str) {
        Some("help") | Some("--help") | Some("-h") => return Ok(Command::Help),
        Some(raw) => raw.to_string(),
        None => env::var("S3META_PORT").map_err(|_| anyhow!("Missing port number"))?,
    };

    let port: u16 = raw_port
        .parse()
        .map_err(|_| anyhow!("Invalid port number: {}", raw_port))?;
    if port == 0 {
        return Err(anyhow!("Invalid port number: {}", raw_port));
    }

    let host = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| "127.0.0.1".to_string());

    Ok(Command::Serve { port, host })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    match command {
        Command::Serve { port, host } => {
            // Listing goes through the aws cli; refuse to start without it.
            let lister = AwsCliLister::new();
            if !lister.check_available().await {
                error!("Cannot launch 'aws' command. Please install the aws cli.");
                return Err(anyhow!("aws cli not available"));
            }

            let registry = Arc::new(BucketRegistry::new());
            let engine = Arc::new(CommandEngine::new(registry, lister));

            let mut server = MetaServer::new(engine);
            server.start(&format!("{}:{}", host, port)).await?;

            info!("Daemon ready. Waiting for client requests...");

            let server_handle = tokio::spawn(async move {
                if let Err(e) = server.run().await {
                    error!(error = %e, "Server error");
                }
            });

            tokio::signal::ctrl_c().await?;

            info!("Received shutdown signal, stopping...");
            server_handle.abort();

            info!("Shutdown complete.");
        }
        Command::Help => {
            print_help();
        }
    }

    Ok(())
}
