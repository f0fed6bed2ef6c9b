//! TCP server
//!
//! Accepts client connections and runs one request/response exchange per
//! connection: read a request line, execute it against the command engine,
//! write the framed reply, close.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::commands::CommandEngine;
use crate::ipc::protocol::{encode_reply, parse_request, STATUS_ERROR, STATUS_OK};
use crate::remote::RemoteLister;

/// TCP front end for the command engine.
pub struct MetaServer<L: RemoteLister> {
    /// Engine executing decoded commands
    engine: Arc<CommandEngine<L>>,
    /// Socket listener
    listener: Option<TcpListener>,
    /// Active connections counter
    connections: Arc<AtomicUsize>,
}

impl<L: RemoteLister> MetaServer<L> {
    /// Create a server over the given engine.
    pub fn new(engine: Arc<CommandEngine<L>>) -> Self {
        Self {
            engine,
            listener: None,
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listening socket.
    pub async fn start(&mut self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!(addr = %addr, "Metadata server listening");
        self.listener = Some(listener);
        Ok(())
    }

    /// Address the server is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Run the accept loop, spawning a task per connection.
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("Server not started")?;

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "Accepted connection");
                    let engine = Arc::clone(&self.engine);
                    let connections = Arc::clone(&self.connections);

                    tokio::spawn(async move {
                        connections.fetch_add(1, Ordering::Relaxed);
                        if let Err(e) = handle_connection(stream, engine).await {
                            error!(peer = %peer, error = %e, "Connection handler error");
                        }
                        connections.fetch_sub(1, Ordering::Relaxed);
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Number of connections currently being served.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }
}

/// Serve one request/response exchange on a client connection.
async fn handle_connection<L: RemoteLister>(
    stream: TcpStream,
    engine: Arc<CommandEngine<L>>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);

    let mut line = String::new();
    buf_reader
        .read_line(&mut line)
        .await
        .context("Failed to read request")?;

    let request = line.trim();
    if request.is_empty() {
        debug!("Empty request");
        return Ok(());
    }

    let started = Instant::now();
    let (status, body) = match parse_request(request) {
        Ok((command, args)) => match engine.execute(&command, &args).await {
            Ok(reply) => (STATUS_OK, reply),
            Err(e) => (STATUS_ERROR, e.to_string()),
        },
        Err(e) => (STATUS_ERROR, e.to_string()),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status == STATUS_ERROR {
        warn!(request = %request, bytes = body.len(), elapsed_ms = elapsed_ms, error = %body, "Request failed");
    } else {
        info!(request = %request, bytes = body.len(), elapsed_ms = elapsed_ms, "Request served");
    }

    writer
        .write_all(encode_reply(status, &body).as_bytes())
        .await
        .context("Failed to write reply")?;
    let _ = writer.shutdown().await;

    Ok(())
}
