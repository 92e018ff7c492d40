//! Hook Event Transport
//!
//! The hook companion opens a TCP connection, writes one JSON object and
//! closes. [`EventListener`] accepts those connections and forwards each
//! decoded [`HookEvent`] over a channel; the engine never touches sockets.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::events::HookEvent;

/// Largest payload accepted from one connection
pub const MAX_PAYLOAD_BYTES: u64 = 1024 * 1024;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not bind the listen address
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Could not connect within the timeout
    #[error("Timed out connecting to {0}")]
    Timeout(SocketAddr),

    /// IO error on an established connection
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// TCP listener for hook events
#[derive(Debug)]
pub struct EventListener {
    listener: TcpListener,
}

impl EventListener {
    /// Bind the listen address
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Bind` if the address is in use or invalid.
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;

        tracing::info!(addr = %addr, "Listening for hook events");
        Ok(Self { listener })
    }

    /// Address actually bound (useful with port 0)
    ///
    /// # Errors
    ///
    /// Returns an IO error if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the receiver is dropped.
    ///
    /// Each connection is read to EOF on its own task. Empty payloads are
    /// ignored; malformed ones are logged and dropped.
    pub async fn run(self, tx: mpsc::Sender<HookEvent>) {
        loop {
            let (stream, peer) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept error");
                        continue;
                    }
                },
                () = tx.closed() => {
                    tracing::debug!("Event receiver dropped, listener stopping");
                    return;
                }
            };

            let tx = tx.clone();
            tokio::spawn(async move {
                match read_event(stream).await {
                    Ok(Some(event)) => {
                        tracing::trace!(peer = %peer, session_id = %event.session_id(), "Hook event received");
                        if tx.send(event).await.is_err() {
                            tracing::debug!("Event receiver dropped");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(peer = %peer, error = %e, "Dropping hook payload"),
                }
            });
        }
    }
}

/// Errors reading one payload
#[derive(Debug, Error)]
enum ReadError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Malformed(#[from] crate::events::EventError),
}

async fn read_event(stream: TcpStream) -> Result<Option<HookEvent>, ReadError> {
    let mut buf = Vec::with_capacity(4096);
    stream.take(MAX_PAYLOAD_BYTES).read_to_end(&mut buf).await?;

    if buf.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(HookEvent::parse(&buf)?))
}

/// Deliver one payload to a listener
///
/// # Errors
///
/// Returns `TransportError::Timeout` if the connection is not established
/// within `timeout`, or an IO error if writing fails.
pub async fn send_payload(
    addr: SocketAddr,
    payload: &[u8],
    timeout: Duration,
) -> Result<(), TransportError> {
    let mut stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| TransportError::Timeout(addr))??;

    stream.write_all(payload).await?;
    stream.shutdown().await?;
    Ok(())
}
