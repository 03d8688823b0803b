//! Per-client connection handling
//!
//! Each accepted socket gets its own task running [`Connection::run`]: one
//! request in, one response out. The static routes answer and close; the
//! stream route switches the connection into an endless multipart loop
//! that follows the broadcaster, ending only when a write to the client
//! fails.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::broadcast::FrameBroadcaster;
use crate::error::{Error, Result};
use crate::http::{encode_part, response, Request};
use crate::server::config::ServerConfig;

/// Connection lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Socket accepted, request not yet read
    AwaitingRequest,
    /// Redirect for / written, about to close
    RedirectSent,
    /// Index page written, about to close
    PageSent,
    /// Multipart stream in progress
    Streaming,
    /// Connection finished
    Closed,
}

/// One client connection
pub struct Connection {
    session_id: u64,
    socket: TcpStream,
    peer_addr: SocketAddr,
    phase: ConnectionPhase,
    config: ServerConfig,
    broadcaster: Arc<FrameBroadcaster>,
}

impl Connection {
    /// Create a connection handler for an accepted socket
    pub fn new(
        session_id: u64,
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: ServerConfig,
        broadcaster: Arc<FrameBroadcaster>,
    ) -> Self {
        Self {
            session_id,
            socket,
            peer_addr,
            phase: ConnectionPhase::AwaitingRequest,
            config,
            broadcaster,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    /// Serve the connection to completion
    ///
    /// Static routes return after one response. The stream route returns
    /// only with an error, normally the client closing the socket.
    pub async fn run(&mut self) -> Result<()> {
        let result = self.serve().await;
        self.phase = ConnectionPhase::Closed;
        result
    }

    async fn serve(&mut self) -> Result<()> {
        let request = self.read_request().await?;

        tracing::debug!(
            session_id = self.session_id,
            peer = %self.peer_addr,
            method = %request.method,
            path = %request.path,
            "Request received"
        );

        self.dispatch(&request).await
    }

    async fn read_request(&mut self) -> Result<Request> {
        let (read_half, _) = self.socket.split();
        let mut reader = BufReader::new(read_half);
        crate::http::read_request(&mut reader, self.config.max_request_bytes).await
    }

    async fn dispatch(&mut self, request: &Request) -> Result<()> {
        if !request.is_get() {
            self.socket
                .write_all(&response::method_not_allowed())
                .await?;
            return Ok(());
        }

        match request.path.as_str() {
            "/" => {
                self.socket.write_all(&response::redirect("/index.html")).await?;
                self.phase = ConnectionPhase::RedirectSent;
                Ok(())
            }
            "/index.html" => {
                self.socket
                    .write_all(&response::html_page(&self.config.index_html))
                    .await?;
                self.phase = ConnectionPhase::PageSent;
                Ok(())
            }
            "/stream.mjpg" => {
                self.phase = ConnectionPhase::Streaming;
                self.stream().await
            }
            _ => {
                self.socket.write_all(&response::not_found()).await?;
                Ok(())
            }
        }
    }

    /// Follow the broadcaster and write one part per published frame
    ///
    /// A frame published while a part is mid-write is not resent later;
    /// the next wait simply returns whatever is current then. The loop's
    /// only exit is a failed write.
    async fn stream(&mut self) -> Result<()> {
        self.socket.write_all(&response::stream_head()).await?;

        tracing::info!(
            session_id = self.session_id,
            peer = %self.peer_addr,
            "Streaming client added"
        );

        let mut last_seen = 0u64;
        loop {
            let (frame, generation) = self.broadcaster.wait_next(last_seen).await;
            last_seen = generation;

            // The part is encoded outside any shared state; the
            // broadcaster lock is long released by the time we write.
            let part = encode_part(&frame);
            if let Err(e) = self.socket.write_all(&part).await {
                tracing::info!(
                    session_id = self.session_id,
                    peer = %self.peer_addr,
                    error = %e,
                    "Streaming client removed"
                );
                return Err(Error::Io(e));
            }
        }
    }
}
