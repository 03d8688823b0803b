//! Streaming server listener
//!
//! Handles TCP accept loop and spawns a connection handler task per
//! client. The server owns the single [`FrameBroadcaster`] every
//! connection reads from and the feed task that fills it.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::broadcast::FrameBroadcaster;
use crate::error::Result;
use crate::feed;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;

/// MJPEG streaming server
pub struct StreamServer {
    config: ServerConfig,
    broadcaster: Arc<FrameBroadcaster>,
    next_session_id: AtomicU64,
}

impl StreamServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self::with_broadcaster(config, FrameBroadcaster::shared())
    }

    /// Create a new server sharing an externally owned broadcaster
    pub fn with_broadcaster(config: ServerConfig, broadcaster: Arc<FrameBroadcaster>) -> Self {
        Self {
            config,
            broadcaster,
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Get a reference to the frame broadcaster
    pub fn broadcaster(&self) -> &Arc<FrameBroadcaster> {
        &self.broadcaster
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Spawn the encoder feed task
    ///
    /// Reads the continuous JPEG byte stream from `reader`, demuxes it and
    /// publishes completed frames. Start the feed before accepting clients
    /// so the first viewer never races stream startup.
    pub fn spawn_feed<R>(&self, reader: R) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let broadcaster = Arc::clone(&self.broadcaster);
        let buffer_size = self.config.feed_read_buffer;

        tokio::spawn(async move {
            if let Err(e) = feed::pump(reader, broadcaster, buffer_size).await {
                tracing::error!(error = %e, "Encoder feed failed");
            }
        })
    }

    /// Run the server
    ///
    /// Binds the configured address and accepts until the process ends.
    /// Bind failure is the one fatal error; accept failures are logged and
    /// the loop continues.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "MJPEG server listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "MJPEG server listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    /// Run the server with the feed attached
    ///
    /// Starts the encoder feed, then accepts clients until `shutdown`
    /// resolves. On shutdown the listener is dropped and the feed task is
    /// aborted; open connections notice on their next write and terminate
    /// themselves.
    pub async fn run_with_feed<R, F>(&self, reader: R, shutdown: F) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        F: std::future::Future<Output = ()>,
    {
        let feed_handle = self.spawn_feed(reader);
        let result = self.run_until(shutdown).await;
        feed_handle.abort();
        result
    }

    /// Accept connections on a caller-supplied listener
    ///
    /// Useful for binding to an ephemeral port first (tests, embedding)
    /// and handing the listener over.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.accept_loop(&listener).await
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::warn!(session_id = session_id, error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let config = self.config.clone();
        let broadcaster = Arc::clone(&self.broadcaster);

        tokio::spawn(async move {
            let mut connection =
                Connection::new(session_id, socket, peer_addr, config, broadcaster);

            if let Err(e) = connection.run().await {
                if e.is_disconnect() {
                    tracing::debug!(
                        session_id = session_id,
                        error = %e,
                        "Client disconnected"
                    );
                } else {
                    tracing::warn!(
                        session_id = session_id,
                        error = %e,
                        "Connection error"
                    );
                }
            }

            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }
}
