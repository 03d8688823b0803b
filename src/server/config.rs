//! Server configuration

use std::net::SocketAddr;

use crate::http::DEFAULT_INDEX_PAGE;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Maximum size of a request head in bytes
    pub max_request_bytes: usize,

    /// Read buffer size for the encoder feed
    pub feed_read_buffer: usize,

    /// HTML body served at /index.html
    pub index_html: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            tcp_nodelay: true, // Important for low latency
            max_request_bytes: 8 * 1024,
            feed_read_buffer: 16 * 1024,
            index_html: DEFAULT_INDEX_PAGE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the request head size limit
    pub fn max_request_bytes(mut self, limit: usize) -> Self {
        self.max_request_bytes = limit;
        self
    }

    /// Set the encoder feed read buffer size
    pub fn feed_read_buffer(mut self, size: usize) -> Self {
        self.feed_read_buffer = size.max(SOI_CHUNK_MIN);
        self
    }

    /// Replace the index page body
    pub fn index_html(mut self, body: impl Into<String>) -> Self {
        self.index_html = body.into();
        self
    }
}

// A feed read must be able to hold at least the SOI marker, or boundary
// detection can never fire.
const SOI_CHUNK_MIN: usize = 2;
