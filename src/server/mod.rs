//! HTTP streaming server
//!
//! Accept loop, per-connection handlers and configuration.

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use connection::{Connection, ConnectionPhase};
pub use listener::StreamServer;
