//! Crate error types

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for relay operations
#[derive(Debug)]
pub enum Error {
    /// Underlying socket or pipe I/O failure
    Io(std::io::Error),
    /// The client sent something that is not a parseable HTTP/1.x request
    InvalidRequest(String),
    /// The request head exceeded the configured size limit
    RequestTooLarge(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::InvalidRequest(line) => write!(f, "Invalid HTTP request: {:?}", line),
            Error::RequestTooLarge(limit) => {
                write!(f, "Request head exceeded {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl Error {
    /// Whether this error came from the peer closing or resetting the socket
    ///
    /// Used to pick the log level for disconnects: an ordinary client
    /// departure is not worth more than a debug line.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
