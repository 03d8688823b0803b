//! Minimal HTTP/1.x request parsing
//!
//! The relay serves three fixed routes, so all it needs from a request is
//! the method and path. Headers are read to the blank line that ends the
//! request head and otherwise ignored; bodies are not supported (GET has
//! none).

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::{Error, Result};

/// Parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method, as sent (e.g. "GET")
    pub method: String,
    /// Request target (e.g. "/stream.mjpg")
    pub path: String,
}

impl Request {
    /// Whether this is a GET request
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// Read and parse one request head from the socket
///
/// Consumes up to and including the blank line. `max_bytes` bounds the
/// total head size so a misbehaving client cannot grow the buffer without
/// limit.
pub async fn read_request<R>(reader: &mut R, max_bytes: usize) -> Result<Request>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let mut total = 0usize;

    // Request line.
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(Error::Io(std::io::ErrorKind::UnexpectedEof.into()));
    }
    total += n;
    if total > max_bytes {
        return Err(Error::RequestTooLarge(max_bytes));
    }
    let request = parse_request_line(line.trim_end())?;

    // Drain headers to the blank line.
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(Error::Io(std::io::ErrorKind::UnexpectedEof.into()));
        }
        total += n;
        if total > max_bytes {
            return Err(Error::RequestTooLarge(max_bytes));
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
    }

    Ok(request)
}

fn parse_request_line(line: &str) -> Result<Request> {
    let mut parts = line.split_whitespace();

    let method = parts.next();
    let path = parts.next();
    let version = parts.next();

    match (method, path, version) {
        (Some(method), Some(path), Some(version)) if version.starts_with("HTTP/") => {
            Ok(Request {
                method: method.to_string(),
                path: path.to_string(),
            })
        }
        _ => Err(Error::InvalidRequest(line.to_string())),
    }
}
