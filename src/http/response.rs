//! HTTP/1.x response and multipart part encoding
//!
//! Responses are built as byte blocks and written in one call so a part
//! body is never interleaved with another writer's output (each connection
//! owns its socket exclusively anyway, but a single write keeps the
//! syscall count down at 30 frames per second).

use bytes::{BufMut, Bytes, BytesMut};

use crate::broadcast::Frame;

/// Multipart boundary token used by the stream route
pub const BOUNDARY: &str = "FRAME";

/// Default index page, served at /index.html
pub const DEFAULT_INDEX_PAGE: &str = "\
<!DOCTYPE html>
<html>
  <head>
    <title>MJPEG Relay</title>
  </head>
  <body>
    <h1>Live Stream</h1>
    <img src=\"stream.mjpg\" width=\"640\" height=\"480\" />
  </body>
</html>
";

/// 301 redirect to the index page, no body
pub fn redirect(location: &str) -> Bytes {
    Bytes::from(format!(
        "HTTP/1.1 301 Moved Permanently\r\n\
         Location: {}\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\
         \r\n",
        location
    ))
}

/// 200 response carrying the static HTML page
pub fn html_page(body: &str) -> Bytes {
    Bytes::from(format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        body.len(),
        body
    ))
}

/// 404 response for unrecognized paths
pub fn not_found() -> Bytes {
    let body = "Not Found";
    Bytes::from(format!(
        "HTTP/1.1 404 Not Found\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        body.len(),
        body
    ))
}

/// 405 response for anything other than GET
pub fn method_not_allowed() -> Bytes {
    Bytes::from(
        "HTTP/1.1 405 Method Not Allowed\r\n\
         Allow: GET\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\
         \r\n",
    )
}

/// Response head for the stream route
///
/// After these headers the body is an unbounded sequence of multipart
/// parts; the response never carries a Content-Length and ends only when
/// the connection does.
pub fn stream_head() -> Bytes {
    Bytes::from(format!(
        "HTTP/1.1 200 OK\r\n\
         Age: 0\r\n\
         Cache-Control: no-cache, private\r\n\
         Pragma: no-cache\r\n\
         Content-Type: multipart/x-mixed-replace; boundary={}\r\n\
         \r\n",
        BOUNDARY
    ))
}

/// Encode one multipart part carrying a frame
///
/// Layout: boundary line, per-part Content-Type and Content-Length, blank
/// line, raw JPEG bytes, trailing CRLF.
pub fn encode_part(frame: &Frame) -> Bytes {
    let head = format!(
        "--{}\r\n\
         Content-Type: image/jpeg\r\n\
         Content-Length: {}\r\n\
         \r\n",
        BOUNDARY,
        frame.len()
    );

    let mut part = BytesMut::with_capacity(head.len() + frame.len() + 2);
    part.put_slice(head.as_bytes());
    part.put_slice(frame.as_ref());
    part.put_slice(b"\r\n");
    part.freeze()
}
