//! Minimal HTTP/1.x plumbing for the relay's fixed routes
//!
//! Only what the three routes need: request-line parsing on the way in,
//! preformatted response blocks and multipart part encoding on the way
//! out. This is deliberately not a general HTTP implementation.

pub mod request;
pub mod response;

pub use request::{read_request, Request};
pub use response::{encode_part, BOUNDARY, DEFAULT_INDEX_PAGE};
