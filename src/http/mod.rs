//! HTTP/1.1 subset spoken by WebDAV clients.
//!
//! Every connection carries exactly one request and is closed afterwards, so
//! there is no keep-alive handling and no request pipelining.
//!
//! - **`connection`**: socket wrapper with timed reads of the head and body
//! - **`parser`**: request line and the retained header set
//! - **`request`**: parsed request representation
//! - **`response`**: status codes, header block, body framing
//! - **`writer`**: streams the head and a fixed-length or chunked body
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection lifecycle
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← head, bounded by the read timeout
//!        └──────┬──────┘
//!               │ Request parsed (or silent close)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← handler writes head, streams body
//!        └──────┬───────────┘
//!               │
//!               ▼
//!        ┌──────────────────┐
//!        │    Closing       │ ← last chunk, flush, shutdown
//!        └──────────────────┘
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
