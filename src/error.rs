//! Error kinds of the WebDAV engine.
//!
//! Everything except [`DavError::MalformedRequest`] is turned into an HTTP
//! response by the handler that detects it. Nothing here reaches the accept
//! loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DavError {
    /// The request line or header block could not be parsed. The connection
    /// is closed without a response.
    #[error("malformed request: {0}")]
    MalformedRequest(&'static str),

    /// A storage write, allocation or truncation failed.
    #[error("write failure: {0}")]
    WriteFailure(&'static str),

    /// The client did not deliver the declared body in time.
    #[error("timed out waiting for request body")]
    BodyTimeout,

    /// The other bus master was active recently.
    #[error("storage bus is in use by another controller")]
    BusUnavailable,

    /// Storage failed to initialize at startup.
    #[error("storage unavailable")]
    StorageUnavailable,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DavError {
    /// Short plain-text diagnostic sent to the client on a 500.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            DavError::WriteFailure(msg) => msg,
            DavError::BodyTimeout => "Timed out waiting for data",
            DavError::Io(_) => "Write data failed",
            _ => "Internal error",
        }
    }
}

pub type DavResult<T> = Result<T, DavError>;
