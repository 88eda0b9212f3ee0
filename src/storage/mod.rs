//! Storage collaborator.
//!
//! The WebDAV engine only ever talks to the card through [`Storage`]. Paths
//! are the decoded, slash-rooted request paths; mapping them onto the real
//! filesystem is up to the implementation.

use std::io;
use std::time::SystemTime;

use tokio::io::{AsyncRead, AsyncWrite};

pub mod localfs;

pub use localfs::LocalStorage;

/// One filesystem entry as seen by `stat` or a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Last path segment, empty for the root
    pub name: String,
    /// Size in bytes, 0 for directories
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

/// What a request path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Absent,
    File,
    Directory,
}

#[allow(async_fn_in_trait)]
pub trait Storage {
    type Reader: AsyncRead + Unpin;
    type Writer: AsyncWrite + Unpin;

    /// Checks that the medium is present and usable.
    async fn init(&self) -> io::Result<()>;

    /// `None` when nothing exists at `path`.
    async fn stat(&self, path: &str) -> io::Result<Option<Entry>>;

    /// Children of a directory, in enumeration order.
    async fn list(&self, path: &str) -> io::Result<Vec<Entry>>;

    async fn open_read(&self, path: &str) -> io::Result<Self::Reader>;

    /// Creates `path`, truncating an existing file.
    async fn create(&self, path: &str) -> io::Result<Self::Writer>;

    /// Replaces `path` with a new file whose storage for `len` bytes is
    /// reserved up front.
    async fn preallocate(&self, path: &str, len: u64) -> io::Result<Self::Writer>;

    /// Flushes pending writes and sets the file length.
    async fn set_len(&self, file: &mut Self::Writer, len: u64) -> io::Result<()>;

    async fn remove(&self, path: &str) -> io::Result<()>;

    async fn rename(&self, from: &str, to: &str) -> io::Result<()>;

    /// Creates a directory, including missing parents.
    async fn mkdir(&self, path: &str) -> io::Result<()>;

    /// Removes an empty directory.
    async fn rmdir(&self, path: &str) -> io::Result<()>;
}

/// Strips exactly one trailing slash, except from the root.
pub fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Classifies `path`. Lookup errors count as absent.
pub async fn resolve<S: Storage>(storage: &S, path: &str) -> Resource {
    match storage.stat(normalize(path)).await {
        Ok(Some(entry)) if entry.is_dir => Resource::Directory,
        Ok(Some(_)) => Resource::File,
        Ok(None) => Resource::Absent,
        Err(e) => {
            tracing::debug!(path, error = %e, "stat failed, treating as absent");
            Resource::Absent
        }
    }
}
