//! [`Storage`] backed by a directory on the host filesystem, typically the
//! mount point of the SD card.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::{Entry, Storage};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a request path below the root. Paths that try to climb out of
    /// the root are refused.
    fn map(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut out = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path escapes storage root: {path}"),
                    ));
                }
            }
        }
        Ok(out)
    }
}

fn entry_from(name: String, meta: &std::fs::Metadata) -> Entry {
    Entry {
        name,
        size: if meta.is_dir() { 0 } else { meta.len() },
        modified: meta.modified().unwrap_or(UNIX_EPOCH),
        is_dir: meta.is_dir(),
    }
}

impl Storage for LocalStorage {
    type Reader = File;
    type Writer = File;

    async fn init(&self) -> io::Result<()> {
        let meta = fs::metadata(&self.root).await?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            ));
        }
        Ok(())
    }

    async fn stat(&self, path: &str) -> io::Result<Option<Entry>> {
        let target = match self.map(path) {
            Ok(target) => target,
            Err(_) => return Ok(None),
        };
        match fs::metadata(&target).await {
            Ok(meta) => {
                let name = target
                    .file_name()
                    .filter(|_| target != self.root)
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(Some(entry_from(name, &meta)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, path: &str) -> io::Result<Vec<Entry>> {
        let mut dir = fs::read_dir(self.map(path)?).await?;
        let mut entries = Vec::new();
        while let Some(child) = dir.next_entry().await? {
            let meta = child.metadata().await?;
            entries.push(entry_from(
                child.file_name().to_string_lossy().into_owned(),
                &meta,
            ));
        }
        Ok(entries)
    }

    async fn open_read(&self, path: &str) -> io::Result<File> {
        File::open(self.map(path)?).await
    }

    async fn create(&self, path: &str) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.map(path)?)
            .await
    }

    async fn preallocate(&self, path: &str, len: u64) -> io::Result<File> {
        let target = self.map(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await?;
        file.set_len(len).await?;
        Ok(file)
    }

    async fn set_len(&self, file: &mut File, len: u64) -> io::Result<()> {
        file.flush().await?;
        file.set_len(len).await
    }

    async fn remove(&self, path: &str) -> io::Result<()> {
        fs::remove_file(self.map(path)?).await
    }

    async fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        fs::rename(self.map(from)?, self.map(to)?).await
    }

    async fn mkdir(&self, path: &str) -> io::Result<()> {
        fs::create_dir_all(self.map(path)?).await
    }

    async fn rmdir(&self, path: &str) -> io::Result<()> {
        fs::remove_dir(self.map(path)?).await
    }
}
