//! File bodies: GET/HEAD downloads and PUT uploads.

use std::io;
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::config::WriteStrategy;
use crate::dav::{ALLOW_FILE, not_found};
use crate::error::{DavError, DavResult};
use crate::http::connection::{Connection, Socket};
use crate::http::mime::mime_type;
use crate::http::request::Request;
use crate::http::response::{BodyLength, StatusCode};
use crate::storage::{Resource, Storage, normalize};

/// One TCP segment worth of file data per write.
pub const SEND_CHUNK: usize = 1460;

/// Upload block size; matches the card's sector size.
pub const WRITE_BLOCK: usize = 512;

pub(crate) async fn handle_get<S: Storage, C: Socket>(
    storage: &S,
    conn: &mut Connection<C>,
    req: &Request,
    resource: Resource,
    with_body: bool,
) -> io::Result<()> {
    if resource != Resource::File {
        return not_found(conn, req).await;
    }

    let path = normalize(&req.path);
    let size = match storage.stat(path).await {
        Ok(Some(entry)) if !entry.is_dir => entry.size,
        _ => return not_found(conn, req).await,
    };
    let mut file = match storage.open_read(path).await {
        Ok(file) => file,
        Err(e) => {
            warn!(path, error = %e, "unable to open file for reading");
            return not_found(conn, req).await;
        }
    };

    conn.send_header("Allow", ALLOW_FILE);
    conn.set_content_length(BodyLength::Fixed(size));
    conn.send(StatusCode::Ok, Some(mime_type(path)), b"").await?;

    if !with_body {
        return Ok(());
    }

    let started = Instant::now();
    let mut buf = [0u8; SEND_CHUNK];
    let mut remaining = size;
    while remaining > 0 {
        let want = remaining.min(SEND_CHUNK as u64) as usize;
        let n = file.read(&mut buf[..want]).await?;
        if n == 0 {
            warn!(path, missing = remaining, "file shorter than its reported size");
            break;
        }
        conn.send_content(&buf[..n]).await?;
        remaining -= n as u64;
    }

    debug!(path, bytes = size - remaining, elapsed_ms = started.elapsed().as_millis() as u64, "file sent");
    Ok(())
}

pub(crate) async fn handle_put<S: Storage, C: Socket>(
    storage: &S,
    strategy: WriteStrategy,
    conn: &mut Connection<C>,
    req: &Request,
    resource: Resource,
) -> io::Result<()> {
    if resource == Resource::Directory {
        return not_found(conn, req).await;
    }
    conn.send_header("Allow", ALLOW_FILE);

    let path = normalize(&req.path);
    let len = req.body_len();
    let started = Instant::now();

    let mut file = None;
    let outcome = match strategy {
        WriteStrategy::Incremental => write_incremental(storage, conn, path, len, &mut file).await,
        WriteStrategy::Contiguous => write_contiguous(storage, conn, path, len, &mut file).await,
    };
    if let Err(err) = outcome {
        return write_failure(storage, conn, path, file, err).await;
    }
    drop(file);

    info!(path, bytes = len, elapsed_ms = started.elapsed().as_millis() as u64, "file stored");
    let status = if resource == Resource::Absent {
        StatusCode::Created
    } else {
        StatusCode::Ok
    };
    conn.send(status, None, b"").await
}

/// Opens (truncating) or creates the file and writes each block as it
/// arrives.
async fn write_incremental<S: Storage, C: Socket>(
    storage: &S,
    conn: &mut Connection<C>,
    path: &str,
    len: u64,
    file: &mut Option<S::Writer>,
) -> DavResult<()> {
    let created = storage
        .create(path)
        .await
        .map_err(|_| DavError::WriteFailure("Unable to create a new file"))?;
    let out = file.insert(created);

    let mut buf = [0u8; WRITE_BLOCK];
    let mut remaining = len;
    while remaining > 0 {
        let want = remaining.min(WRITE_BLOCK as u64) as usize;
        let got = conn.read_body(&mut buf[..want]).await?;
        out.write_all(&buf[..got])
            .await
            .map_err(|_| DavError::WriteFailure("Write data failed"))?;
        remaining -= got as u64;
        if got < want {
            return Err(DavError::BodyTimeout);
        }
    }

    out.flush()
        .await
        .map_err(|_| DavError::WriteFailure("Write data failed"))
}

/// Reserves `ceil(len / 512)` blocks up front, writes whole blocks into them
/// and truncates to `len` at the end.
async fn write_contiguous<S: Storage, C: Socket>(
    storage: &S,
    conn: &mut Connection<C>,
    path: &str,
    len: u64,
    file: &mut Option<S::Writer>,
) -> DavResult<()> {
    if len == 0 {
        return write_incremental(storage, conn, path, 0, file).await;
    }

    let blocks = len.div_ceil(WRITE_BLOCK as u64);
    let reserve = blocks
        .checked_mul(WRITE_BLOCK as u64)
        .ok_or(DavError::WriteFailure("File create contiguous sections failed"))?;
    let reserved = storage
        .preallocate(path, reserve)
        .await
        .map_err(|_| DavError::WriteFailure("File create contiguous sections failed"))?;
    let out = file.insert(reserved);
    debug!(path, blocks, "contiguous range reserved");

    let mut buf = [0u8; WRITE_BLOCK];
    let mut remaining = len;
    while remaining > 0 {
        let want = remaining.min(WRITE_BLOCK as u64) as usize;
        let got = conn.read_body(&mut buf[..want]).await?;
        if got < want {
            return Err(DavError::BodyTimeout);
        }
        // the tail of the last block is cut off by the truncation below
        buf[got..].fill(0);
        out.write_all(&buf)
            .await
            .map_err(|_| DavError::WriteFailure("Write data failed"))?;
        remaining -= got as u64;
    }

    storage
        .set_len(out, len)
        .await
        .map_err(|_| DavError::WriteFailure("Unable to truncate the file"))
}

/// Shared cleanup for every failed upload: close the handle, delete the
/// target and report a 500 with a short diagnostic.
async fn write_failure<S: Storage, C: Socket>(
    storage: &S,
    conn: &mut Connection<C>,
    path: &str,
    file: Option<S::Writer>,
    err: DavError,
) -> io::Result<()> {
    drop(file);
    if let Err(e) = storage.remove(path).await {
        debug!(path, error = %e, "nothing to remove after failed upload");
    }
    warn!(path, error = %err, "upload failed");
    conn.send(
        StatusCode::InternalServerError,
        Some("text/plain"),
        err.diagnostic().as_bytes(),
    )
    .await
}
