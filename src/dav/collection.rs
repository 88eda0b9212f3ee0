use std::io;

use tracing::{debug, warn};

use crate::dav::{ALLOW_CREATED, not_found};
use crate::http::connection::{Connection, Socket};
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::storage::{Resource, Storage, normalize};

async fn server_error<C: Socket>(conn: &mut Connection<C>, message: &str) -> io::Result<()> {
    conn.send(StatusCode::InternalServerError, Some("text/plain"), message.as_bytes())
        .await
}

/// MKCOL: only on a path that does not exist yet. Missing parents are
/// created too.
pub(crate) async fn handle_mkcol<S: Storage, C: Socket>(
    storage: &S,
    conn: &mut Connection<C>,
    req: &Request,
    resource: Resource,
) -> io::Result<()> {
    if resource != Resource::Absent {
        return not_found(conn, req).await;
    }

    let path = normalize(&req.path);
    if let Err(e) = storage.mkdir(path).await {
        warn!(path, error = %e, "unable to create directory");
        return server_error(conn, "Unable to create directory").await;
    }

    debug!(path, "directory created");
    conn.send_header("Allow", ALLOW_CREATED);
    conn.send(StatusCode::Created, None, b"").await
}

pub(crate) async fn handle_move<S: Storage, C: Socket>(
    storage: &S,
    conn: &mut Connection<C>,
    req: &Request,
    resource: Resource,
) -> io::Result<()> {
    if resource == Resource::Absent {
        return not_found(conn, req).await;
    }
    let Some(dest) = req.destination_path() else {
        return not_found(conn, req).await;
    };

    let from = normalize(&req.path);
    let to = normalize(&dest);
    if let Err(e) = storage.rename(from, to).await {
        warn!(from, to, error = %e, "unable to move");
        return server_error(conn, "Unable to move").await;
    }

    debug!(from, to, "move successful");
    conn.send_header("Allow", ALLOW_CREATED);
    conn.send(StatusCode::Created, None, b"").await
}

/// DELETE of a file, or of an empty directory. There is no recursive delete.
pub(crate) async fn handle_delete<S: Storage, C: Socket>(
    storage: &S,
    conn: &mut Connection<C>,
    req: &Request,
    resource: Resource,
) -> io::Result<()> {
    let path = normalize(&req.path);
    let result = match resource {
        Resource::Absent => return not_found(conn, req).await,
        Resource::File => storage.remove(path).await,
        Resource::Directory => storage.rmdir(path).await,
    };
    if let Err(e) = result {
        warn!(path, error = %e, "unable to delete");
        return server_error(conn, "Unable to delete").await;
    }

    debug!(path, "delete successful");
    conn.send_header("Allow", ALLOW_CREATED);
    conn.send(StatusCode::Ok, None, b"").await
}
