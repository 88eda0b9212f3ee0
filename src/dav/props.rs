use std::io;

use tracing::{debug, warn};

use crate::dav::multistatus::{
    CONTENT_TYPE_XML, MULTISTATUS_CLOSE, MULTISTATUS_OPEN, ResourceDescriptor, XML_PROLOG,
    child_href, encode_response,
};
use crate::dav::{ALLOW_DIR, ALLOW_FILE, not_found};
use crate::http::connection::{Connection, Socket};
use crate::http::request::{Depth, Request};
use crate::http::response::{BodyLength, StatusCode};
use crate::storage::{Resource, Storage, normalize};

/// PROPFIND, and PROPPATCH which is answered the same way without applying
/// anything.
///
/// `infinity` is served like depth 1; there is no recursive descent.
pub(crate) async fn handle_propfind<S: Storage, C: Socket>(
    storage: &S,
    conn: &mut Connection<C>,
    req: &Request,
    resource: Resource,
) -> io::Result<()> {
    let allow = match resource {
        Resource::Absent => return not_found(conn, req).await,
        Resource::File => ALLOW_FILE,
        Resource::Directory => ALLOW_DIR,
    };
    conn.send_header("Allow", allow);
    conn.set_content_length(BodyLength::Unknown);
    conn.send(StatusCode::MultiStatus, Some(CONTENT_TYPE_XML), b"")
        .await?;
    conn.send_content(XML_PROLOG.as_bytes()).await?;
    conn.send_content(MULTISTATUS_OPEN.as_bytes()).await?;

    let path = normalize(&req.path);
    match storage.stat(path).await {
        Ok(Some(entry)) => {
            let this = ResourceDescriptor::from_entry(req.path.clone(), &entry);
            conn.send_content(encode_response(&this).as_bytes()).await?;
        }
        Ok(None) => warn!(path, "resource vanished during PROPFIND"),
        Err(e) => warn!(path, error = %e, "stat failed during PROPFIND"),
    }

    if resource == Resource::Directory && req.depth != Depth::None {
        let children = storage.list(path).await.unwrap_or_else(|e| {
            warn!(path, error = %e, "listing failed during PROPFIND");
            Vec::new()
        });
        debug!(path, children = children.len(), "listing collection");
        for child in &children {
            tokio::task::yield_now().await;
            let href = child_href(&req.path, &child.name);
            let descriptor = ResourceDescriptor::from_entry(href, child);
            conn.send_content(encode_response(&descriptor).as_bytes())
                .await?;
        }
    }

    conn.send_content(MULTISTATUS_CLOSE.as_bytes()).await
}
