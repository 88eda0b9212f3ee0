//! LOCK / UNLOCK.
//!
//! Clients such as Windows Explorer refuse to write without a lock, so every
//! LOCK is granted with the same token and UNLOCK always succeeds. No
//! exclusivity is enforced between lock holders.

use std::io;

use tracing::{debug, warn};

use crate::dav::multistatus::{CONTENT_TYPE_XML, XML_PROLOG, encode_href};
use crate::dav::{ALLOW_LOCKABLE, not_found};
use crate::http::connection::{Connection, Socket};
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::storage::Resource;

pub const LOCK_TOKEN: &str = "urn:uuid:26e57cb3-834d-191a-00de-000042bdecf9";

/// Largest LOCK body that is read.
pub const MAX_LOCK_BODY: usize = 1024;

pub(crate) async fn handle_lock<C: Socket>(
    conn: &mut Connection<C>,
    req: &Request,
    resource: Resource,
) -> io::Result<()> {
    if resource == Resource::Absent {
        return not_found(conn, req).await;
    }
    let len = req.body_len();
    if len == 0 || len > MAX_LOCK_BODY as u64 {
        warn!(path = %req.path, len, "refusing LOCK body");
        return not_found(conn, req).await;
    }

    let mut buf = vec![0u8; len as usize];
    let n = conn.read_body(&mut buf).await?;
    if n == 0 {
        return not_found(conn, req).await;
    }

    let body = String::from_utf8_lossy(&buf[..n]);
    let Some(owner) = lock_owner(&body) else {
        debug!(path = %req.path, "LOCK body without owner href");
        return not_found(conn, req).await;
    };

    let xml = lock_discovery(&req.path, owner);
    conn.send_header("Allow", ALLOW_LOCKABLE);
    conn.send_header("Lock-Token", LOCK_TOKEN);
    conn.send(StatusCode::Ok, Some(CONTENT_TYPE_XML), xml.as_bytes())
        .await
}

pub(crate) async fn handle_unlock<C: Socket>(conn: &mut Connection<C>) -> io::Result<()> {
    conn.send_header("Allow", ALLOW_LOCKABLE);
    conn.send_header("Lock-Token", LOCK_TOKEN);
    conn.send(StatusCode::NoContent, None, b"").await
}

/// Text between the first `<D:href>` and the following `</D:href>`.
pub fn lock_owner(body: &str) -> Option<&str> {
    let start = body.find("<D:href>")? + "<D:href>".len();
    let end = body[start..].find("</D:href>")? + start;
    Some(&body[start..end])
}

/// `lockdiscovery` body granting the fixed token on `path` to `owner`.
pub fn lock_discovery(path: &str, owner: &str) -> String {
    format!(
        "{XML_PROLOG}<D:prop xmlns:D=\"DAV:\"><D:lockdiscovery><D:activelock>\
         <D:locktype><write/></D:locktype><D:lockscope><exclusive/></D:lockscope>\
         <D:locktoken><D:href>{LOCK_TOKEN}</D:href></D:locktoken>\
         <D:lockroot><D:href>{root}</D:href></D:lockroot>\
         <D:depth>infinity</D:depth>\
         <D:owner><a:href xmlns:a=\"DAV:\">{owner}</a:href></D:owner>\
         <D:timeout>Second-3600</D:timeout>\
         </D:activelock></D:lockdiscovery></D:prop>",
        root = encode_href(path),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_first_href() {
        let body = "<D:owner><D:href>alice</D:href></D:owner><D:href>bob</D:href>";
        assert_eq!(lock_owner(body), Some("alice"));
        assert_eq!(lock_owner("<D:owner/>"), None);
        assert_eq!(lock_owner("<D:href>unterminated"), None);
    }
}
