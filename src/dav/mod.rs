//! WebDAV method dispatch.
//!
//! A [`Dispatcher`] answers exactly one parsed request. It runs in one of two
//! modes:
//!
//! - **normal**: the path is resolved against storage and the matching
//!   handler runs. Constructing a normal dispatcher takes a [`BusGuard`], so
//!   storage can only be reached while the bus is held.
//! - **degraded**: storage is off limits. PROPFIND gets a canned listing that
//!   carries the reason, OPTIONS is answered as usual, everything else is 404.

use std::io;

use tracing::debug;

use crate::bus::BusGuard;
use crate::config::WriteStrategy;
use crate::http::connection::{Connection, Socket};
use crate::http::request::{Method, Request};
use crate::http::response::{BodyLength, StatusCode};
use crate::storage::{Resource, Storage, resolve};

pub mod collection;
pub mod lock;
pub mod multistatus;
pub mod props;
pub mod transfer;

pub(crate) const ALLOW_NOT_FOUND: &str = "OPTIONS,MKCOL,POST,PUT";
pub(crate) const ALLOW_FILE: &str = "PROPFIND,OPTIONS,DELETE,COPY,MOVE,HEAD,POST,PUT,GET";
pub(crate) const ALLOW_DIR: &str = "PROPFIND,OPTIONS,DELETE,COPY,MOVE";
pub(crate) const ALLOW_LOCKABLE: &str =
    "PROPPATCH,PROPFIND,OPTIONS,DELETE,UNLOCK,COPY,LOCK,MOVE,HEAD,POST,PUT,GET";
pub(crate) const ALLOW_CREATED: &str = "OPTIONS,MKCOL,LOCK,POST,PUT";

enum Mode<'a, S> {
    Normal { storage: &'a S, strategy: WriteStrategy },
    Degraded { message: &'a str },
}

pub struct Dispatcher<'a, S> {
    mode: Mode<'a, S>,
}

impl<'a, S: Storage> Dispatcher<'a, S> {
    /// Dispatcher with storage access, valid while `_bus` is held.
    pub fn normal(storage: &'a S, _bus: &'a BusGuard<'_>, strategy: WriteStrategy) -> Self {
        Self {
            mode: Mode::Normal { storage, strategy },
        }
    }

    /// Dispatcher that never touches storage. `message` explains why.
    pub fn degraded(message: &'a str) -> Self {
        Self {
            mode: Mode::Degraded { message },
        }
    }

    pub async fn dispatch<C: Socket>(&self, conn: &mut Connection<C>, req: &Request) -> io::Result<()> {
        match self.mode {
            Mode::Normal { storage, strategy } => {
                let resource = resolve(storage, &req.path).await;
                debug!(method = %req.method, path = %req.path, ?resource, "dispatching");
                conn.send_header("DAV", "2");
                handle_request(storage, strategy, conn, req, resource).await
            }
            Mode::Degraded { message } => {
                debug!(method = %req.method, path = %req.path, message, "rejecting request");
                handle_reject(conn, req, message).await
            }
        }
    }
}

async fn handle_request<S: Storage, C: Socket>(
    storage: &S,
    strategy: WriteStrategy,
    conn: &mut Connection<C>,
    req: &Request,
    resource: Resource,
) -> io::Result<()> {
    match &req.method {
        Method::OPTIONS => handle_options(conn).await,
        Method::PROPFIND | Method::PROPPATCH => {
            props::handle_propfind(storage, conn, req, resource).await
        }
        Method::GET => transfer::handle_get(storage, conn, req, resource, true).await,
        Method::HEAD => transfer::handle_get(storage, conn, req, resource, false).await,
        Method::PUT => transfer::handle_put(storage, strategy, conn, req, resource).await,
        Method::MKCOL => collection::handle_mkcol(storage, conn, req, resource).await,
        Method::MOVE => collection::handle_move(storage, conn, req, resource).await,
        Method::DELETE => collection::handle_delete(storage, conn, req, resource).await,
        Method::LOCK => lock::handle_lock(conn, req, resource).await,
        Method::UNLOCK => lock::handle_unlock(conn).await,
        Method::Extension(_) => not_found(conn, req).await,
    }
}

async fn handle_reject<C: Socket>(
    conn: &mut Connection<C>,
    req: &Request,
    message: &str,
) -> io::Result<()> {
    match req.method {
        Method::OPTIONS => handle_options(conn).await,
        Method::PROPFIND => {
            conn.send_header("Allow", ALLOW_DIR);
            conn.set_content_length(BodyLength::Unknown);
            conn.send(StatusCode::MultiStatus, Some(multistatus::CONTENT_TYPE_XML), b"")
                .await?;
            let listing = multistatus::rejection_listing(message, req.depth);
            conn.send_content(multistatus::encode_multistatus(&listing).as_bytes())
                .await
        }
        _ => not_found(conn, req).await,
    }
}

pub(crate) async fn handle_options<C: Socket>(conn: &mut Connection<C>) -> io::Result<()> {
    conn.send_header("Allow", &Method::SUPPORTED.join(","));
    conn.send(StatusCode::Ok, None, b"").await
}

/// The generic 404, naming the method and path.
pub(crate) async fn not_found<C: Socket>(conn: &mut Connection<C>, req: &Request) -> io::Result<()> {
    let message = format!("Not found\nURI: {} Method: {}\n", req.path, req.method);
    conn.send_header("Allow", ALLOW_NOT_FOUND);
    debug!(method = %req.method, path = %req.path, "404 Not Found");
    conn.send(StatusCode::NotFound, Some("text/plain"), message.as_bytes())
        .await
}
