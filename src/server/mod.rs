//! The WebDAV server: storage, bus arbiter and the per-connection cycle.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::bus::BusArbiter;
use crate::config::Config;
use crate::dav::Dispatcher;
use crate::error::DavError;
use crate::http::connection::{Connection, Socket};
use crate::storage::Storage;

pub mod listener;

pub const STORAGE_FAILED: &str = "Failed to initialize SD card";
pub const BUS_BUSY: &str = "Printer is using the SD card";

pub struct DavServer<S> {
    storage: S,
    arbiter: BusArbiter,
    config: Config,
    storage_ready: bool,
}

impl<S: Storage> DavServer<S> {
    /// A server whose storage has not been checked yet. Until
    /// [`init`](Self::init) succeeds every request is rejected.
    pub fn new(storage: S, arbiter: BusArbiter, config: Config) -> Self {
        Self {
            storage,
            arbiter,
            config,
            storage_ready: false,
        }
    }

    /// Checks the card while holding the bus.
    ///
    /// Waits out any blockout first. On failure the server stays in reject
    /// mode until restarted.
    pub async fn init(&mut self) -> Result<(), DavError> {
        while let Some(deadline) = self.arbiter.blockout_deadline() {
            if self.arbiter.can_take_bus() {
                break;
            }
            let wait = deadline.saturating_duration_since(Instant::now());
            debug!(wait_ms = wait.as_millis() as u64, "waiting for bus before storage init");
            tokio::time::sleep(wait).await;
        }

        let _bus = self.arbiter.take_bus_control()?;
        match self.storage.init().await {
            Ok(()) => {
                info!("storage initialized");
                self.storage_ready = true;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "storage initialization failed");
                Err(DavError::StorageUnavailable)
            }
        }
    }

    pub fn storage_ready(&self) -> bool {
        self.storage_ready
    }

    pub fn arbiter_mut(&mut self) -> &mut BusArbiter {
        &mut self.arbiter
    }

    /// One iteration of the accept loop: picks the normal or the reject
    /// entry point from storage health and bus state.
    pub async fn serve<C: Socket>(&mut self, stream: C) -> anyhow::Result<()> {
        if !self.storage_ready {
            return self.reject_client(stream, STORAGE_FAILED).await;
        }
        if !self.arbiter.can_take_bus() {
            return self.reject_client(stream, BUS_BUSY).await;
        }
        self.handle_client(stream).await
    }

    /// Serves one connection against storage: take the bus, serve, release.
    /// The bus is released on every exit path. Falls back to the reject path
    /// when the bus cannot be taken.
    pub async fn handle_client<C: Socket>(&mut self, stream: C) -> anyhow::Result<()> {
        let conn = Connection::new(stream, self.config.server.read_timeout());
        if !self.storage_ready {
            return process_client(conn, Dispatcher::<S>::degraded(STORAGE_FAILED)).await;
        }

        match self.arbiter.take_bus_control() {
            Ok(bus) => {
                let dispatcher =
                    Dispatcher::normal(&self.storage, &bus, self.config.storage.write_strategy);
                process_client(conn, dispatcher).await
            }
            Err(_) => process_client(conn, Dispatcher::<S>::degraded(BUS_BUSY)).await,
        }
    }

    /// Serves one connection without touching storage.
    pub async fn reject_client<C: Socket>(&mut self, stream: C, message: &str) -> anyhow::Result<()> {
        warn!(message, "rejecting client");
        let conn = Connection::new(stream, self.config.server.read_timeout());
        process_client(conn, Dispatcher::<S>::degraded(message)).await
    }
}

async fn process_client<S: Storage, C: Socket>(
    mut conn: Connection<C>,
    dispatcher: Dispatcher<'_, S>,
) -> anyhow::Result<()> {
    let request = match conn.read_request().await {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "closing connection without response");
            return Ok(conn.close().await?);
        }
    };

    dispatcher.dispatch(&mut conn, &request).await?;
    conn.close().await?;
    Ok(())
}
