use sdwebdav::bus::{BusArbiter, BusSignal, PassiveLines};
use sdwebdav::config::Config;
use sdwebdav::server::{DavServer, listener};
use sdwebdav::storage::LocalStorage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let (mut arbiter, signal) = BusArbiter::new(cfg.bus.blockout(), Box::new(PassiveLines::new()));
    if cfg.bus.settle_on_start {
        arbiter.start_blockout(std::time::Instant::now());
    }
    watch_chip_select(signal)?;

    let storage = LocalStorage::new(&cfg.storage.root);
    let listen_addr = cfg.server.listen_addr.clone();
    let mut server = DavServer::new(storage, arbiter, cfg);
    if let Err(e) = server.init().await {
        tracing::error!("{}; serving reject responses only", e);
    }

    tokio::select! {
        res = listener::run(&mut server, &listen_addr) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Each SIGUSR1 is one chip-select edge from the other bus master, as
/// reported by the external GPIO watcher.
#[cfg(unix)]
fn watch_chip_select(signal: BusSignal) -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal as unix_signal};

    let mut edges = unix_signal(SignalKind::user_defined1())?;
    tokio::spawn(async move {
        while edges.recv().await.is_some() {
            signal.chip_select_edge();
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn watch_chip_select(_signal: BusSignal) -> anyhow::Result<()> {
    tracing::warn!("no chip-select edge source on this platform");
    Ok(())
}
