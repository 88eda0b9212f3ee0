use tokio::net::TcpListener;
use tracing::info;

use crate::server::DavServer;
use crate::storage::Storage;

/// Accepts connections and serves them one at a time, each to completion.
pub async fn run<S: Storage>(server: &mut DavServer<S>, listen_addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!("Listening on {}", listen_addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        if let Err(e) = server.serve(socket).await {
            tracing::error!("Connection error from {}: {}", peer, e);
        }
    }
}
