use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;

/// Binds the listening socket with the configured backlog.
pub async fn bind(cfg: &Config) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = tokio::net::lookup_host(&cfg.listen_addr)
        .await
        .with_context(|| format!("invalid listen address {}", cfg.listen_addr))?
        .next()
        .with_context(|| format!("listen address {} did not resolve", cfg.listen_addr))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .context("socket creation failed")?;

    socket.set_reuseaddr(true).context("socket creation failed")?;
    socket
        .bind(addr)
        .with_context(|| format!("binding {} failed", addr))?;
    let listener = socket.listen(cfg.backlog).context("listen failed")?;

    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts connections one at a time; each is fully handled before the next
/// accept. An accept failure ends the loop with an error.
pub async fn serve(listener: TcpListener, cfg: &Config) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await.context("accept failed")?;
        tracing::debug!("Accepted connection from {}", peer);

        let mut conn = Connection::new(socket, peer, cfg);
        if let Err(e) = conn.run().await {
            tracing::error!("Connection error from {}: {}", peer, e);
        }
    }
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = bind(cfg).await?;
    serve(listener, cfg).await
}
