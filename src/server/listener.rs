use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::http::connection::Connection;
use crate::server::AppContext;

/// Binds the accepting socket and serves connections until cancelled.
///
/// Bind/listen failure is a fatal startup error and is propagated to the
/// caller before any connection is accepted.
pub async fn run(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let addr = ctx.config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    serve(listener, ctx).await
}

/// Accept loop over an already-bound listener. Each accepted connection
/// becomes a detached per-connection task; a single failed accept is logged
/// and accepting continues.
pub async fn serve(listener: TcpListener, ctx: Arc<AppContext>) -> anyhow::Result<()> {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                info!("Accepted connection from {}", peer);

                let ctx = ctx.clone();
                tokio::spawn(async move {
                    let mut conn = Connection::new(socket, ctx);
                    if let Err(e) = conn.run().await {
                        error!("Connection error from {}: {}", peer, e);
                    }
                });
            }
            Err(e) => {
                error!("Accept error: {}", e);
            }
        }
    }
}
