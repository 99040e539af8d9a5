use std::sync::Arc;

use serde_json::json;

use tickerd::auth::AllowAll;
use tickerd::config::Config;
use tickerd::data::MemoryDataSource;
use tickerd::server::{self, AppContext};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Verbosity comes from RUST_LOG; "info" when unset.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    tracing::info!(
        "Server Configuration - Host: {}, Port: {}, Document Root: {}, Threads: {}",
        cfg.server_host,
        cfg.server_port,
        cfg.doc_root,
        cfg.threads
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.threads.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        // The record store is an external collaborator; the shipped binary
        // runs against an in-memory source seeded with sample rows.
        let data = Arc::new(MemoryDataSource::new(vec![
            json!({"id": 1, "symbol": "NVDA", "name": "NVIDIA Corporation"}),
            json!({"id": 2, "symbol": "AAPL", "name": "Apple Inc."}),
        ]));

        let ctx = Arc::new(AppContext::new(cfg, data, Arc::new(AllowAll)));

        tokio::select! {
            res = server::listener::run(ctx) => {
                res?;
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
            }
        }

        anyhow::Ok(())
    })
}
