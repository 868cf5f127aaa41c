//! Service entry point.
//!
//! Builds the runtime with a worker-thread ceiling equal to the available
//! hardware parallelism (which accounts for container CPU quotas), then
//! starts the server. Any startup failure exits non-zero.

use std::thread;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use loadlab_server::{serve, DbConfig, ServerConfig};

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn main() -> Result<()> {
    init_tracing().ok();

    let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(async {
        let db_config = DbConfig::from_env().context("database configuration")?;
        let config = ServerConfig::default();

        tracing::info!(workers, addr = %config.bind_addr, "starting loadlab");
        serve(db_config, config).await.context("server failed")?;

        Ok(())
    })
}
