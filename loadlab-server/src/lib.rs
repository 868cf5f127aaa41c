//! loadlab-server: HTTP load-test target.
//!
//! Exposes an I/O-bound endpoint (`/db/{id}`), a CPU-bound endpoint
//! (`/calc`), and a mixed endpoint (`/complex/{n}`) over a shared MySQL
//! connection pool, as a target for measuring how CPU-bound and I/O-bound
//! work interleave on a bounded worker budget.

pub mod config;
pub mod db;
pub mod http;

pub use config::{ComputeLimits, ConfigError, DbConfig, PoolConfig, ServerConfig};
pub use http::{build_router, AppState};

/// Startup or serve failure. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Pool(#[from] db::PoolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the service: establish the pool (with retry), then serve until
/// shutdown.
pub async fn serve(db_config: DbConfig, config: ServerConfig) -> Result<(), ServeError> {
    let options = db::connect_options(&db_config);
    let pool = db::connect_with_retry(options, &config.pool, config.retry).await?;

    let state = AppState {
        pool,
        limits: config.limits,
    };
    http::run_server(state, config.bind_addr).await?;

    Ok(())
}
