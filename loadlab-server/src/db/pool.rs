//! Connection pool construction with bounded startup retry.
//!
//! Uses sqlx `MySqlPool` with explicit connection limits. The pool's own
//! bookkeeping provides the runtime invariants: open connections never
//! exceed the ceiling, a connection past its lifetime is retired rather
//! than reused, and every checkout is returned on all exit paths.

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;

use loadlab_core::retry::{RetryPolicy, StartupRetry, Step};

use crate::config::{DbConfig, PoolConfig};

/// Pool establishment failure after the retry budget is spent.
///
/// Always fatal: the process must not accept requests without a live pool.
#[derive(Debug, thiserror::Error)]
#[error("database unreachable after {attempts} attempts: {source}")]
pub struct PoolError {
    pub attempts: u32,
    #[source]
    pub source: sqlx::Error,
}

/// Connect options from credentials. The store listens on the MySQL
/// default port.
pub fn connect_options(db: &DbConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&db.host)
        .username(&db.user)
        .password(&db.password)
        .database(&db.database)
}

fn pool_options(cfg: &PoolConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .max_lifetime(cfg.max_lifetime)
}

/// Establish the pool, retrying on the policy's fixed schedule.
///
/// Tolerates a store that is co-scheduled with this process and still
/// starting up. Returns the pool as soon as one attempt succeeds;
/// exhausting the budget returns the last driver error.
pub async fn connect_with_retry(
    options: MySqlConnectOptions,
    sizing: &PoolConfig,
    policy: RetryPolicy,
) -> Result<MySqlPool, PoolError> {
    let mut retry = StartupRetry::new(policy);
    loop {
        let attempt = retry.attempt();
        match pool_options(sizing).connect_with(options.clone()).await {
            Ok(pool) => {
                retry.succeed();
                tracing::info!(attempt, "database pool established");
                return Ok(pool);
            }
            Err(err) => match retry.fail() {
                Step::Wait(delay) => {
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "database not reachable, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry.begin_next();
                }
                Step::GiveUp => {
                    tracing::error!(attempt, error = %err, "database unreachable, giving up");
                    return Err(PoolError {
                        attempts: attempt,
                        source: err,
                    });
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn exhausts_budget_against_unreachable_port() {
        // Port 1 refuses immediately, so this exercises the full retry
        // loop in a few tens of milliseconds.
        let options = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("bench")
            .database("bench");
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(10),
        };

        let err = connect_with_retry(options, &PoolConfig::default(), policy)
            .await
            .expect_err("nothing listens on port 1");
        assert_eq!(err.attempts, 2);
    }

    // Integration tests require a real database.
    // Run with: DATABASE_URL=mysql://... cargo test -p loadlab-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_load_respects_connection_ceiling() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let cfg = PoolConfig {
            max_connections: 4,
            min_connections: 0,
            max_lifetime: Duration::from_secs(60),
        };
        let pool = pool_options(&cfg)
            .connect(&url)
            .await
            .expect("pool creation failed");

        // Four times as many queries as the ceiling allows at once
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    sqlx::query("SELECT SLEEP(1)")
                        .execute(&pool)
                        .await
                        .expect("concurrent query failed");
                })
            })
            .collect();

        // While the queries queue for connections, the pool must never
        // open more than the ceiling
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(pool.size() <= cfg.max_connections);
        }

        for handle in handles {
            handle.await.expect("task panicked");
        }
    }
}
