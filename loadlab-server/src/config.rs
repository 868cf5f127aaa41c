//! Environment-based configuration.
//!
//! Database credentials come from the environment with no defaults: a
//! missing variable is a startup failure, never a silent fallback. Pool
//! sizing, compute limits, and the bind address are fixed configuration
//! with defaults matching the benchmark setup.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use loadlab_core::retry::RetryPolicy;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },
}

/// Database credentials and host.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub database: String,
}

impl DbConfig {
    /// Read `DB_USER`, `DB_PASS`, `DB_HOST`, `DB_NAME` from the
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read variables through a lookup function (the testable seam).
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require =
            |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar { name });
        Ok(Self {
            user: require("DB_USER")?,
            password: require("DB_PASS")?,
            host: require("DB_HOST")?,
            database: require("DB_NAME")?,
        })
    }
}

/// Pool sizing. Fixed at construction; the pool is never resized.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Ceiling on simultaneously open connections.
    pub max_connections: u32,
    /// Warm floor of idle connections the pool keeps around.
    pub min_connections: u32,
    /// A connection older than this is retired, never reused.
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 10,
            max_lifetime: Duration::from_secs(5 * 60),
        }
    }
}

/// Bounds applied at the dispatch boundary before compute work starts.
#[derive(Debug, Clone, Copy)]
pub struct ComputeLimits {
    /// How many primes `/calc` counts before responding.
    pub prime_target: u32,
    /// Largest Fibonacci order `/complex/{n}` accepts. Keeps a single
    /// request's CPU time finite and the result within `u64`.
    pub max_fib_order: u32,
}

impl Default for ComputeLimits {
    fn default() -> Self {
        Self {
            prime_target: 10_000,
            max_fib_order: 40,
        }
    }
}

/// Server configuration.
///
/// Admission is unconditional: excess concurrent requests queue for a free
/// worker instead of being rejected, so there is no queue-depth knob here.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8080).
    pub bind_addr: SocketAddr,
    pub pool: PoolConfig,
    pub limits: ComputeLimits,
    pub retry: RetryPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            pool: PoolConfig::default(),
            limits: ComputeLimits::default(),
            retry: RetryPolicy::default(),
        }
    }
}
