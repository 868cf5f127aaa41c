//! Data access: pool lifecycle and user lookups.
//!
//! Owns the MySQL connection pool (construction, sizing, startup retry)
//! and the read-only repository over the `users` table. The pool is the
//! single shared resource in the process; handlers reach it only through
//! [`crate::http::AppState`].

pub mod pool;
pub mod users;

pub use pool::{connect_options, connect_with_retry, PoolError};
pub use users::{DbError, User, UserRepo};
