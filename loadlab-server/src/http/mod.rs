//! HTTP layer: routing, shared state, error mapping.
//!
//! Every handler outcome, including failures, becomes a JSON response
//! with an explicit status; nothing propagates past this layer unhandled.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState};
