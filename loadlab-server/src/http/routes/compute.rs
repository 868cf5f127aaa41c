//! CPU-bound endpoints: prime counting and recursive Fibonacci.
//!
//! Both handlers run their computation inline on the handler's task. The
//! work is meant to occupy an execution unit for its full duration; only
//! the database round-trip in `/complex/{n}` yields the thread.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use loadlab_core::compute;

use crate::db::UserRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// GET /calc response
#[derive(Serialize)]
pub struct CalcResponse {
    pub result: u64,
}

/// GET /complex/{n} response
#[derive(Serialize)]
pub struct ComplexResponse {
    pub fib_input: u32,
    pub fib_result: u64,
    pub calc_time_ms: u64,
    pub db_rows: i64,
}

/// GET /calc - value of the configured n-th prime
async fn calc(State(state): State<Arc<AppState>>) -> Json<CalcResponse> {
    let result = compute::nth_prime(state.limits.prime_target);
    Json(CalcResponse { result })
}

/// GET /complex/{n} - timed Fibonacci plus an aggregate query.
///
/// CPU work first, then a pooled round-trip to the store. Any store
/// failure maps to a complete 500 JSON body, never partial output.
async fn complex(
    State(state): State<Arc<AppState>>,
    Path(raw_n): Path<String>,
) -> Result<Json<ComplexResponse>, ApiError> {
    let n: u32 = raw_n.parse().map_err(|_| ApiError::InvalidParam {
        param: "n",
        reason: format!("'{}' is not a non-negative integer", raw_n),
    })?;
    if n > state.limits.max_fib_order {
        return Err(ApiError::InvalidParam {
            param: "n",
            reason: format!("{} exceeds the maximum order {}", n, state.limits.max_fib_order),
        });
    }

    let started = Instant::now();
    let fib_result = compute::fibonacci(n);
    let calc_time_ms = started.elapsed().as_millis() as u64;

    let db_rows = UserRepo::new(&state.pool).count().await?;

    Ok(Json(ComplexResponse {
        fib_input: n,
        fib_result,
        calc_time_ms,
        db_rows,
    }))
}

/// Compute routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/calc", get(calc))
        .route("/complex/{n}", get(complex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_envelope_field_names() {
        let response = ComplexResponse {
            fib_input: 10,
            fib_result: 55,
            calc_time_ms: 3,
            db_rows: 1000,
        };
        let value = serde_json::to_value(&response).expect("serializes");
        assert_eq!(value["fib_input"], 10);
        assert_eq!(value["fib_result"], 55);
        assert_eq!(value["calc_time_ms"], 3);
        assert_eq!(value["db_rows"], 1000);
    }

    #[test]
    fn calc_envelope_field_name() {
        let value = serde_json::to_value(CalcResponse { result: 104_729 }).expect("serializes");
        assert_eq!(value["result"], 104_729);
    }
}
