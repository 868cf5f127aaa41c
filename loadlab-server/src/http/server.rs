//! Axum server assembly.
//!
//! Router construction, shared state, bind/serve, and graceful shutdown
//! on SIGTERM/Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::MySqlPool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::ComputeLimits;

/// Shared application state.
///
/// The pool is the only shared resource; handlers receive it through this
/// state, never through a global. Handlers themselves hold no mutable
/// state, so the pool's internal synchronization is the only locking in
/// the request path.
#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub limits: ComputeLimits,
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::compute::router())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind and run the HTTP server until shutdown.
///
/// A bind failure is returned to the caller and is fatal: the process
/// must not linger half-started.
pub async fn run_server(state: AppState, bind_addr: SocketAddr) -> std::io::Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, starting shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
    use tower::ServiceExt;

    use super::*;

    /// State over a lazily-connecting pool: handlers that never touch the
    /// database run against it without a server.
    fn test_state() -> AppState {
        let options = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("bench")
            .database("bench");
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(options);
        AppState {
            pool,
            limits: ComputeLimits::default(),
        }
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn calc_returns_benchmark_prime() {
        let (status, body) = get("/calc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], 104_729);
    }

    #[tokio::test]
    async fn complex_rejects_non_numeric_order() {
        let (status, body) = get("/complex/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_parameter");
    }

    #[tokio::test]
    async fn complex_rejects_negative_order() {
        let (status, body) = get("/complex/-3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_parameter");
    }

    #[tokio::test]
    async fn complex_rejects_oversized_order() {
        let (status, body) = get("/complex/4000").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_parameter");
    }

    #[tokio::test]
    async fn user_lookup_rejects_non_numeric_id() {
        let (status, body) = get("/db/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_parameter");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (status, _) = get("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
