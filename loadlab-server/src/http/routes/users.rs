//! User lookup endpoint: the I/O-bound half of the benchmark.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::db::{User, UserRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// User response
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

/// GET /db/{id} - point lookup by primary key.
///
/// The id is coerced by hand so a malformed value maps to this service's
/// own 400 body instead of an extractor rejection.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id: i64 = raw_id.parse().map_err(|_| ApiError::InvalidParam {
        param: "id",
        reason: format!("'{}' is not an integer", raw_id),
    })?;

    let user = UserRepo::new(&state.pool).find_by_id(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/db/{id}", get(get_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_carries_all_user_fields() {
        let response = UserResponse::from(User {
            id: 7,
            name: "Ada".into(),
            email: "ada@example.com".into(),
        });
        let value = serde_json::to_value(&response).expect("serializes");
        assert_eq!(value["id"], 7);
        assert_eq!(value["name"], "Ada");
        assert_eq!(value["email"], "ada@example.com");
    }
}
