pub mod api;
pub mod auth;
pub mod db;
pub mod images;
pub mod models;
pub mod schema;
pub mod users;

use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

/// Application state shared across all handlers
pub type AppState = Arc<db::DbPool>;

/// Gets a pooled connection or bails out of the handler with a 500.
#[macro_export]
macro_rules! get_conn {
    ($pool:expr) => {
        match $pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to get database connection: {}", e);
                return (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json($crate::api::ErrorResponse {
                        error: "Database connection failed".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    };
}

/// Assembles the full application router over the given pool.
/// Everything except signup/login and the OpenAPI document requires a
/// valid bearer token.
pub fn app(pool: AppState) -> Router {
    let public_router = Router::new()
        .merge(api::public::router())
        .route("/api-docs/openapi.json", get(openapi_json));

    let protected_router = Router::new()
        .nest("/api/tags", api::tags::router())
        .nest("/api/ingredients", api::ingredients::router())
        .nest("/api/recipes", api::recipes::router())
        .nest("/api/posts", api::posts::router())
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(public_router)
        .merge(protected_router)
        .with_state(pool)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(api::openapi())
}
