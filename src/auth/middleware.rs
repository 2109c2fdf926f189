use crate::db::DbPool;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::extractor::resolve_bearer_user;

/// Route guard: rejects the request before it reaches a handler unless the
/// bearer credential resolves to a user. Handlers still take `AuthUser` to
/// get at the caller's identity; this layer keeps unauthenticated traffic
/// away from protected routes wholesale.
pub async fn require_auth(
    State(pool): State<Arc<DbPool>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match resolve_bearer_user(&pool, request.headers()).await {
        Ok(_) => next.run(request).await,
        Err(rejection) => rejection.into_response(),
    }
}
