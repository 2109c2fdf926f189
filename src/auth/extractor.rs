use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::models::User;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::db::get_user_from_token;

/// Extractor that resolves the bearer credential to the authenticated user.
///
/// Use this in any handler that requires authentication:
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     // user is the authenticated User
/// }
/// ```
pub struct AuthUser(pub User);

/// Why a request failed authentication. Every variant maps to a 401; the
/// message distinguishes absent credentials from malformed ones and from
/// tokens the session store no longer accepts.
pub enum AuthRejection {
    NoCredentials,
    MalformedCredentials,
    BadToken,
}

impl AuthRejection {
    fn message(&self) -> &'static str {
        match self {
            AuthRejection::NoCredentials => "Missing bearer credentials",
            AuthRejection::MalformedCredentials => "Malformed bearer credentials",
            AuthRejection::BadToken => "Invalid or expired token",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: self.message().to_string(),
            }),
        )
            .into_response()
    }
}

/// Pulls the bearer token out of the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthRejection::NoCredentials)?;

    value
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(AuthRejection::MalformedCredentials)
}

/// The one authentication path: header → token → session lookup. The
/// extractor and the route-guard middleware both go through here.
pub(super) async fn resolve_bearer_user(
    pool: &DbPool,
    headers: &HeaderMap,
) -> Result<User, AuthRejection> {
    let token = bearer_token(headers)?;
    get_user_from_token(pool, token)
        .await
        .ok_or(AuthRejection::BadToken)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Arc::<DbPool>::from_ref(state);
        let user = resolve_bearer_user(&pool, &parts.headers).await?;
        Ok(AuthUser(user))
    }
}
