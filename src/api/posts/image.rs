use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::posts;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/posts/{id}/image",
    tag = "posts",
    params(
        ("id" = i32, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Raw image bytes", content_type = "image/*"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post or image not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_image(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let row: (Option<Vec<u8>>, Option<String>) = match posts::table
        .filter(posts::id.eq(id))
        .filter(posts::user_id.eq(user.id))
        .select((posts::image, posts::image_content_type))
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Post not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch image: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch image".to_string(),
                }),
            )
                .into_response();
        }
    };

    match row {
        (Some(data), Some(content_type)) => {
            ([(header::CONTENT_TYPE, content_type)], data).into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Post has no image".to_string(),
            }),
        )
            .into_response(),
    }
}
