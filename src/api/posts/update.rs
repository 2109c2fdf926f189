use crate::api::{validation_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::posts;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::list::PostItem;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub caption: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i32, Path, description = "Post ID")
    ),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated successfully", body = PostItem),
        (status = 400, description = "Invalid request", body = crate::api::ValidationErrors),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_post(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdatePostRequest>,
) -> impl IntoResponse {
    if let Some(ref caption) = request.caption {
        if caption.trim().is_empty() {
            return validation_error("caption", "Caption must not be empty");
        }
    }

    let mut conn = get_conn!(pool);

    let existing: (i32, String, Option<String>) = match posts::table
        .filter(posts::id.eq(id))
        .filter(posts::user_id.eq(user.id))
        .select((posts::id, posts::caption, posts::image_content_type))
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
            tracing::error!("Failed to fetch post: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update post".to_string(),
                }),
            )
                .into_response();
        }
    };

    let (id, old_caption, content_type) = existing;
    let caption = request
        .caption
        .map(|c| c.trim().to_string())
        .unwrap_or(old_caption);

    if let Err(e) = diesel::update(posts::table.find(id))
        .set(posts::caption.eq(&caption))
        .execute(&mut conn)
    {
        tracing::error!("Failed to update post: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to update post".to_string(),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(PostItem::from_row(id, caption, content_type)),
    )
        .into_response()
}
