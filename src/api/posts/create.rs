use crate::api::{validation_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewPost;
use crate::schema::posts;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::list::PostItem;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub caption: String,
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created successfully", body = PostItem),
        (status = 400, description = "Invalid request (empty caption)", body = crate::api::ValidationErrors),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_post(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreatePostRequest>,
) -> impl IntoResponse {
    let caption = request.caption.trim();

    if caption.is_empty() {
        return validation_error("caption", "Caption must not be empty");
    }

    let mut conn = get_conn!(pool);

    let result: Result<(i32, String), _> = diesel::insert_into(posts::table)
        .values(NewPost {
            user_id: user.id,
            caption,
            created_at: Utc::now().naive_utc(),
        })
        .returning((posts::id, posts::caption))
        .get_result(&mut conn);

    match result {
        Ok((id, caption)) => (
            StatusCode::CREATED,
            Json(PostItem::from_row(id, caption, None)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to create post: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create post".to_string(),
                }),
            )
                .into_response()
        }
    }
}
