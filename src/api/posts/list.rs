use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::posts;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostItem {
    pub id: i32,
    pub caption: String,
    /// URL path of the stored image, null until one is uploaded
    pub image: Option<String>,
}

impl PostItem {
    /// Builds the wire form from the columns the handlers select. The image
    /// blob itself stays in the database; the wire form carries its URL.
    pub fn from_row(id: i32, caption: String, content_type: Option<String>) -> Self {
        PostItem {
            id,
            caption,
            image: content_type.map(|_| format!("/api/posts/{}/image", id)),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "Caller's posts", body = [PostItem]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_posts(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<(i32, String, Option<String>)> = match posts::table
        .filter(posts::user_id.eq(user.id))
        .select((posts::id, posts::caption, posts::image_content_type))
        .order(posts::id.asc())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch posts: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch posts".to_string(),
                }),
            )
                .into_response();
        }
    };

    let items: Vec<PostItem> = rows
        .into_iter()
        .map(|(id, caption, content_type)| PostItem::from_row(id, caption, content_type))
        .collect();

    (StatusCode::OK, Json(items)).into_response()
}
