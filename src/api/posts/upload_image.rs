use crate::api::{validation_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::images::{validate_image, MAX_FILE_SIZE};
use crate::schema::posts;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use utoipa::ToSchema;

use super::list::PostItem;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageRequest {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/upload-image",
    tag = "posts",
    params(
        ("id" = i32, Path, description = "Post ID")
    ),
    request_body(content_type = "multipart/form-data", content = UploadImageRequest),
    responses(
        (status = 200, description = "Image attached to the post", body = PostItem),
        (status = 400, description = "Invalid image", body = crate::api::ValidationErrors),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    // Resolve the post through the same owner filter as every other action,
    // before touching the upload itself.
    let caption: String = {
        let mut conn = get_conn!(pool);
        match posts::table
            .filter(posts::id.eq(id))
            .filter(posts::user_id.eq(user.id))
            .select(posts::caption)
            .first(&mut conn)
        {
            Ok(c) => c,
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
                        error: "Failed to upload image".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    };

    // Find the "image" field in the multipart body
    let mut data = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("image") {
                    match field.bytes().await {
                        Ok(bytes) => {
                            data = Some(bytes);
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("Field read error: {}", e);
                            let error_msg = if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                                format!("File too large. Maximum size is {} bytes", MAX_FILE_SIZE)
                            } else {
                                format!("Failed to read file data: {}", e.body_text())
                            };
                            return validation_error("image", &error_msg);
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Multipart read error: {}", e);
                return validation_error("image", &e.body_text());
            }
        }
    }

    let data = match data {
        Some(d) => d,
        None => return validation_error("image", "No image provided"),
    };

    // Reject bad data before any write so a failed upload never mutates the post
    let content_type = match validate_image(&data) {
        Ok(ct) => ct,
        Err(e) => return validation_error("image", &e),
    };

    let mut conn = get_conn!(pool);

    if let Err(e) = diesel::update(posts::table.find(id))
        .set((
            posts::image.eq(Some(data.to_vec())),
            posts::image_content_type.eq(Some(&content_type)),
        ))
        .execute(&mut conn)
    {
        tracing::error!("Failed to save image: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to upload image".to_string(),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(PostItem::from_row(id, caption, Some(content_type))),
    )
        .into_response()
}
