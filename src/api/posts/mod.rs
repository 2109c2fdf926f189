pub mod create;
pub mod delete;
pub mod get;
pub mod image;
pub mod list;
pub mod update;
pub mod upload_image;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/posts endpoints (mounted at /api/posts)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_posts).post(create::create_post))
        .route(
            "/{id}",
            get(get::get_post)
                .put(update::update_post)
                .patch(update::update_post)
                .delete(delete::delete_post),
        )
        .route("/{id}/upload-image", post(upload_image::upload_image))
        .route("/{id}/image", get(image::get_image))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_posts,
        create::create_post,
        get::get_post,
        update::update_post,
        delete::delete_post,
        upload_image::upload_image,
        image::get_image,
    ),
    components(schemas(
        list::PostItem,
        create::CreatePostRequest,
        update::UpdatePostRequest,
        upload_image::UploadImageRequest,
    ))
)]
pub struct ApiDoc;
