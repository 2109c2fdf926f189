pub mod create;
pub mod list;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/ingredients endpoints (mounted at /api/ingredients)
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(list::list_ingredients).post(create::create_ingredient),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_ingredients, create::create_ingredient),
    components(schemas(list::IngredientItem, create::CreateIngredientRequest))
)]
pub struct ApiDoc;
