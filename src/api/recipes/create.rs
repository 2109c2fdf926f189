use crate::api::{validation_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::serialize::{
    check_owned_ingredients, check_owned_tags, set_recipe_ingredients, set_recipe_tags,
    summarize_one, RecipeSummary,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    /// Ids of existing tags owned by the caller
    pub tags: Option<Vec<i32>>,
    /// Ids of existing ingredients owned by the caller
    pub ingredients: Option<Vec<i32>>,
}

/// Normalizes a price to two decimal places for storage.
pub fn price_to_stored(price: Decimal) -> String {
    let mut price = price.round_dp(2);
    price.rescale(2);
    price.to_string()
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeSummary),
        (status = 400, description = "Invalid request", body = crate::api::ValidationErrors),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    if request.title.trim().is_empty() {
        return validation_error("title", "Title must not be empty");
    }

    if request.time_minutes < 0 {
        return validation_error("time_minutes", "Time must not be negative");
    }

    if request.price < Decimal::ZERO {
        return validation_error("price", "Price must not be negative");
    }

    let mut conn = get_conn!(pool);

    let tag_ids = request.tags.unwrap_or_default();
    let ingredient_ids = request.ingredients.unwrap_or_default();

    match check_owned_tags(&mut conn, user.id, &tag_ids) {
        Ok(Ok(())) => {}
        Ok(Err(errors)) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        Err(e) => {
            tracing::error!("Failed to verify tags: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    match check_owned_ingredients(&mut conn, user.id, &ingredient_ids) {
        Ok(Ok(())) => {}
        Ok(Err(errors)) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        Err(e) => {
            tracing::error!("Failed to verify ingredients: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    let price = price_to_stored(request.price);

    // Recipe row and its associations land in one transaction
    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                user_id: user.id,
                title: request.title.trim(),
                time_minutes: request.time_minutes,
                price: &price,
                link: request.link.as_deref(),
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        set_recipe_tags(conn, recipe.id, &tag_ids)?;
        set_recipe_ingredients(conn, recipe.id, &ingredient_ids)?;

        Ok(recipe)
    });

    let recipe = match result {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match summarize_one(&mut conn, recipe) {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
