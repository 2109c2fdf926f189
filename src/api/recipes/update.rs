use crate::api::{validation_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::create::price_to_stored;
use super::serialize::{
    check_owned_ingredients, check_owned_tags, set_recipe_ingredients, set_recipe_tags,
    summarize_one, RecipeSummary,
};

/// Keeps "field absent" (leave alone) apart from an explicit `null`
/// (clear the value), which a single Option conflates.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Every field optional: PUT and PATCH both behave as partial updates.
/// Sending `tags`/`ingredients` replaces the association set wholesale;
/// sending `"link": null` clears the link.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub link: Option<Option<String>>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeSummary),
        (status = 400, description = "Invalid request", body = crate::api::ValidationErrors),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    if let Some(ref title) = request.title {
        if title.trim().is_empty() {
            return validation_error("title", "Title must not be empty");
        }
    }

    if let Some(time_minutes) = request.time_minutes {
        if time_minutes < 0 {
            return validation_error("time_minutes", "Time must not be negative");
        }
    }

    if let Some(price) = request.price {
        if price < Decimal::ZERO {
            return validation_error("price", "Price must not be negative");
        }
    }

    let mut conn = get_conn!(pool);

    // Ownership check first: rows owned by others are invisible, not forbidden
    let existing: Recipe = match recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::user_id.eq(user.id))
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if let Some(ref tag_ids) = request.tags {
        match check_owned_tags(&mut conn, user.id, tag_ids) {
            Ok(Ok(())) => {}
            Ok(Err(errors)) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Err(e) => {
                tracing::error!("Failed to verify tags: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to update recipe".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    if let Some(ref ingredient_ids) = request.ingredients {
        match check_owned_ingredients(&mut conn, user.id, ingredient_ids) {
            Ok(Ok(())) => {}
            Ok(Err(errors)) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Err(e) => {
                tracing::error!("Failed to verify ingredients: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to update recipe".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    let title = request
        .title
        .map(|t| t.trim().to_string())
        .unwrap_or(existing.title);
    let time_minutes = request.time_minutes.unwrap_or(existing.time_minutes);
    let price = request
        .price
        .map(price_to_stored)
        .unwrap_or(existing.price);
    let link = request.link.unwrap_or(existing.link);

    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let recipe: Recipe = diesel::update(recipes::table.find(id))
            .set((
                recipes::title.eq(&title),
                recipes::time_minutes.eq(time_minutes),
                recipes::price.eq(&price),
                recipes::link.eq(link.as_deref()),
            ))
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        if let Some(ref tag_ids) = request.tags {
            set_recipe_tags(conn, recipe.id, tag_ids)?;
        }
        if let Some(ref ingredient_ids) = request.ingredients {
            set_recipe_ingredients(conn, recipe.id, ingredient_ids)?;
        }

        Ok(recipe)
    });

    let recipe = match result {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match summarize_one(&mut conn, recipe) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
