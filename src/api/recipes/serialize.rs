//! The two output shapes for recipes and the queries that fill them in.
//!
//! The summary form carries related tags/ingredients as bare ids and is used
//! for list, create and update responses. The detail form expands them to
//! full `{id, name}` objects and is used only when fetching a single recipe.

use crate::api::ingredients::list::IngredientItem;
use crate::api::tags::list::TagItem;
use crate::api::ValidationErrors;
use crate::models::{NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: i32,
    pub title: String,
    pub ingredients: Vec<i32>,
    pub tags: Vec<i32>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: i32,
    pub title: String,
    pub ingredients: Vec<IngredientItem>,
    pub tags: Vec<TagItem>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
}

fn parse_price(stored: &str) -> Decimal {
    stored.parse().unwrap_or_default()
}

/// Builds summary forms for a batch of recipes with two association queries
/// total, regardless of batch size.
pub fn summarize(
    conn: &mut SqliteConnection,
    recipes: Vec<Recipe>,
) -> QueryResult<Vec<RecipeSummary>> {
    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();

    let tag_rows: Vec<(i32, i32)> = recipe_tags::table
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .select((recipe_tags::recipe_id, recipe_tags::tag_id))
        .order(recipe_tags::id.asc())
        .load(conn)?;

    let ingredient_rows: Vec<(i32, i32)> = recipe_ingredients::table
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::ingredient_id,
        ))
        .order(recipe_ingredients::id.asc())
        .load(conn)?;

    let mut tags_by_recipe: HashMap<i32, Vec<i32>> = HashMap::new();
    for (recipe_id, tag_id) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag_id);
    }

    let mut ingredients_by_recipe: HashMap<i32, Vec<i32>> = HashMap::new();
    for (recipe_id, ingredient_id) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(ingredient_id);
    }

    Ok(recipes
        .into_iter()
        .map(|r| RecipeSummary {
            id: r.id,
            title: r.title,
            ingredients: ingredients_by_recipe.remove(&r.id).unwrap_or_default(),
            tags: tags_by_recipe.remove(&r.id).unwrap_or_default(),
            time_minutes: r.time_minutes,
            price: parse_price(&r.price),
            link: r.link,
        })
        .collect())
}

/// Builds the summary form for a single recipe.
pub fn summarize_one(conn: &mut SqliteConnection, recipe: Recipe) -> QueryResult<RecipeSummary> {
    let mut summaries = summarize(conn, vec![recipe])?;
    Ok(summaries.remove(0))
}

/// Builds the detail form: related tags/ingredients expanded to full objects.
pub fn detail(conn: &mut SqliteConnection, recipe: Recipe) -> QueryResult<RecipeDetail> {
    let tag_rows: Vec<(i32, String)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq(recipe.id))
        .select((tags::id, tags::name))
        .order(recipe_tags::id.asc())
        .load(conn)?;

    let ingredient_rows: Vec<(i32, String)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(recipe.id))
        .select((ingredients::id, ingredients::name))
        .order(recipe_ingredients::id.asc())
        .load(conn)?;

    Ok(RecipeDetail {
        id: recipe.id,
        title: recipe.title,
        ingredients: ingredient_rows
            .into_iter()
            .map(|(id, name)| IngredientItem { id, name })
            .collect(),
        tags: tag_rows
            .into_iter()
            .map(|(id, name)| TagItem { id, name })
            .collect(),
        time_minutes: recipe.time_minutes,
        price: parse_price(&recipe.price),
        link: recipe.link,
    })
}

/// Checks that every referenced tag id exists and belongs to the caller.
/// Related entities are never created implicitly and cross-owner references
/// are rejected the same way as unknown ids.
pub fn check_owned_tags(
    conn: &mut SqliteConnection,
    user_id: i32,
    tag_ids: &[i32],
) -> QueryResult<Result<(), ValidationErrors>> {
    let found: i64 = tags::table
        .filter(tags::user_id.eq(user_id))
        .filter(tags::id.eq_any(tag_ids))
        .count()
        .get_result(conn)?;

    let mut distinct = tag_ids.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    if found as usize != distinct.len() {
        return Ok(Err(ValidationErrors::field(
            "tags",
            "Invalid tag id(s) supplied",
        )));
    }
    Ok(Ok(()))
}

/// Same check for ingredient ids.
pub fn check_owned_ingredients(
    conn: &mut SqliteConnection,
    user_id: i32,
    ingredient_ids: &[i32],
) -> QueryResult<Result<(), ValidationErrors>> {
    let found: i64 = ingredients::table
        .filter(ingredients::user_id.eq(user_id))
        .filter(ingredients::id.eq_any(ingredient_ids))
        .count()
        .get_result(conn)?;

    let mut distinct = ingredient_ids.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    if found as usize != distinct.len() {
        return Ok(Err(ValidationErrors::field(
            "ingredients",
            "Invalid ingredient id(s) supplied",
        )));
    }
    Ok(Ok(()))
}

/// Drops repeated ids while keeping first-seen order, so a request carrying
/// `[t1, t1]` associates t1 once.
fn dedup_ids(ids: &[i32]) -> Vec<i32> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Replaces the recipe's tag associations with the given set.
pub fn set_recipe_tags(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    tag_ids: &[i32],
) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)?;

    let rows: Vec<NewRecipeTag> = dedup_ids(tag_ids)
        .into_iter()
        .map(|tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();

    if !rows.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(&rows)
            .execute(conn)?;
    }

    Ok(())
}

/// Replaces the recipe's ingredient associations with the given set.
pub fn set_recipe_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    ingredient_ids: &[i32],
) -> QueryResult<()> {
    diesel::delete(
        recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
    )
    .execute(conn)?;

    let rows: Vec<NewRecipeIngredient> = dedup_ids(ingredient_ids)
        .into_iter()
        .map(|ingredient_id| NewRecipeIngredient {
            recipe_id,
            ingredient_id,
        })
        .collect();

    if !rows.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(&rows)
            .execute(conn)?;
    }

    Ok(())
}
