mod common;

use axum::http::{Method, StatusCode};
use common::{spawn_app, TestApp};
use serde_json::{json, Value};

async fn create_tag(app: &TestApp, token: &str, name: &str) -> i64 {
    let (status, body) = app
        .request(
            Method::POST,
            "/api/tags",
            Some(token),
            Some(json!({ "name": name })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_ingredient(app: &TestApp, token: &str, name: &str) -> i64 {
    let (status, body) = app
        .request(
            Method::POST,
            "/api/ingredients",
            Some(token),
            Some(json!({ "name": name })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_recipe(app: &TestApp, token: &str, body: Value) -> Value {
    let (status, body) = app
        .request(Method::POST, "/api/recipes", Some(token), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn create_then_fetch_keeps_fields() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let created = create_recipe(
        &app,
        &token,
        json!({"title": "chocolate cake", "time_minutes": 30, "price": 10.00}),
    )
    .await;

    let id = created["id"].as_i64().unwrap();
    let (status, body) = app
        .request(Method::GET, &format!("/api/recipes/{}", id), Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "chocolate cake");
    assert_eq!(body["time_minutes"], 30);
    assert_eq!(body["price"], "10.00");
    assert!(body["link"].is_null());
}

#[tokio::test]
async fn list_uses_summary_form_with_bare_ids() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let tag_id = create_tag(&app, &token, "Dessert").await;
    let ingredient_id = create_ingredient(&app, &token, "Flour").await;
    create_recipe(
        &app,
        &token,
        json!({
            "title": "cake",
            "time_minutes": 30,
            "price": "5.50",
            "tags": [tag_id],
            "ingredients": [ingredient_id]
        }),
    )
    .await;

    let (status, body) = app.request(Method::GET, "/api/recipes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let recipe = &body.as_array().unwrap()[0];
    assert_eq!(recipe["tags"], json!([tag_id]));
    assert_eq!(recipe["ingredients"], json!([ingredient_id]));
    assert_eq!(recipe["price"], "5.50");
}

#[tokio::test]
async fn list_returns_newest_recipe_first() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    create_recipe(
        &app,
        &token,
        json!({"title": "first", "time_minutes": 5, "price": "1.00"}),
    )
    .await;
    create_recipe(
        &app,
        &token,
        json!({"title": "second", "time_minutes": 5, "price": "1.00"}),
    )
    .await;

    let (status, body) = app.request(Method::GET, "/api/recipes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["title"], "second");
    assert_eq!(listed[1]["title"], "first");
}

#[tokio::test]
async fn detail_expands_tags_and_ingredients() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let t1 = create_tag(&app, &token, "Vegan").await;
    let t2 = create_tag(&app, &token, "Dinner").await;
    let i1 = create_ingredient(&app, &token, "Kale").await;

    let created = create_recipe(
        &app,
        &token,
        json!({
            "title": "kale bowl",
            "time_minutes": 10,
            "price": "3.00",
            "tags": [t1, t2],
            "ingredients": [i1]
        }),
    )
    .await;

    let id = created["id"].as_i64().unwrap();
    let (status, body) = app
        .request(Method::GET, &format!("/api/recipes/{}", id), Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let tags = body["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 2);
    assert!(tags.contains(&json!({"id": t1, "name": "Vegan"})));
    assert!(tags.contains(&json!({"id": t2, "name": "Dinner"})));
    assert_eq!(body["ingredients"], json!([{"id": i1, "name": "Kale"}]));
}

#[tokio::test]
async fn recipes_are_invisible_across_owners() {
    let app = spawn_app();
    let (_, token_a) = app.user_with_token("a@example.com");
    let (_, token_b) = app.user_with_token("b@example.com");

    let created = create_recipe(
        &app,
        &token_a,
        json!({"title": "secret stew", "time_minutes": 60, "price": "8.00"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (_, listed) = app.request(Method::GET, "/api/recipes", Some(&token_b), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);

    // Not found, not forbidden
    let (status, _) = app
        .request(Method::GET, &format!("/api/recipes/{}", id), Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/recipes/{}", id),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_tag_id_is_a_validation_error() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/recipes",
            Some(&token),
            Some(json!({"title": "cake", "time_minutes": 5, "price": "1.00", "tags": [999]})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["tags"].is_array());

    let (_, listed) = app.request(Method::GET, "/api/recipes", Some(&token), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn cross_owner_tag_id_is_a_validation_error() {
    let app = spawn_app();
    let (_, token_a) = app.user_with_token("a@example.com");
    let (_, token_b) = app.user_with_token("b@example.com");

    let foreign_tag = create_tag(&app, &token_b, "Theirs").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/recipes",
            Some(&token_a),
            Some(json!({
                "title": "cake",
                "time_minutes": 5,
                "price": "1.00",
                "tags": [foreign_tag]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_values_are_rejected() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/recipes",
            Some(&token),
            Some(json!({"title": "cake", "time_minutes": -1, "price": "1.00"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/recipes",
            Some(&token),
            Some(json!({"title": "cake", "time_minutes": 1, "price": "-1.00"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_updates_only_sent_fields() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let created = create_recipe(
        &app,
        &token,
        json!({"title": "old title", "time_minutes": 30, "price": "10.00", "link": "http://x"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/recipes/{}", id),
            Some(&token),
            Some(json!({"title": "new title"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "new title");
    assert_eq!(body["time_minutes"], 30);
    assert_eq!(body["price"], "10.00");
    assert_eq!(body["link"], "http://x");
}

#[tokio::test]
async fn put_replaces_tag_associations() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let t1 = create_tag(&app, &token, "Old").await;
    let t2 = create_tag(&app, &token, "New").await;

    let created = create_recipe(
        &app,
        &token,
        json!({"title": "cake", "time_minutes": 5, "price": "1.00", "tags": [t1]}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/recipes/{}", id),
            Some(&token),
            Some(json!({"tags": [t2]})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!([t2]));
}

#[tokio::test]
async fn delete_removes_the_recipe() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let t1 = create_tag(&app, &token, "Vegan").await;
    let created = create_recipe(
        &app,
        &token,
        json!({"title": "cake", "time_minutes": 5, "price": "1.00", "tags": [t1]}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/recipes/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(Method::GET, &format!("/api/recipes/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_tag_ids_are_stored_once() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let t1 = create_tag(&app, &token, "Vegan").await;
    let created = create_recipe(
        &app,
        &token,
        json!({"title": "cake", "time_minutes": 5, "price": "1.00", "tags": [t1, t1]}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .request(Method::GET, &format!("/api/recipes/{}", id), Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!([{"id": t1, "name": "Vegan"}]));
}

#[tokio::test]
async fn patch_with_null_link_clears_it() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let created = create_recipe(
        &app,
        &token,
        json!({"title": "cake", "time_minutes": 5, "price": "1.00", "link": "http://x"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    // Omitting the field leaves the link alone
    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/recipes/{}", id),
            Some(&token),
            Some(json!({"title": "still cake"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["link"], "http://x");

    // An explicit null clears it
    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/recipes/{}", id),
            Some(&token),
            Some(json!({"link": null})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["link"].is_null());

    let (_, body) = app
        .request(Method::GET, &format!("/api/recipes/{}", id), Some(&token), None)
        .await;
    assert!(body["link"].is_null());
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let app = spawn_app();
    let (_, token) = app.user_with_token("a@example.com");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/recipes",
            Some(&token),
            Some(json!({"title": "  ", "time_minutes": 5, "price": "1.00"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["title"].is_array());
}
