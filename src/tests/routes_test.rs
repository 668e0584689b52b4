use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{register, send, test_app};

#[tokio::test]
async fn suggestion_crud() {
    let app = test_app().await;
    let (a, a_id) = register(&app, "a@x.com", "Alice").await;
    let (b, _) = register(&app, "b@x.com", "Bob").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/routes/suggest",
        Some(&a),
        Some(json!({ "start_location": "Bangkok", "end_location": "Krabi", "description": "night bus" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_owned();

    let (_, body) = send(&app, Method::GET, "/api/routes/suggestions", Some(&b), None).await;
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/api/routes/suggestions/{id}"), Some(&b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestion"]["user_id"], a_id.as_str());
    assert_eq!(body["suggestion"]["description"], "night bus");

    // No ownership check: Bob may rewrite and remove Alice's suggestion.
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/routes/suggestions/{id}"),
        Some(&b),
        Some(json!({ "start_location": "Bangkok", "end_location": "Phang Nga", "description": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &format!("/api/routes/suggestions/{id}"), Some(&a), None).await;
    assert_eq!(body["suggestion"]["end_location"], "Phang Nga");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/routes/suggestions/{id}"), Some(&b), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/api/routes/suggestions/{id}"), Some(&a), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn suggestion_needs_both_endpoints() {
    let app = test_app().await;
    let (a, _) = register(&app, "a@x.com", "Alice").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/routes/suggest",
        Some(&a),
        Some(json!({ "start_location": "Bangkok", "end_location": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cost_lookup_uses_seeded_routes() {
    let app = test_app().await;
    let (a, _) = register(&app, "a@x.com", "Alice").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/routes/cost?start_location=3&end_location=4&distance=0.8&duration=12",
        Some(&a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input"]["start_location"], "3");
    assert_eq!(body["routes"].as_array().unwrap().len(), 1);
    assert_eq!(body["routes"][0]["TransportMode"], "boat");
    assert_eq!(body["estimated_cost"], 20.0);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/routes/cost?start_location=2&end_location=11",
        Some(&a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["routes"].as_array().unwrap().is_empty());
    assert!(body["estimated_cost"].is_null());
}

#[tokio::test]
async fn malformed_cost_query_gets_a_json_error() {
    let app = test_app().await;
    let (a, _) = register(&app, "a@x.com", "Alice").await;

    let (status, body) = send(&app, Method::GET, "/api/routes/cost?end_location=3", Some(&a), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("start_location"));

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/routes/cost?start_location=3&end_location=4&distance=abc",
        Some(&a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
