use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{admin_token, register, send, test_app};

#[tokio::test]
async fn non_admin_is_forbidden_and_nothing_changes() {
    let app = test_app().await;
    let (token, _) = register(&app, "plain@x.com", "Plain").await;

    let (status, body) = send(&app, Method::GET, "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::DELETE, "/api/admin/places/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/places/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_need_authentication_first() {
    let app = test_app().await;
    let (status, _) = send(&app, Method::GET, "/api/admin/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_creates_updates_and_deletes_a_place() {
    let app = test_app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/places",
        Some(&admin),
        Some(json!({
            "PlaceID": "p-new",
            "Name": "Sky Bar",
            "LocationID": "1",
            "Category": "Bar",
            "Coordinates": { "lat": 13.72, "lng": 100.51 },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["place"]["PlaceID"], "p-new");
    assert_eq!(body["place"]["Coordinates"]["lat"], 13.72);

    let (status, body) = send(&app, Method::GET, "/api/places/p-new", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["place"]["Name"], "Sky Bar");
    assert_eq!(body["place"]["Rating"], 0.0);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/admin/places/p-new",
        Some(&admin),
        Some(json!({ "name": "Sky Bar 2", "location_id": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/places/p-new", None, None).await;
    assert_eq!(body["place"]["Name"], "Sky Bar 2");

    let (status, _) = send(&app, Method::DELETE, "/api/admin/places/p-new", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/places/p-new", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn place_without_external_id_uses_storage_id() {
    let app = test_app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/places",
        Some(&admin),
        Some(json!({ "Name": "Night Market", "LocationID": "2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["place"]["PlaceID"], body["place"]["_id"]);
}

#[tokio::test]
async fn place_requires_name_and_location() {
    let app = test_app().await;
    let admin = admin_token(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/places",
        Some(&admin),
        Some(json!({ "Name": "  ", "LocationID": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_manages_users() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (_, user_id) = register(&app, "m@x.com", "M").await;

    let (status, body) = send(&app, Method::GET, "/api/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{user_id}"),
        Some(&admin),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &format!("/api/admin/users/{user_id}"), Some(&admin), None).await;
    assert_eq!(body["user"]["role"], "admin");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/admin/users/{user_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/api/admin/users/{user_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejected_user_patch_changes_nothing() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (_, user_id) = register(&app, "n@x.com", "Named").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{user_id}"),
        Some(&admin),
        Some(json!({ "name": "", "role": "admin", "status": "banned" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, &format!("/api/admin/users/{user_id}"), Some(&admin), None).await;
    assert_eq!(body["user"]["name"], "Named");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["status"], "active");

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{missing}"),
        Some(&admin),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_cannot_delete_self_and_bad_ids_are_rejected() {
    let app = test_app().await;
    let admin = admin_token(&app).await;

    let (_, me) = send(&app, Method::GET, "/api/profile", Some(&admin), None).await;
    let my_id = me["user"]["id"].as_str().unwrap().to_owned();

    let (status, _) = send(&app, Method::DELETE, &format!("/api/admin/users/{my_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/admin/users/not-a-uuid", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid user ID");

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/admin/users/{missing}/ban"),
        Some(&admin),
        Some(json!({ "reason": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn demoted_admin_loses_access_immediately() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (token, user_id) = register(&app, "d@x.com", "D").await;

    send(&app, Method::PUT, &format!("/api/admin/users/{user_id}"), Some(&admin), Some(json!({ "role": "admin" }))).await;
    let (status, _) = send(&app, Method::GET, "/api/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    send(&app, Method::PUT, &format!("/api/admin/users/{user_id}"), Some(&admin), Some(json!({ "role": "user" }))).await;
    let (status, _) = send(&app, Method::GET, "/api/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn stats_count_users_reviews_and_suggestions() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (token, _) = register(&app, "s@x.com", "S").await;

    send(&app, Method::POST, "/api/reviews", Some(&token), Some(json!({ "placeId": "1", "rating": 4, "comment": "ok" }))).await;
    send(&app, Method::POST, "/api/routes/suggest", Some(&token), Some(json!({ "start_location": "1", "end_location": "3" }))).await;

    let (status, body) = send(&app, Method::GET, "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 2);
    assert_eq!(body["total_reviews"], 1);
    assert_eq!(body["total_routes"], 1);
    assert!(body["last_updated"].is_string());
}

#[tokio::test]
async fn review_reports_are_moderated() {
    let app = test_app().await;
    let admin = admin_token(&app).await;
    let (token, _) = register(&app, "rep@x.com", "Rep").await;

    let (_, body) = send(&app, Method::POST, "/api/reviews", Some(&token), Some(json!({ "placeId": "1", "rating": 1, "comment": "bad" }))).await;
    let review_id = body["id"].as_str().unwrap().to_owned();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/reviews/{review_id}/report"),
        Some(&token),
        Some(json!({ "type": "spam", "detail": "ad link" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let report_id = body["id"].as_str().unwrap().to_owned();

    let (_, body) = send(&app, Method::GET, "/api/admin/review-reports?status=pending", Some(&admin), None).await;
    let reports = body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["type"], "spam");
    assert!(reports[0]["resolved_at"].is_null());

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/admin/review-reports/{report_id}/status"),
        Some(&admin),
        Some(json!({ "status": "resolved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/admin/review-reports?status=pending", Some(&admin), None).await;
    assert!(body["reports"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, Method::GET, "/api/admin/review-reports", Some(&admin), None).await;
    assert_eq!(body["reports"][0]["status"], "resolved");
    assert!(body["reports"][0]["resolved_at"].is_string());
}
