use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{register, send, test_app};

#[tokio::test]
async fn seeded_places_and_locations_are_public() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/places", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let places = body["places"].as_array().unwrap();
    assert_eq!(places.len(), 32);
    // The bootstrap backfill gave every seeded place a storage id.
    assert!(places.iter().all(|p| p["_id"].is_string()));

    let (status, body) = send(&app, Method::GET, "/api/locations", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let locations = body["locations"].as_array().unwrap();
    assert_eq!(locations.len(), 11);
    assert_eq!(locations[0]["LocationID"], "1");
    assert_eq!(locations[10]["LocationID"], "11");
}

#[tokio::test]
async fn place_lookup_falls_back_to_storage_id() {
    let app = test_app().await;

    let (_, body) = send(&app, Method::GET, "/api/places/1", None, None).await;
    let storage_id = body["place"]["_id"].as_str().unwrap().to_owned();

    let (status, body) = send(&app, Method::GET, &format!("/api/places/{storage_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["place"]["PlaceID"], "1");

    let (status, _) = send(&app, Method::GET, "/api/places/does-not-exist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, Method::GET, &format!("/api/places/{missing}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rating_is_the_mean_of_reviews() {
    let app = test_app().await;
    let (a, _) = register(&app, "a@x.com", "Alice").await;
    let (b, _) = register(&app, "b@x.com", "Bob").await;

    let (_, body) = send(&app, Method::GET, "/api/places/1", None, None).await;
    assert_eq!(body["place"]["Rating"], 0.0);

    for (token, rating) in [(&a, 5), (&b, 4)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/reviews",
            Some(token),
            Some(json!({ "placeId": "1", "rating": rating, "comment": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, Method::GET, "/api/places/1", None, None).await;
    assert_eq!(body["place"]["Rating"], 4.5);

    let (_, body) = send(&app, Method::GET, "/api/places", None, None).await;
    let listed = body["places"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["PlaceID"] == "1")
        .unwrap()
        .clone();
    assert_eq!(listed["Rating"], 4.5);
}
