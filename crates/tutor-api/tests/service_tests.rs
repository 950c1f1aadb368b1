use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tutor_api::{jobs::sweep_idle_exercises, middleware::REQUEST_ID_HEADER};

use crate::common::{TestStateBuilder, test_client};

#[tokio::test]
async fn test_health() {
    let client = test_client(TestStateBuilder::new().build());

    client.get("/health").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_fallback_is_404() {
    let client = test_client(TestStateBuilder::new().build());

    client.get("/lessons").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let client = test_client(TestStateBuilder::new().build());

    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "trace-42")
        .body(Body::empty())
        .unwrap();
    let echoed = client.request(request).await;
    assert_eq!(echoed.headers.get(REQUEST_ID_HEADER).unwrap(), "trace-42");

    let generated = client.get("/health").await;
    let id = generated.headers.get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_preflight_allows_every_exercise_method() {
    let client = test_client(TestStateBuilder::new().build());
    let uri = format!("/exercises/{}", uuid::Uuid::new_v4());

    for method in ["PUT", "POST", "DELETE"] {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(&uri)
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", method)
            .body(Body::empty())
            .unwrap();
        let response = client.request(request).await;

        response.assert_status(StatusCode::OK);
        let allowed = response
            .headers
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(
            allowed.split(',').any(|m| m.trim() == method),
            "{method} missing from {allowed}"
        );
    }
}

#[tokio::test]
async fn test_idle_sweep_drops_stale_exercises() {
    let state = TestStateBuilder::new().build();
    let client = test_client(state.clone());

    client
        .post_json(
            "/exercises",
            &json!({ "target": { "kind": "phrase", "text": "I am good" } }),
        )
        .await
        .assert_status(StatusCode::CREATED);
    assert_eq!(state.exercises.len().await, 1);

    assert_eq!(sweep_idle_exercises(&state.exercises, 30).await, 0);

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(sweep_idle_exercises(&state.exercises, 0).await, 1);
    assert!(state.exercises.is_empty().await);
}
