use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use tutor_api::{ApiConfig, ApiState, router};
use tutor_wordbank::{VocabularyItem, VocabularyPool};

/// Vocabulary shared by the HTTP tests: one greetings lesson plus unrelated
/// words in a second module to draw distractors from.
pub fn fixture_vocabulary() -> VocabularyPool {
    let mut items = vec![
        VocabularyItem::new("hello", "Hello/Hi", "greetings").in_module("basics"),
        VocabularyItem::new("thanks", "thank you", "greetings").in_module("basics"),
        VocabularyItem::new("i", "I", "greetings").in_module("basics"),
        VocabularyItem::new("am", "am", "greetings").in_module("basics"),
        VocabularyItem::new("good", "good", "greetings").in_module("basics"),
        VocabularyItem::new("meet", "Nice to meet you", "greetings").in_module("basics"),
    ];
    let others = [
        "water", "bread", "house", "window", "river", "mountain", "green", "blue", "seven",
        "tomorrow", "teacher", "market", "street", "coffee", "winter", "garden", "doctor",
        "friday", "orange", "library",
    ];
    items.extend(
        others
            .iter()
            .map(|word| VocabularyItem::new(*word, word, "everyday").in_module("world")),
    );

    VocabularyPool::new(items).with_version(1)
}

/// Test state builder for creating an ApiState without any I/O
pub struct TestStateBuilder {
    vocabulary: VocabularyPool,
    vars: Vec<(String, String)>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            vocabulary: fixture_vocabulary(),
            vars: Vec::new(),
        }
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> ApiState {
        let config = ApiConfig::from_vars(self.vars).expect("Invalid test configuration");
        ApiState::new(&config, self.vocabulary)
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the fully layered app
pub fn test_client(state: ApiState) -> TestClient {
    TestClient::new(router::app(state, &[]))
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            body,
            headers,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, Body::empty(), None).await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.send("POST", uri, Body::empty(), None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, Body::empty(), None).await
    }

    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send_json("POST", uri, body).await
    }

    pub async fn put_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send_json("PUT", uri, body).await
    }

    async fn send_json<T: serde::Serialize>(
        &self,
        method: &str,
        uri: &str,
        body: &T,
    ) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");
        self.send(method, uri, Body::from(json_body), Some("application/json"))
            .await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Body,
        content_type: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(body).expect("Failed to build request");

        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Failed to parse JSON ({e}): {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }
}
