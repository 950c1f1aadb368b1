//! Prometheus metrics: HTTP traffic plus word bank and exercise events.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("uuid pattern compiles")
});

static NUMBER_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\d+(/|$)").expect("number pattern compiles")
});

/// Install the Prometheus recorder.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .set_buckets_for_metric(
            Matcher::Full("word_bank_size".to_string()),
            &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 16.0, 24.0],
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Middleware recording request counts, latencies and in-flight requests.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let in_flight = gauge!("http_requests_in_flight", "method" => method.clone(), "path" => path.clone());
    in_flight.increment(1.0);
    let response = next.run(req).await;
    in_flight.decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Replace exercise ids and numeric segments with `:id`.
fn normalize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, ":id");
    NUMBER_SEGMENT.replace_all(&path, "/:id$1").into_owned()
}

pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// A word bank was assembled for a newly mounted exercise.
pub fn record_word_bank_generated(tiles: usize, max_size: usize) {
    counter!("word_banks_generated_total").increment(1);
    histogram!("word_bank_size").record(tiles as f64);
    if tiles < max_size {
        // Every scope ran out of eligible distractors
        counter!("word_banks_short_total").increment(1);
    }
}

/// A submission reached an exercise. `outcome` is one of `correct`,
/// `incorrect`, `not_ready`, `duplicate` or `rejected`.
pub fn record_submission(outcome: &'static str) {
    counter!("exercise_submissions_total", "outcome" => outcome).increment(1);
}

/// An exercise was completed, with or without a new reward.
pub fn record_completion(newly_granted: bool, points: u32) {
    let status = if newly_granted { "granted" } else { "already_completed" };
    counter!("exercise_completions_total", "status" => status).increment(1);
    if newly_granted {
        counter!("reward_points_granted_total").increment(u64::from(points));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/exercises/550e8400-e29b-41d4-a716-446655440000/word-bank"),
            "/exercises/:id/word-bank"
        );
        assert_eq!(normalize_path("/exercises/42"), "/exercises/:id");
        assert_eq!(normalize_path("/exercises/42/submit"), "/exercises/:id/submit");
        assert_eq!(normalize_path("/health"), "/health");
    }
}
