//! HTTP API for querying the sampled history.
//!
//! Endpoints:
//!
//! - `GET /?ns=<n>` | `?ms=<n>` | `?s=<n>`: samples from the last window (JSON)
//! - `GET /health`: sampler status; 503 once it is degraded or stopped
//! - `GET /info`  : ring buffer fill state (JSON)

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use ringstat::error::QueryError;
use ringstat::health::{Health, SamplerStatus};
use ringstat::query::parse_window;
use ringstat::shared::RingReader;
use serde::Serialize;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Read half of the sample buffer.
    pub reader: RingReader,
    /// Sampler status published by the sampling thread.
    pub health: Health,
}

/// Builds the API router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(query_window))
        .route("/health", get(health))
        .route("/info", get(info))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthBody {
    status: SamplerStatus,
}

/// `GET /?<unit>=<count>`: returns the samples of the requested window.
async fn query_window(
    State(state): State<ApiState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    match parse_window(&params) {
        Ok(request) => {
            let samples = state.reader.last(request.duration());
            tracing::debug!(
                unit = %request.unit,
                count = request.count,
                returned = samples.len(),
                "window query"
            );
            Json(samples).into_response()
        }
        Err(e) => bad_request(&e),
    }
}

/// `GET /health`: reports whether samples are still arriving.
async fn health(State(state): State<ApiState>) -> Response {
    let status = state.health.status();
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(HealthBody { status })).into_response()
}

/// `GET /info`: returns buffer capacity, fill level and time span.
async fn info(State(state): State<ApiState>) -> Response {
    Json(state.reader.stats()).into_response()
}

fn bad_request(err: &QueryError) -> Response {
    tracing::debug!("rejected window query: {err}");
    (StatusCode::BAD_REQUEST, format!("bad request: {err}")).into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use ringstat::config::{RetentionConfig, SamplerPolicy};
    use ringstat::error::AcquireError;
    use ringstat::ring::Sample;
    use ringstat::sampler::Sampler;
    use ringstat::shared;
    use tower::ServiceExt;

    use super::*;

    const MS: i64 = 1_000_000;

    /// 100ms frequency, 60s retention, five samples at 0..400ms valued 1..5.
    fn test_state() -> ApiState {
        let config =
            RetentionConfig::new(Duration::from_millis(100), Duration::from_secs(60)).unwrap();
        let (mut writer, reader) = shared::channel(&config).unwrap();

        for (i, value) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
            let ts = i64::try_from(i).unwrap() * 100 * MS;
            writer.append(Sample::new(ts, value));
        }

        ApiState {
            reader,
            health: Health::new(),
        }
    }

    async fn send(state: ApiState, uri: &str) -> (StatusCode, Option<String>, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = build_router(state).oneshot(req).await.unwrap();

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();

        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_window_query_returns_recent_samples() {
        let (status, content_type, body) = send(test_state(), "/?ms=300").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let samples: Vec<Sample> = serde_json::from_str(&body).unwrap();
        assert_eq!(samples, vec![
            Sample::new(200 * MS, 3.0),
            Sample::new(300 * MS, 4.0),
            Sample::new(400 * MS, 5.0),
        ]);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json[0], serde_json::json!({"ts": 200_000_000, "value": 3.0}));
    }

    #[tokio::test]
    async fn test_window_query_units() {
        let (_, _, body) = send(test_state(), "/?s=1").await;
        let samples: Vec<Sample> = serde_json::from_str(&body).unwrap();
        assert_eq!(samples.len(), 5);

        let (_, _, body) = send(test_state(), "/?ns=200000000").await;
        let samples: Vec<Sample> = serde_json::from_str(&body).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[tokio::test]
    async fn test_sub_interval_window_returns_everything() {
        let (status, _, body) = send(test_state(), "/?ns=1").await;
        assert_eq!(status, StatusCode::OK);

        let samples: Vec<Sample> = serde_json::from_str(&body).unwrap();
        assert_eq!(samples.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_buffer_returns_empty_array() {
        let config =
            RetentionConfig::new(Duration::from_millis(100), Duration::from_secs(1)).unwrap();
        let (_writer, reader) = shared::channel(&config).unwrap();
        let state = ApiState {
            reader,
            health: Health::new(),
        };

        let (status, _, body) = send(state, "/?s=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let cases = [
            ("/", "bad request: missing query param"),
            ("/?foo=1", "bad request: unknown query param: foo"),
            ("/?ms=abc", "bad request: invalid query param value: abc"),
            ("/?ms=-5", "bad request: invalid query param value: -5"),
            ("/?ms=1&ms=2", "bad request: invalid query param value"),
            ("/?ms=300&s=1", "bad request: multiple query params"),
        ];

        for (uri, expected) in cases {
            let (status, content_type, body) = send(test_state(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(content_type.unwrap().starts_with("text/plain"), "{uri}");
            assert_eq!(body, expected, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_health_ok_while_starting() {
        let (status, _, body) = send(test_state(), "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"]["state"], "starting");
    }

    #[tokio::test]
    async fn test_health_unavailable_after_sampler_stops() {
        let config =
            RetentionConfig::new(Duration::from_millis(100), Duration::from_secs(1)).unwrap();
        let (writer, reader) = shared::channel(&config).unwrap();
        let health = Health::new();

        let source = |_: Duration| -> Result<f64, AcquireError> { Err(AcquireError::new("no cpus")) };
        let sampler = Sampler::new(source, writer, config.frequency)
            .with_policy(SamplerPolicy::fail_fast())
            .with_health(health.clone());
        assert!(sampler.run().is_err());

        let (status, _, body) = send(ApiState { reader, health }, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"]["state"], "stopped");
        assert_eq!(json["status"]["last_error"], "no cpus");
    }

    #[tokio::test]
    async fn test_info() {
        let (status, _, body) = send(test_state(), "/info").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["capacity"], 600);
        assert_eq!(json["len"], 5);
        assert_eq!(json["has_wrapped"], false);
        assert_eq!(json["oldest_ts"], 0);
        assert_eq!(json["newest_ts"], 400_000_000);
    }
}
