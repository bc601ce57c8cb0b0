//! Scrape endpoint.
//!
//! Serves the Prometheus text exposition of the shared sink on `/metrics`
//! and a liveness probe on `/healthz`.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::sink::{PrometheusSink, TEXT_CONTENT_TYPE};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<PrometheusSink>,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(app_state)
}

/// Render every gauge in the text exposition format.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.sink.encode_text() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", err)).into_response()
        }
    }
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Labels, MetricSink};
    use crate::sink::catalog::{DISH_SNR, DISH_WEDGE_FRACTION_OBSTRUCTED, WEDGE_LABELS};
    use axum::body::to_bytes;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        AppState {
            sink: Arc::new(PrometheusSink::new().unwrap()),
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let state = create_test_state();
        state.sink.set_gauge(DISH_SNR, 9.5).unwrap();
        let app = create_router(state);

        let (status, content_type, body) = get(app, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(TEXT_CONTENT_TYPE));
        assert!(body.contains("# TYPE dish_snr gauge"), "body: {body}");
        assert!(body.contains("dish_snr 9.5"), "body: {body}");
    }

    #[tokio::test]
    async fn test_metrics_reflect_latest_write() {
        let state = create_test_state();
        let sink = state.sink.clone();
        let app = create_router(state);

        let labels: Labels = [(WEDGE_LABELS[0], "60".to_string())].into_iter().collect();
        sink.set_labeled_gauge(DISH_WEDGE_FRACTION_OBSTRUCTED, &labels, 0.1)
            .unwrap();
        sink.set_labeled_gauge(DISH_WEDGE_FRACTION_OBSTRUCTED, &labels, 0.4)
            .unwrap();

        let (_, _, body) = get(app, "/metrics").await;
        assert!(body.contains("dish_wedge_fraction_obstructed{degrees=\"60\"} 0.4"));
        assert!(!body.contains("} 0.1"));
    }

    #[tokio::test]
    async fn test_healthz_endpoint() {
        let app = create_router(create_test_state());

        let (status, _, body) = get(app, "/healthz").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_router(create_test_state());
        let (status, _, _) = get(app, "/api/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
