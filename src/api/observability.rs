use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::AppState;

/// GET /metrics
/// Prometheus text exposition; empty notice when `observability.metrics_enabled` is off.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.prometheus_handle {
        Some(handle) => handle.render(),
        None => "# botkeep metrics disabled\n".to_string(),
    }
}

/// `/bots/{bot_id}` and `/bots/{bot_id}/` report as one route.
fn route_label(matched_path: Option<&str>) -> String {
    matched_path.map_or_else(
        || "unmatched".to_string(),
        |p| {
            let trimmed = p.trim_end_matches('/');
            if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }
        },
    )
}

/// Opens the per-request span (the auth middleware fills `user_id`) and
/// records request counters and latency.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let matched_path = req
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri,
        route = matched_path.clone(),
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let status = response.status().as_u16();

        let outcome = match status {
            401 => "unauthorized",
            400..=499 => "rejected",
            500.. => "error",
            _ => "ok",
        };

        let labels = [
            ("method", method.clone()),
            ("route", route_label(matched_path.as_deref())),
            ("outcome", outcome.to_string()),
        ];

        metrics::counter!("botkeep_http_requests_total", &labels).increment(1);
        metrics::histogram!("botkeep_http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        info!(
            duration_ms,
            status,
            outcome,
            "{method} {uri} done"
        );

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_routes_share_a_label() {
        assert_eq!(route_label(Some("/bots/{bot_id}/")), "/bots/{bot_id}");
        assert_eq!(route_label(Some("/bots/{bot_id}")), "/bots/{bot_id}");
        assert_eq!(route_label(Some("/")), "/");
        assert_eq!(route_label(None), "unmatched");
    }
}
