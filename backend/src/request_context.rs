use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Correlates one API call across the access log and upstream warnings.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RequestId(String);

impl RequestId {
    /// Reuse the id a proxy or caller already assigned.
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
        (!raw.is_empty()).then(|| Self(raw.to_owned()))
    }

    fn generate() -> Self {
        let started_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("req-{started_ms:x}-{sequence:06}"))
    }

    fn stamp(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        RequestId::from_headers(request.headers()).unwrap_or_else(RequestId::generate);
    let span = tracing::info_span!(
        "wordpress_api",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let started_at = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    request_id.stamp(response.headers_mut());

    span.in_scope(|| log_outcome(response.status(), started_at));
    response
}

fn log_outcome(status: StatusCode, started_at: Instant) {
    let elapsed_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!(status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        tracing::info!(status = status.as_u16(), elapsed_ms, "request completed");
    }
}
