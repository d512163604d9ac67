//! Request logging middleware

use std::time::{Duration, Instant};

use axum::{extract::Request, middleware::Next, response::Response};

/// Log method, path, status and latency of every request
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    // Snapshots of large trees are the only slow path here.
    if duration > Duration::from_millis(100) {
        tracing::warn!(%method, %uri, ?duration, "slow inspector request");
    }

    tracing::debug!(
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = duration.as_millis() as u64,
        "inspector request"
    );

    response
}
