//! Request logging middleware.
//!
//! Every request gets a correlation id; server failures log at error with
//! that id, everything else at info.

use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub async fn request_context(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(%request_id, %method, %path, "request opened");

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(%request_id, %method, %path, %status, "request failed");
    } else {
        tracing::info!(%request_id, %method, %path, %status, "request closed");
    }
    response
}
