// ============================================================================
// Request ID Middleware
// ============================================================================
//
// Request: `X-Request-ID: <uuid>` (optional, client may supply one)
// Response: `X-Request-ID: <uuid>` (always returned)
//
// A client-supplied id is kept when it parses as a UUID; otherwise a new v4
// id is generated. The id is stored in request extensions and attached to
// the request span, so every log line for the request carries it.
//
// ============================================================================

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    request.extensions_mut().insert(request_id);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    span.in_scope(|| tracing::debug!(status = %response.status(), "Response sent"));

    response
}
