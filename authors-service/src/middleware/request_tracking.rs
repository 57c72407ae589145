//! Request tracking middleware
//!
//! Generates a UUID request id when the caller did not send one, echoes it
//! on the response and keeps credential headers out of trace output.

use http::HeaderName;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

/// Header used when the configured name is not a valid header name
pub const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

/// Sensitive headers that should be masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Resolve the configured request id header name
pub fn request_id_header(configured: &str) -> HeaderName {
    HeaderName::try_from(configured.to_ascii_lowercase()).unwrap_or_else(|_| {
        tracing::warn!(
            "Invalid request id header '{}', using {}",
            configured,
            DEFAULT_REQUEST_ID_HEADER
        );
        HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER)
    })
}

/// Create a request ID layer that fills in missing ids with UUIDv4 values
pub fn request_id_layer(header: HeaderName) -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(header, MakeRequestUuid)
}

/// Create a request ID propagation layer
pub fn request_id_propagation_layer(header: HeaderName) -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(header)
}

/// Create a sensitive headers layer
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    let headers = SENSITIVE_HEADERS
        .iter()
        .map(|h| HeaderName::from_static(*h))
        .collect::<Vec<_>>();

    SetSensitiveRequestHeadersLayer::new(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app(header: &str) -> Router {
        let header = request_id_header(header);
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(sensitive_headers_layer())
            .layer(request_id_propagation_layer(header.clone()))
            .layer(request_id_layer(header))
    }

    #[test]
    fn test_request_id_header_fallback() {
        assert_eq!(request_id_header("X-Correlation-Id"), "x-correlation-id");
        assert_eq!(request_id_header("bad header"), DEFAULT_REQUEST_ID_HEADER);
    }

    #[test]
    fn test_sensitive_headers_constant() {
        assert!(SENSITIVE_HEADERS.contains(&"authorization"));
        assert!(SENSITIVE_HEADERS.contains(&"x-api-key"));
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = app("x-request-id")
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn test_keeps_caller_request_id() {
        let response = app("x-trace")
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-trace", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-trace"], "abc-123");
    }
}
