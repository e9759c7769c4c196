//! Request logging middleware.
//!
//! Logs every request before it reaches the route table, then hands the
//! request on untouched.

use std::net::SocketAddr;
use std::time::Instant;
use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;

/// Emit one log record per request, then run the wrapped handler once.
pub async fn log_request(request: Request, next: Next) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!(
        method = %request.method(),
        from = %remote,
        uri = %request.uri(),
        "Handling http request"
    );

    let method = request.method().to_string();
    let start = Instant::now();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn counting_router(calls: Arc<AtomicUsize>, status: StatusCode) -> Router {
        Router::new()
            .route(
                "/v1/enis",
                get(move || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        (status, "enis")
                    }
                }),
            )
            .layer(middleware::from_fn(log_request))
    }

    #[tokio::test]
    async fn wrapped_handler_runs_exactly_once() {
        for status in [StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR] {
            let calls = Arc::new(AtomicUsize::new(0));
            let app = counting_router(calls.clone(), status);

            let request = axum::http::Request::builder().uri("/v1/enis?verbose=1").body(Body::empty()).unwrap();
            let response = app.oneshot(request).await.unwrap();

            assert_eq!(response.status(), status);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn remote_address_is_optional() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_router(calls.clone(), StatusCode::OK);

        let mut request = axum::http::Request::builder().uri("/v1/enis").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("10.1.2.3:4567".parse::<SocketAddr>().unwrap()));
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = axum::http::Request::builder().uri("/v1/enis").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unmatched_requests_are_still_passed_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_router(calls.clone(), StatusCode::OK);

        let request = axum::http::Request::builder().uri("/elsewhere").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
