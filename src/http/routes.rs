//! Route table for the introspection endpoint.
//!
//! # Responsibilities
//! - Map each data path to the provider whose snapshot it renders
//! - Answer `/` and every unmapped path with the list of data paths
//! - Delegate `/metrics` to the Prometheus handle
//!
//! # Design Decisions
//! - Routes are fixed once the router is built; exact path matching only
//! - Every method is accepted, like a plain mux
//! - Encoding failures and provider panics become a bare 500; the error
//!   detail goes to the log only

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use axum::{
    body::Bytes,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::metrics;
use crate::snapshot::{JsonSnapshot, Providers, SnapshotError, SnapshotProvider};

pub const ROOT_PATH: &str = "/";
pub const METRICS_PATH: &str = "/metrics";
pub const ENIS_PATH: &str = "/v1/enis";
pub const PODS_PATH: &str = "/v1/pods";
pub const NETWORKUTILS_ENV_PATH: &str = "/v1/networkutils-env-settings";
pub const IPAMD_ENV_PATH: &str = "/v1/ipamd-env-settings";
pub const ENI_CONFIGS_PATH: &str = "/v1/eni-configs";

/// Errors raised while assembling the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route path {0:?} must start with '/' and contain no pattern characters")]
    InvalidPath(String),

    #[error("route path {0:?} is registered twice")]
    DuplicatePath(String),

    #[error("route path {0:?} is reserved")]
    ReservedPath(String),

    #[error("failed to encode the command listing: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Body served for `/` and unknown paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    #[serde(rename = "AvailableCommands")]
    pub available_commands: Vec<String>,
}

struct Route {
    path: String,
    provider: Arc<dyn JsonSnapshot>,
}

/// Data routes in registration order.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five introspection routes the node agent serves.
    pub fn standard(providers: Providers) -> Self {
        let routes = [
            (ENIS_PATH, providers.enis),
            (PODS_PATH, providers.pods),
            (NETWORKUTILS_ENV_PATH, providers.networkutils_env),
            (IPAMD_ENV_PATH, providers.ipamd_env),
            (ENI_CONFIGS_PATH, providers.eni_configs),
        ];
        Self {
            routes: routes
                .into_iter()
                .map(|(path, provider)| Route {
                    path: path.to_string(),
                    provider,
                })
                .collect(),
        }
    }

    /// Add a data route backed by `provider`.
    pub fn register<P>(self, path: impl Into<String>, provider: P) -> Result<Self, RouteError>
    where
        P: SnapshotProvider + 'static,
    {
        self.register_shared(path, Arc::new(provider))
    }

    /// Add a data route backed by an already shared provider.
    pub fn register_shared(
        mut self,
        path: impl Into<String>,
        provider: Arc<dyn JsonSnapshot>,
    ) -> Result<Self, RouteError> {
        let path = path.into();
        if path == ROOT_PATH || path == METRICS_PATH {
            return Err(RouteError::ReservedPath(path));
        }
        if !is_literal_path(&path) {
            return Err(RouteError::InvalidPath(path));
        }
        if self.routes.iter().any(|route| route.path == path) {
            return Err(RouteError::DuplicatePath(path));
        }
        self.routes.push(Route { path, provider });
        Ok(self)
    }

    /// Registered data paths, in registration order.
    pub fn paths(&self) -> Vec<&str> {
        self.routes.iter().map(|route| route.path.as_str()).collect()
    }

    pub fn root_response(&self) -> RootResponse {
        RootResponse {
            available_commands: self.paths().into_iter().map(String::from).collect(),
        }
    }

    /// Build the axum router. The command listing is encoded here, once.
    pub fn into_router(self, metrics_handle: PrometheusHandle) -> Result<Router, RouteError> {
        let listing = Bytes::from(serde_json::to_vec(&self.root_response())?);
        let default_handler = move || {
            let body = listing.clone();
            async move { json_response(body) }
        };

        let mut router = Router::new().route(ROOT_PATH, any(default_handler.clone()));
        for Route { path, provider } in self.routes {
            let route_path = path.clone();
            router = router.route(
                &path,
                any(move || {
                    let provider = provider.clone();
                    let path = route_path.clone();
                    async move { render_snapshot(&path, provider.as_ref()) }
                }),
            );
        }

        Ok(router
            .route(
                METRICS_PATH,
                any(move || {
                    let handle = metrics_handle.clone();
                    async move { render_metrics(&handle) }
                }),
            )
            .fallback(default_handler))
    }
}

/// Only plain segments; axum would read `{}`, `*` and `:` as captures.
fn is_literal_path(path: &str) -> bool {
    path.starts_with('/')
        && !path
            .chars()
            .any(|c| matches!(c, '{' | '}' | '*' | ':') || c.is_whitespace())
}

fn json_response(body: impl Into<axum::body::Body>) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body.into(),
    )
        .into_response()
}

/// Query the provider and encode its snapshot.
fn render_snapshot(path: &str, provider: &dyn JsonSnapshot) -> Response {
    let encoded = panic::catch_unwind(AssertUnwindSafe(|| provider.to_json()))
        .unwrap_or(Err(SnapshotError::Panicked));

    match encoded {
        Ok(body) => json_response(body),
        Err(err) => {
            tracing::error!(path, error = %err, "Failed to marshal snapshot");
            metrics::record_snapshot_failure(path);
            internal_error()
        }
    }
}

fn render_metrics(handle: &PrometheusHandle) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"))],
        handle.render(),
    )
        .into_response()
}

fn internal_error() -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (status, status.canonical_reason().unwrap_or("Internal Server Error")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde::ser::Error as _;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("pod key must be a string: internal detail"))
        }
    }

    fn handle() -> PrometheusHandle {
        PrometheusBuilder::new().build_recorder().handle()
    }

    fn standard_router() -> Router {
        let providers = Providers {
            enis: Arc::new(|| json!({ "TotalIPs": 0, "AssignedIPs": 0, "ENIs": {} })),
            pods: Arc::new(BTreeMap::<String, String>::new),
            networkutils_env: Arc::new(|| json!({ "AWS_VPC_ENI_MTU": 9001 })),
            ipamd_env: Arc::new(|| json!({ "WARM_ENI_TARGET": 1 })),
            eni_configs: Arc::new(|| Unencodable),
        };
        RouteTable::standard(providers).into_router(handle()).unwrap()
    }

    async fn call(router: &Router, method: Method, uri: &str) -> (StatusCode, Option<String>, Bytes) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body)
    }

    fn expected_listing() -> Value {
        json!({
            "AvailableCommands": [
                "/v1/enis",
                "/v1/pods",
                "/v1/networkutils-env-settings",
                "/v1/ipamd-env-settings",
                "/v1/eni-configs",
            ]
        })
    }

    #[tokio::test]
    async fn root_and_unknown_paths_list_data_routes() {
        let router = standard_router();
        for (method, uri) in [
            (Method::GET, "/"),
            (Method::GET, "/nonexistent"),
            (Method::POST, "/"),
            (Method::GET, "/v1/enis/extra?q=1"),
        ] {
            let (status, content_type, body) = call(&router, method, uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(content_type.as_deref(), Some("application/json"));
            assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), expected_listing());
        }
    }

    #[tokio::test]
    async fn data_route_returns_provider_value() {
        let router = standard_router();

        let (status, _, body) = call(&router, Method::GET, "/v1/enis").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({ "TotalIPs": 0, "AssignedIPs": 0, "ENIs": {} })
        );

        let (status, _, body) = call(&router, Method::GET, "/v1/pods").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"{}");
    }

    #[tokio::test]
    async fn encode_failure_hides_error_detail() {
        let router = standard_router();
        let (status, content_type, body) = call(&router, Method::GET, "/v1/eni-configs").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert_eq!(&body[..], b"Internal Server Error");
    }

    #[tokio::test]
    async fn provider_panic_becomes_internal_error() {
        let router = RouteTable::new()
            .register("/v1/broken", || -> Value { panic!("datastore poisoned") })
            .unwrap()
            .into_router(handle())
            .unwrap();

        let (status, _, body) = call(&router, Method::GET, "/v1/broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&body[..], b"Internal Server Error");
    }

    #[tokio::test]
    async fn metrics_route_is_served_but_not_listed() {
        let router = standard_router();
        let (status, content_type, _) = call(&router, Method::GET, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/plain"));

        let (_, _, body) = call(&router, Method::GET, "/").await;
        let listing: RootResponse = serde_json::from_slice(&body).unwrap();
        assert!(!listing.available_commands.iter().any(|path| path == METRICS_PATH));
    }

    #[tokio::test]
    async fn listing_tracks_custom_registrations() {
        let table = RouteTable::new()
            .register("/v2/b", || 2)
            .unwrap()
            .register("/v2/a", || 1)
            .unwrap();
        assert_eq!(table.paths(), vec!["/v2/b", "/v2/a"]);

        let router = table.into_router(handle()).unwrap();
        let (_, _, body) = call(&router, Method::GET, "/anything").await;
        assert_eq!(
            serde_json::from_slice::<RootResponse>(&body).unwrap().available_commands,
            vec!["/v2/b".to_string(), "/v2/a".to_string()]
        );
    }

    #[test]
    fn registration_rejects_bad_paths() {
        let err = RouteTable::new().register("v1/enis", || 0).err().unwrap();
        assert!(matches!(err, RouteError::InvalidPath(_)));

        let err = RouteTable::new().register("/v1/{id}", || 0).err().unwrap();
        assert!(matches!(err, RouteError::InvalidPath(_)));

        let err = RouteTable::new().register(METRICS_PATH, || 0).err().unwrap();
        assert!(matches!(err, RouteError::ReservedPath(_)));

        let err = RouteTable::new()
            .register("/v1/enis", || 0)
            .unwrap()
            .register("/v1/enis", || 1)
            .err()
            .unwrap();
        assert!(matches!(err, RouteError::DuplicatePath(_)));
    }
}
