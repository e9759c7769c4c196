//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use ipamd_introspect::config::IntrospectConfig;
use ipamd_introspect::http::{IntrospectionServer, RouteTable};

/// Config bound to `addr` with a backoff short enough for tests.
pub fn test_config(addr: SocketAddr) -> IntrospectConfig {
    let mut config = IntrospectConfig::default();
    config.server.bind_address = addr.to_string();
    config.backoff.initial_delay_ms = 50;
    config.backoff.max_delay_ms = 200;
    config.backoff.jitter = 0.0;
    config
}

/// Prometheus handle that is not installed globally.
pub fn local_metrics() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

pub fn build_server(addr: SocketAddr, routes: RouteTable) -> IntrospectionServer {
    IntrospectionServer::new(&test_config(addr), routes, local_metrics()).unwrap()
}

/// Client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

/// Poll `url` until it answers or `deadline` passes.
pub async fn wait_until_serving(client: &reqwest::Client, url: &str, deadline: Duration) -> bool {
    let start = tokio::time::Instant::now();
    while start.elapsed() < deadline {
        if client.get(url).send().await.is_ok() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}
