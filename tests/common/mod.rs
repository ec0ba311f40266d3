//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use tokio::net::TcpListener;
use tower::ServiceExt;

use http_mux::{HttpServer, Router, ServerConfig, Shutdown};

/// Build a bodiless request.
pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::from_bytes(method.as_bytes()).unwrap())
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Dispatch one request through the router's `Service` impl.
pub async fn send(router: &Router, method: &str, uri: &str) -> Response {
    router.clone().oneshot(request(method, uri)).await.unwrap()
}

/// Collect a response body as UTF-8.
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Serve `router` on an ephemeral port. Trigger the returned `Shutdown` to stop.
pub async fn start_server(router: Router) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ServerConfig::default();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let signal = shutdown.signal();
    let server = HttpServer::new(config, router);
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}
