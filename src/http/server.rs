//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Mount a `routing::Router` as the fallback service of an Axum app
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener with graceful shutdown

use axum::Router as AxumRouter;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::routing::Router;

/// HTTP server hosting one router.
pub struct HttpServer {
    app: AxumRouter,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `router`.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        let app = Self::build_app(&config, router);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, router: Router) -> AxumRouter {
        AxumRouter::new()
            .fallback_service(router)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The assembled Axum app, for in-process use.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_app_sets_request_id() {
        let router = Router::new();
        router
            .handle("/ping", |req: Request<Body>| async move {
                crate::http::request_id(&req).unwrap_or("none").to_string()
            })
            .unwrap();

        let server = HttpServer::new(ServerConfig::default(), router);
        let response = server
            .app()
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let echoed = response.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, echoed.as_bytes());
    }
}
