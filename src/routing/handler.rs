//! Handler, middleware and recovery contracts.
//!
//! # Responsibilities
//! - Type-erase user handlers into `Arc<dyn Handler>`
//! - Define the middleware hook and its response sink
//! - Define the panic recovery hook

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A request handler.
///
/// Implemented for every `Fn(Request<Body>) -> impl Future<Output = impl IntoResponse>`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        let fut = (self)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

pub(crate) type SharedHandler = Arc<dyn Handler>;

/// Headers staged by middleware for the eventual response.
#[derive(Debug, Default)]
pub struct ResponseSink {
    headers: HeaderMap,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Apply staged headers to `response`. Headers the handler already set win.
    pub(crate) fn apply(self, response: &mut Response) {
        let target = response.headers_mut();
        let handler_set: Vec<HeaderName> = target.keys().cloned().collect();
        let mut current = None;
        for (name, value) in self.headers {
            if let Some(name) = name {
                current = Some(name);
            }
            let Some(name) = current.as_ref() else {
                continue;
            };
            if !handler_set.contains(name) {
                target.append(name.clone(), value);
            }
        }
    }
}

/// A pre-handler hook. Runs for its side effects only.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: &mut Request<Body>, sink: &mut ResponseSink);
}

impl<F> Middleware for F
where
    F: Fn(&mut Request<Body>, &mut ResponseSink) + Send + Sync + 'static,
{
    fn call(&self, req: &mut Request<Body>, sink: &mut ResponseSink) {
        (self)(req, sink)
    }
}

pub(crate) type SharedMiddleware = Arc<dyn Middleware>;

/// What a recovery handler learns about a panicked request.
#[derive(Debug, Clone)]
pub struct Recovered {
    pub method: Method,
    pub uri: Uri,
    /// Panic payload rendered as text.
    pub message: String,
}

/// Converts a panic raised by middleware or a handler into a response.
pub trait RecoveryHandler: Send + Sync + 'static {
    fn recover(&self, recovered: Recovered) -> Response;
}

impl<F, R> RecoveryHandler for F
where
    F: Fn(Recovered) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    fn recover(&self, recovered: Recovered) -> Response {
        (self)(recovered).into_response()
    }
}

pub(crate) type SharedRecovery = Arc<dyn RecoveryHandler>;

/// Stock recovery handler: plain-text 500 carrying the panic message.
pub fn default_recovery(recovered: Recovered) -> Response {
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("500 Internal Server Error : {}\n", recovered.message),
    )
        .into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

/// Render a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
