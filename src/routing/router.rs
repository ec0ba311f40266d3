//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Register patterns, middleware, not-found and recovery handlers
//! - Build and publish nested groups
//! - Resolve a request to a handler: local table first, then groups
//! - Run the middleware chain and the handler outside of any lock
//!
//! # Design Decisions
//! - One `RwLock` per router; reads for matching, writes for registration
//! - The lock only covers resolution, never the handler call
//! - A method miss falls through exactly like a path miss
//! - Groups snapshot the parent's middleware when published

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::convert::Infallible;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::Service;

use crate::error::{MuxError, MuxResult};
use crate::http::response;
use crate::observability::metrics::{self, Outcome};
use crate::routing::entry::EntryHandle;
use crate::routing::handler::{
    panic_message, Recovered, ResponseSink, SharedHandler, SharedMiddleware, SharedRecovery,
};
use crate::routing::matcher::{self, PathParams};
use crate::routing::pattern::{normalize, parse};
use crate::routing::table::RouteTable;

/// An HTTP request router. Cheap to clone; clones share the same table.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RwLock<RouterState>>,
}

pub(crate) struct RouterState {
    /// Group context prepended to every registered pattern.
    scope: String,
    pub(crate) table: RouteTable,
    middleware: Arc<Vec<SharedMiddleware>>,
    not_found: Option<SharedHandler>,
    recovery: Option<SharedRecovery>,
    groups: Vec<Group>,
}

struct Group {
    prefix: String,
    router: Router,
}

/// Everything needed to serve a request once the lock is released.
struct Resolved {
    handler: SharedHandler,
    middleware: Arc<Vec<SharedMiddleware>>,
    recovery: Option<SharedRecovery>,
    params: PathParams,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::scoped(String::new())
    }

    fn scoped(scope: String) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RouterState {
                scope,
                table: RouteTable::new(),
                middleware: Arc::new(Vec::new()),
                not_found: None,
                recovery: None,
                groups: Vec::new(),
            })),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RouterState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RouterState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Prefix every pattern registered on this router is qualified with.
    pub fn scope(&self) -> String {
        self.read().scope.clone()
    }

    /// Number of entries in this router's own table (groups excluded).
    pub fn route_count(&self) -> usize {
        self.read().table.len()
    }

    /// Normalized prefixes of the child groups, in registration order.
    pub fn group_prefixes(&self) -> Vec<String> {
        self.read().groups.iter().map(|g| g.prefix.clone()).collect()
    }

    /// Register a handler that serves every method until a method is enabled.
    ///
    /// ```ignore
    /// router.handle("/users/:id", show_user)?.get().head();
    /// ```
    pub fn handle<F, Fut, R>(&self, pattern: &str, handler: F) -> MuxResult<EntryHandle>
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.register(pattern, Arc::new(handler), true)
    }

    /// Register a handler that serves nothing until methods are enabled.
    pub fn handle_strict<F, Fut, R>(&self, pattern: &str, handler: F) -> MuxResult<EntryHandle>
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.register(pattern, Arc::new(handler), false)
    }

    fn register(
        &self,
        pattern: &str,
        handler: SharedHandler,
        default_all_methods: bool,
    ) -> MuxResult<EntryHandle> {
        let mut state = self.write();
        let full = normalize(&format!("{}{}", state.scope, pattern));
        let parsed = parse(&full)?;
        let (location, created) = state.table.insert(parsed, handler.clone(), default_all_methods);
        drop(state);

        tracing::debug!(
            pattern = %full,
            prefix = %location.prefix,
            key = %location.key,
            created,
            "Route registered"
        );
        metrics::record_route_registered(created);

        Ok(EntryHandle::new(self.clone(), location, handler))
    }

    /// Append a middleware. Groups published earlier are not affected.
    pub fn use_middleware<F>(&self, middleware: F)
    where
        F: Fn(&mut Request<Body>, &mut ResponseSink) + Send + Sync + 'static,
    {
        let mut state = self.write();
        Arc::make_mut(&mut state.middleware).push(Arc::new(middleware));
    }

    /// Set the not-found handler. The last registration wins.
    pub fn not_found<F, Fut, R>(&self, handler: F)
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.write().not_found = Some(Arc::new(handler));
    }

    /// Set the panic recovery handler.
    ///
    /// Without one, a panic in middleware or a handler propagates to the host.
    pub fn recovery<F, R>(&self, handler: F)
    where
        F: Fn(Recovered) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.write().recovery = Some(Arc::new(handler));
    }

    /// Build a sub-router under `prefix` and publish it.
    ///
    /// `build` runs before the group is visible to dispatch. The group
    /// receives a copy of this router's middleware as it stands at publish
    /// time, followed by whatever `build` registered on the group itself.
    pub fn group<F>(&self, prefix: &str, build: F) -> MuxResult<()>
    where
        F: FnOnce(&Router) -> MuxResult<()>,
    {
        let prefix = normalize(prefix);
        let (scope, inherited, recovery) = {
            let state = self.read();
            if state.groups.iter().any(|g| g.prefix == prefix) {
                return Err(MuxError::GroupAlreadyExists(prefix));
            }
            (
                normalize(&format!("{}{}", state.scope, prefix)),
                state.middleware.clone(),
                state.recovery.clone(),
            )
        };

        // Groups nested inside `build` copy this chain when they publish.
        let child = Router::scoped(scope);
        {
            let mut child_state = child.write();
            child_state.middleware = inherited.clone();
            child_state.recovery = recovery;
        }
        build(&child)?;

        let mut state = self.write();
        if state.groups.iter().any(|g| g.prefix == prefix) {
            return Err(MuxError::GroupAlreadyExists(prefix));
        }
        {
            let mut child_state = child.write();
            let own = child_state.middleware.get(inherited.len()..).unwrap_or_default();
            let mut chain: Vec<SharedMiddleware> = Vec::clone(&state.middleware);
            chain.extend(own.iter().cloned());
            child_state.middleware = Arc::new(chain);
            if child_state.recovery.is_none() {
                child_state.recovery = state.recovery.clone();
            }
            tracing::debug!(
                group = %prefix,
                scope = %child_state.scope,
                routes = child_state.table.len(),
                middleware = child_state.middleware.len(),
                "Group published"
            );
        }
        state.groups.push(Group {
            prefix,
            router: child,
        });
        Ok(())
    }

    /// Seal every entry of this router and of all its groups.
    pub fn seal_all(&self) {
        let groups = {
            let mut state = self.write();
            state.table.seal_all();
            self.children(&state)
        };
        for group in groups {
            group.seal_all();
        }
    }

    fn children(&self, state: &RouterState) -> Vec<Router> {
        state.groups.iter().map(|g| g.router.clone()).collect()
    }

    /// Parameters of the route `req` would be served by; empty if none.
    ///
    /// Resolution honors the request method, so a path whose entry does not
    /// serve that method yields an empty map.
    pub fn params(&self, req: &Request<Body>) -> PathParams {
        let path = normalize(req.uri().path());
        match self.resolve_guarded(req.method(), &path) {
            Ok(Some(resolved)) => resolved.params,
            _ => PathParams::new(),
        }
    }

    fn resolve(&self, method: &Method, path: &str) -> Option<Resolved> {
        let groups = {
            let state = self.read();
            if let Some(found) = matcher::find(&state.table, path) {
                if let Some(handler) = found.entry.methods.select(method) {
                    return Some(Resolved {
                        handler,
                        middleware: state.middleware.clone(),
                        recovery: state.recovery.clone(),
                        params: found.params,
                    });
                }
                tracing::debug!(
                    method = %method,
                    path = %path,
                    prefix = %found.location.prefix,
                    "Method not enabled on matched entry"
                );
            }
            self.children(&state)
        };
        groups.iter().find_map(|g| g.resolve(method, path))
    }

    fn resolve_guarded(&self, method: &Method, path: &str) -> MuxResult<Option<Resolved>> {
        match_guard(|| self.resolve(method, path))
    }

    /// Serve `req`: local table, then groups, then the not-found path.
    pub async fn dispatch(&self, req: Request<Body>) -> Response {
        let start = Instant::now();
        let method = req.method().clone();
        let path = normalize(req.uri().path());

        let (outcome, response) = match self.resolve_guarded(&method, &path) {
            Ok(Some(resolved)) => (Outcome::Served, resolved.serve(req).await),
            Ok(None) => {
                tracing::warn!(method = %method, path = %path, "No route matched");
                (Outcome::NotFound, self.serve_not_found(req).await)
            }
            Err(err) => {
                tracing::warn!(method = %method, path = %path, error = %err, "Match failed");
                (Outcome::Fault, fault_response(&err))
            }
        };

        metrics::record_dispatch(method.as_str(), outcome, start);
        response
    }

    async fn serve_not_found(&self, req: Request<Body>) -> Response {
        let handler = self.read().not_found.clone();
        match handler {
            Some(handler) => handler.call(req).await,
            None => response::not_found(req.uri()),
        }
    }
}

impl Resolved {
    async fn serve(self, mut req: Request<Body>) -> Response {
        req.extensions_mut().insert(self.params);
        let Some(recovery) = self.recovery else {
            return run_chain(self.handler, self.middleware, req).await;
        };

        let method = req.method().clone();
        let uri = req.uri().clone();
        match AssertUnwindSafe(run_chain(self.handler, self.middleware, req))
            .catch_unwind()
            .await
        {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(method = %method, uri = %uri, panic = %message, "Handler panicked");
                recovery.recover(Recovered {
                    method,
                    uri,
                    message,
                })
            }
        }
    }
}

/// Run a matching step, turning a panic into `InternalMatchFault`.
fn match_guard<T>(step: impl FnOnce() -> T) -> MuxResult<T> {
    std::panic::catch_unwind(AssertUnwindSafe(step))
        .map_err(|payload| MuxError::InternalMatchFault(panic_message(payload.as_ref())))
}

/// Response sent when matching itself faulted.
fn fault_response(err: &MuxError) -> Response {
    response::bad_request(&err.to_string())
}

async fn run_chain(
    handler: SharedHandler,
    middleware: Arc<Vec<SharedMiddleware>>,
    mut req: Request<Body>,
) -> Response {
    let mut sink = ResponseSink::new();
    for m in middleware.iter() {
        m.call(&mut req, &mut sink);
    }
    let mut response = handler.call(req).await;
    sink.apply(&mut response);
    response
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Router")
            .field("scope", &state.scope)
            .field("routes", &state.table.len())
            .field("middleware", &state.middleware.len())
            .field("groups", &state.groups.iter().map(|g| &g.prefix).collect::<Vec<_>>())
            .finish()
    }
}

impl Service<Request<Body>> for Router {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let router = self.clone();
        Box::pin(async move { Ok(router.dispatch(req).await) })
    }
}
