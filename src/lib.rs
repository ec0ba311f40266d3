//! HTTP request multiplexer.
//!
//! Routes a request by method and path to a registered handler, extracts
//! `:name` path parameters, and runs a middleware chain before the handler.
//! Sub-routers (groups) are searched after the local table, and a not-found
//! handler catches whatever is left.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use error::{MuxError, MuxResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{EntryHandle, Method, PathParams, Router};
