//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     pattern
//!     → pattern.rs (normalize, split into prefix / shape key / template)
//!     → table.rs (bucket by prefix, entry by shape key)
//!     → entry.rs (enable methods, seal)
//!
//! Incoming Request (method, path)
//!     → router.rs (dispatch entry point)
//!     → matcher.rs (best entry for the path + parameters)
//!     → method.rs (handler for the method, or fall through)
//!     → groups, in registration order, on a miss
//!     → middleware chain, then handler
//!     → not-found handler or plain 404 when nothing matched
//! ```
//!
//! # Design Decisions
//! - Table is mutable at runtime, guarded by one RwLock per router
//! - No regex in hot path (prefix + segment shape only)
//! - Deterministic: same table and input always select the same entry
//! - Method mismatch and path mismatch share one fallback path

pub mod entry;
pub mod handler;
pub mod matcher;
pub mod method;
pub mod pattern;
pub mod router;
pub(crate) mod table;

pub use entry::EntryHandle;
pub use handler::{default_recovery, Handler, Middleware, Recovered, RecoveryHandler, ResponseSink};
pub use matcher::PathParams;
pub use method::Method;
pub use router::Router;
