//! Per-method handler selection.
//!
//! # Design Decisions
//! - Closed set of nine methods, one slot each
//! - Allow-list mode is an explicit flag, not a null-check on slots
//! - A method miss is reported as `None`, same as a path miss (never 405)

use axum::http;

use crate::routing::handler::SharedHandler;

/// HTTP methods that can be enabled individually on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Options,
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Connect,
    Patch,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Post,
        Method::Head,
        Method::Options,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Trace,
        Method::Connect,
    ];

    /// Map a request method onto the closed set. Extension methods map to `None`.
    pub fn from_http(method: &http::Method) -> Option<Self> {
        match method.as_str() {
            "OPTIONS" => Some(Method::Options),
            "GET" => Some(Method::Get),
            "HEAD" => Some(Method::Head),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            "TRACE" => Some(Method::Trace),
            "CONNECT" => Some(Method::Connect),
            "PATCH" => Some(Method::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Options => "OPTIONS",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
            Method::Patch => "PATCH",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handler set of one route entry.
#[derive(Clone, Default)]
pub(crate) struct MethodSlots {
    /// Serves every method while `restricted` is false.
    default: Option<SharedHandler>,
    slots: [Option<SharedHandler>; 9],
    restricted: bool,
}

impl MethodSlots {
    pub(crate) fn new(handler: SharedHandler, default_all_methods: bool) -> Self {
        let mut slots = Self::default();
        slots.reset(handler, default_all_methods);
        slots
    }

    /// Replace the default handler. Explicit method slots survive.
    pub(crate) fn reset(&mut self, handler: SharedHandler, default_all_methods: bool) {
        if default_all_methods {
            self.default = Some(handler);
        } else {
            self.default = None;
            self.restricted = true;
        }
    }

    /// Enable `method` with `handler`, switching the entry into allow-list mode.
    pub(crate) fn enable(&mut self, method: Method, handler: SharedHandler) {
        self.slots[method.index()] = Some(handler);
        self.restricted = true;
    }

    /// Drop the default handler and force allow-list mode.
    pub(crate) fn seal(&mut self) {
        self.default = None;
        self.restricted = true;
    }

    pub(crate) fn is_restricted(&self) -> bool {
        self.restricted
    }

    pub(crate) fn enabled(&self) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|m| self.slots[m.index()].is_some())
            .collect()
    }

    /// Select the handler for `method`.
    pub(crate) fn select(&self, method: &http::Method) -> Option<SharedHandler> {
        if !self.restricted {
            return self.default.clone();
        }
        Method::from_http(method).and_then(|m| self.slots[m.index()].clone())
    }
}

impl std::fmt::Debug for MethodSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSlots")
            .field("default", &self.default.is_some())
            .field("enabled", &self.enabled())
            .field("restricted", &self.restricted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use std::sync::Arc;

    fn handler() -> SharedHandler {
        Arc::new(|_req: Request<Body>| async { "ok" })
    }

    #[test]
    fn test_method_from_http() {
        assert_eq!(Method::from_http(&http::Method::GET), Some(Method::Get));
        assert_eq!(Method::from_http(&http::Method::PATCH), Some(Method::Patch));
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(Method::from_http(&purge), None);
    }

    #[test]
    fn test_default_serves_everything() {
        let slots = MethodSlots::new(handler(), true);
        assert!(!slots.is_restricted());
        for m in [http::Method::GET, http::Method::POST, http::Method::HEAD] {
            assert!(slots.select(&m).is_some());
        }
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        assert!(slots.select(&purge).is_some());
    }

    #[test]
    fn test_allow_list() {
        let h = handler();
        let mut slots = MethodSlots::new(h.clone(), true);
        slots.enable(Method::Get, h.clone());
        slots.enable(Method::Post, h);

        assert!(slots.select(&http::Method::GET).is_some());
        assert!(slots.select(&http::Method::POST).is_some());
        assert!(slots.select(&http::Method::PUT).is_none());
        assert_eq!(slots.enabled(), vec![Method::Get, Method::Post]);
    }

    #[test]
    fn test_strict_registration() {
        let slots = MethodSlots::new(handler(), false);
        assert!(slots.is_restricted());
        assert!(slots.select(&http::Method::GET).is_none());
    }

    #[test]
    fn test_seal_drops_default() {
        let mut slots = MethodSlots::new(handler(), true);
        slots.seal();
        assert!(slots.select(&http::Method::GET).is_none());
    }
}
