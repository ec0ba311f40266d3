//! Method-enabling builder returned by route registration.

use crate::routing::handler::SharedHandler;
use crate::routing::method::Method;
use crate::routing::router::Router;
use crate::routing::table::EntryKey;

/// Handle to a registered entry.
///
/// Each call takes the owning router's write lock, so chaining is safe while
/// requests are being served. Enabling a method binds the handler this handle
/// was registered with and switches the entry into allow-list mode.
pub struct EntryHandle {
    router: Router,
    location: EntryKey,
    handler: SharedHandler,
}

impl EntryHandle {
    pub(crate) fn new(router: Router, location: EntryKey, handler: SharedHandler) -> Self {
        Self {
            router,
            location,
            handler,
        }
    }

    /// Enable a single method.
    pub fn method(&self, method: Method) -> &Self {
        self.router
            .write()
            .table
            .enable(&self.location, method, self.handler.clone());
        self
    }

    pub fn get(&self) -> &Self {
        self.method(Method::Get)
    }

    pub fn post(&self) -> &Self {
        self.method(Method::Post)
    }

    pub fn put(&self) -> &Self {
        self.method(Method::Put)
    }

    pub fn delete(&self) -> &Self {
        self.method(Method::Delete)
    }

    pub fn patch(&self) -> &Self {
        self.method(Method::Patch)
    }

    pub fn head(&self) -> &Self {
        self.method(Method::Head)
    }

    pub fn options(&self) -> &Self {
        self.method(Method::Options)
    }

    pub fn trace(&self) -> &Self {
        self.method(Method::Trace)
    }

    pub fn connect(&self) -> &Self {
        self.method(Method::Connect)
    }

    /// Enable all nine methods and seal; extension methods stay unserved.
    pub fn all(&self) -> &Self {
        {
            let mut state = self.router.write();
            for method in Method::ALL {
                state.table.enable(&self.location, method, self.handler.clone());
            }
            state.table.seal(&self.location);
        }
        self
    }

    /// Drop the any-method default; only enabled methods are served from now on.
    pub fn seal(&self) -> &Self {
        self.router.write().table.seal(&self.location);
        self
    }

    /// Literal prefix the entry is sharded under.
    pub fn prefix(&self) -> &str {
        &self.location.prefix
    }

    /// Shape key of the entry.
    pub fn key(&self) -> &str {
        &self.location.key
    }

    /// Methods currently enabled on the entry.
    pub fn methods(&self) -> Vec<Method> {
        self.router
            .read()
            .table
            .get(&self.location)
            .map(|entry| entry.methods.enabled())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for EntryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryHandle")
            .field("prefix", &self.location.prefix)
            .field("key", &self.location.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaining_enables_methods() {
        let router = Router::new();
        let entry = router
            .handle("/hello/:key/world/:value", |_req| async { "ok" })
            .unwrap();
        entry.get().post().put().delete();

        assert_eq!(entry.prefix(), "/hello/");
        assert_eq!(entry.key(), ":/world/:");
        assert_eq!(
            entry.methods(),
            vec![Method::Get, Method::Post, Method::Put, Method::Delete]
        );
    }

    #[test]
    fn test_all_enables_every_method() {
        let router = Router::new();
        let entry = router.handle("/hello", |_req| async { "ok" }).unwrap();
        entry.all();
        assert_eq!(entry.methods().len(), Method::ALL.len());
    }
}
