//! Route table sharded by literal prefix.
//!
//! # Design Decisions
//! - `HashMap<prefix, bucket>`, bucket = `HashMap<match key, Entry>`
//! - Same prefix and key on re-registration mutates the entry in place
//! - Entries remember their registration order for tie-breaking

use std::collections::HashMap;

use crate::routing::handler::SharedHandler;
use crate::routing::method::{Method, MethodSlots};
use crate::routing::pattern::ParsedPattern;

/// One registered pattern.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) key: String,
    pub(crate) template: Vec<String>,
    pub(crate) names: Vec<String>,
    pub(crate) methods: MethodSlots,
    pub(crate) seq: u64,
}

impl Entry {
    pub(crate) fn param_count(&self) -> usize {
        self.names.len()
    }
}

/// Entries sharing one literal prefix.
#[derive(Debug, Default)]
pub(crate) struct PrefixBucket {
    pub(crate) entries: HashMap<String, Entry>,
}

/// Location of an entry inside a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EntryKey {
    pub(crate) prefix: String,
    pub(crate) key: String,
}

#[derive(Debug, Default)]
pub(crate) struct RouteTable {
    pub(crate) buckets: HashMap<String, PrefixBucket>,
    next_seq: u64,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert or update the entry for `parsed`.
    ///
    /// Returns the entry location and whether it was newly created.
    pub(crate) fn insert(
        &mut self,
        parsed: ParsedPattern,
        handler: SharedHandler,
        default_all_methods: bool,
    ) -> (EntryKey, bool) {
        let location = EntryKey {
            prefix: parsed.prefix.clone(),
            key: parsed.key.clone(),
        };
        let seq = self.next_seq;
        let bucket = self.buckets.entry(parsed.prefix).or_default();

        let created = match bucket.entries.get_mut(&parsed.key) {
            Some(entry) => {
                entry.template = parsed.template;
                entry.names = parsed.names;
                entry.methods.reset(handler, default_all_methods);
                false
            }
            None => {
                bucket.entries.insert(
                    parsed.key.clone(),
                    Entry {
                        key: parsed.key,
                        template: parsed.template,
                        names: parsed.names,
                        methods: MethodSlots::new(handler, default_all_methods),
                        seq,
                    },
                );
                true
            }
        };
        if created {
            self.next_seq += 1;
        }
        (location, created)
    }

    pub(crate) fn get(&self, location: &EntryKey) -> Option<&Entry> {
        self.buckets
            .get(&location.prefix)
            .and_then(|b| b.entries.get(&location.key))
    }

    pub(crate) fn get_mut(&mut self, location: &EntryKey) -> Option<&mut Entry> {
        self.buckets
            .get_mut(&location.prefix)
            .and_then(|b| b.entries.get_mut(&location.key))
    }

    pub(crate) fn enable(&mut self, location: &EntryKey, method: Method, handler: SharedHandler) {
        if let Some(entry) = self.get_mut(location) {
            entry.methods.enable(method, handler);
        }
    }

    pub(crate) fn seal(&mut self, location: &EntryKey) {
        if let Some(entry) = self.get_mut(location) {
            entry.methods.seal();
        }
    }

    pub(crate) fn seal_all(&mut self) {
        for bucket in self.buckets.values_mut() {
            for entry in bucket.entries.values_mut() {
                entry.methods.seal();
            }
        }
    }

    /// Total number of live entries.
    pub(crate) fn len(&self) -> usize {
        self.buckets.values().map(|b| b.entries.len()).sum()
    }
}
