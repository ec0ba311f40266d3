//! Route matching logic.
//!
//! # Responsibilities
//! - Find buckets whose literal prefix starts the request path
//! - Compare the remainder's shape against each entry's template
//! - Pick a single winner deterministically
//! - Extract parameter values for the winner
//!
//! # Design Decisions
//! - Prefix match is a plain string prefix, case-sensitive
//! - An empty remainder only matches an entry with an empty template
//! - Parameter segments never match an empty path segment
//! - Tie-break: fewest parameters, then longest prefix, then registration order

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::routing::pattern::{shape_key, SEPARATOR};
use crate::routing::table::{Entry, EntryKey, RouteTable};

/// Extracted path parameters, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pairs: Vec<(String, String)>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.pairs.into_iter().collect()
    }

    fn push(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_string(), value.to_string()));
    }
}

/// A matched entry and the parameters extracted for it.
#[derive(Debug)]
pub(crate) struct Match<'t> {
    pub(crate) location: EntryKey,
    pub(crate) entry: &'t Entry,
    pub(crate) params: PathParams,
}

/// Find the best entry for an already normalized `path`.
pub(crate) fn find<'t>(table: &'t RouteTable, path: &str) -> Option<Match<'t>> {
    let mut best: Option<(&'t str, &'t Entry, Vec<&str>)> = None;

    for (prefix, bucket) in &table.buckets {
        let Some(remainder) = path.strip_prefix(prefix.as_str()) else {
            continue;
        };
        let segments: Vec<&str> = if remainder.is_empty() {
            Vec::new()
        } else {
            remainder.split(SEPARATOR).collect()
        };

        for entry in bucket.entries.values() {
            if !matches_shape(entry, &segments) {
                continue;
            }
            let better = match &best {
                None => true,
                Some((best_prefix, best_entry, _)) => {
                    rank(prefix, entry) < rank(best_prefix, best_entry)
                }
            };
            if better {
                best = Some((prefix.as_str(), entry, segments.clone()));
            }
        }
    }

    best.map(|(prefix, entry, segments)| Match {
        location: EntryKey {
            prefix: prefix.to_string(),
            key: entry.key.clone(),
        },
        params: extract(entry, &segments),
        entry,
    })
}

fn matches_shape(entry: &Entry, segments: &[&str]) -> bool {
    if segments.len() != entry.template.len() {
        return false;
    }
    if segments.is_empty() {
        return entry.key.is_empty();
    }
    shape_key(segments, &entry.template).is_some_and(|key| key == entry.key)
}

fn rank(prefix: &str, entry: &Entry) -> (usize, Reverse<usize>, u64) {
    (entry.param_count(), Reverse(prefix.len()), entry.seq)
}

fn extract(entry: &Entry, segments: &[&str]) -> PathParams {
    let mut params = PathParams::new();
    for (name, value) in entry.template.iter().zip(segments) {
        if !name.is_empty() {
            params.push(name, value);
        }
    }
    params
}
