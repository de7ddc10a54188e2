// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::atomic::{AtomicU64, Ordering};

/// A point-in-time snapshot of a group's activity counters.
///
/// All counters are monotonic for the lifetime of the group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Stats {
    /// Calls to `get` with a non-empty key.
    pub gets: u64,
    /// Calls served straight from the local store.
    pub cache_hits: u64,
    /// Misses that went through the deduplicated load path, including coalesced callers.
    pub loads: u64,
    /// Loads that actually ran, one per coalesced batch of misses.
    pub loads_executed: u64,
    /// Values successfully fetched from a peer.
    pub peer_loads: u64,
    /// Peer fetches that failed and fell back to the getter.
    pub peer_errors: u64,
    /// Values successfully produced by the getter.
    pub local_loads: u64,
    /// Getter calls that failed.
    pub local_load_errors: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) gets: Counter,
    pub(crate) cache_hits: Counter,
    pub(crate) loads: Counter,
    pub(crate) loads_executed: Counter,
    pub(crate) peer_loads: Counter,
    pub(crate) peer_errors: Counter,
    pub(crate) local_loads: Counter,
    pub(crate) local_load_errors: Counter,
}

impl Counters {
    pub(crate) fn snapshot(&self) -> Stats {
        Stats {
            gets: self.gets.get(),
            cache_hits: self.cache_hits.get(),
            loads: self.loads.get(),
            loads_executed: self.loads_executed.get(),
            peer_loads: self.peer_loads.get(),
            peer_errors: self.peer_errors.get(),
            local_loads: self.local_loads.get(),
            local_load_errors: self.local_load_errors.get(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counter(AtomicU64);

impl Counter {
    pub(crate) fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
