// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Allocation of forwarder names

use std::sync::atomic::{AtomicU64, Ordering};

#[allow(unused)]
use tracing::{debug, warn};

/// Hands out forwarder names `sff1`, `sff2`, ...
///
/// Names are unique for the lifetime of an allocator. An allocator is meant to be
/// shared (behind an `Arc`) by every realizer of a process.
#[derive(Debug)]
pub struct ForwarderNameAllocator {
    next: AtomicU64,
}

impl Default for ForwarderNameAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl ForwarderNameAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator whose first name will be `sff<first>`.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocate a fresh name. Returns `None` once the numbering is exhausted.
    pub fn allocate(&self) -> Option<String> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .ok()
            .map(|n| format!("sff{n}"))
    }

    /// Restart numbering at `next`.
    pub fn reset(&self, next: u64) {
        self.next.store(next, Ordering::Relaxed);
    }

    /// Make sure no future allocation yields one of `taken`. Names that were not
    /// handed out by an allocator are ignored.
    pub fn skip_taken<'a>(&self, taken: impl IntoIterator<Item = &'a str>) {
        let next = taken
            .into_iter()
            .filter_map(|name| name.strip_prefix("sff")?.parse::<u64>().ok())
            .filter_map(|n| {
                /* allocate() never hands out u64::MAX */
                let next = n.checked_add(1);
                if next.is_none() {
                    warn!("Ignoring forwarder sff{n}: out of the allocated range");
                }
                next
            })
            .max();
        if let Some(next) = next {
            self.next.fetch_max(next, Ordering::Relaxed);
        }
    }

    /// The number the next allocation will use.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
