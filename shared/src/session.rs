//! Load generation tracking
//!
//! Every view load takes a ticket from its view's counter. A response is only
//! applied if its ticket is still the newest one for that view, so a slow,
//! older load can never overwrite the result of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::View;

/// Ticket handed out when a load starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub view: View,
    pub generation: u64,
}

/// Monotonic generation counters, one per view
#[derive(Debug, Default)]
pub struct LoadTracker {
    generations: [AtomicU64; 4],
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load for `view`, superseding any in-flight load of that view
    pub fn begin(&self, view: View) -> LoadTicket {
        let generation = self.generations[view.index()].fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket { view, generation }
    }

    /// Whether the response for `ticket` may still be rendered
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.generations[ticket.view.index()].load(Ordering::SeqCst) == ticket.generation
    }

    pub fn current(&self, view: View) -> u64 {
        self.generations[view.index()].load(Ordering::SeqCst)
    }
}
