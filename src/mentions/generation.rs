// SPDX-License-Identifier: MPL-2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter shared between an owner and its in-flight work.
///
/// Each request takes a [`Ticket`]; advancing the generation makes every
/// earlier ticket stale, so late results can be dropped instead of applied.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate all outstanding tickets and hand out a fresh one.
    pub fn advance(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn current(&self) -> Ticket {
        Ticket(self.0.load(Ordering::Acquire))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current() == ticket
    }
}
