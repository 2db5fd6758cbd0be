//! Node id allocation
//!
//! One monotonic counter per graph. Init and process construction draw from
//! the same generator so ids never collide across the two views.

use serde::{Deserialize, Serialize};

/// Monotonic node id counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdGenerator {
    next: u64,
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Next id that would be allocated
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Rebase the counter (used when merging graphs)
    pub fn set(&mut self, next: u64) {
        self.next = next;
    }
}
