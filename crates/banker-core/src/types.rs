//! Core allocator types
//!
//! This module contains the fundamental types shared by both allocators.
//! All types here are pure data.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Resource units. Always non-negative inside the state.
pub type Units = u64;

/// Process index, `0..process_count`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub usize);

/// Resource index, `0..resource_count`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub usize);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Result of running an admission policy's check over a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Every process can be reduced in some order
    Safe,
    /// The safety algorithm could not reduce every process
    Unsafe,
    /// Every process is blocked on the currently available units
    Deadlocked,
    /// Not deadlocked; safety was not evaluated
    Inconclusive,
}

impl Verdict {
    /// Whether this verdict reports a deadlock.
    pub fn is_deadlocked(&self) -> bool {
        matches!(self, Verdict::Deadlocked)
    }
}

/// A request that was committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grant {
    /// Committed, nothing to report
    Granted,
    /// Committed, and the resulting state is deadlocked (shadow only)
    GrantedDeadlocked,
}

/// A committed change to allocator state.
///
/// Rejected commands, including requests rolled back by the safety check,
/// never produce a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Units moved from `available` into `allocation`
    Allocated {
        process: ProcessId,
        resource: ResourceId,
        units: Units,
    },
    /// Units moved from `allocation` back into `available`
    Released {
        process: ProcessId,
        resource: ResourceId,
        units: Units,
    },
}
