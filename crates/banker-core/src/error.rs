//! Error types for allocator construction and operation.

use alloc::string::String;
use thiserror::Error;

use crate::types::{ProcessId, ResourceId, Units};

/// Construction-time misconfiguration.
///
/// Every variant is fatal for the instance being built: no allocator exists
/// to retry against.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `process_count` or `resource_count` is zero or negative
    #[error("invalid configuration: {field} must be positive, got {value}")]
    NonPositiveCount { field: &'static str, value: i64 },

    /// A `total_units` entry is negative
    #[error("invalid configuration: total units of resource {resource} is negative ({value})")]
    NegativeTotal { resource: usize, value: i64 },

    /// A `max_claim` entry is negative
    #[error("invalid configuration: max claim of process {process} on resource {resource} is negative ({value})")]
    NegativeClaim {
        process: usize,
        resource: usize,
        value: i64,
    },

    /// A vector or matrix row does not match the declared counts
    #[error("invalid configuration: {field} has {actual} entries, expected {expected}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The configuration document could not be decoded
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Rejection of a single `request` or `release`.
///
/// Validation precedes mutation, so state is unchanged whenever one of these
/// is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AllocError {
    /// Process or resource index out of range
    #[error("invalid process or resource number ({process}, {resource})")]
    InvalidIndex {
        process: ProcessId,
        resource: ResourceId,
    },

    /// More units requested than are currently free
    #[error("units requested ({requested}) exceed units available ({available})")]
    InsufficientAvailable { requested: Units, available: Units },

    /// The request would push the allocation past the process's maximum claim
    #[error("maximum claim exceeded: holds {held}, requested {requested}, claim {max_claim}")]
    ClaimExceeded {
        requested: Units,
        held: Units,
        max_claim: Units,
    },

    /// More units released than the process holds
    #[error("units to release ({requested}) exceed current allocation ({held})")]
    ExceedsAllocation { requested: Units, held: Units },

    /// Granting would leave the system in an unsafe state; rolled back
    #[error("request denied: unsafe state")]
    DeniedUnsafe,
}
