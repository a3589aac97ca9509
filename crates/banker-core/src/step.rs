//! Pure step function - the command interface of an allocator
//!
//! This module contains `step(allocator, command) -> StepResult`, the single
//! entry point an external driver feeds `request`/`release` events through.
//!
//! # Design
//!
//! The step function takes:
//! - An allocator (any admission policy)
//! - A command carrying the raw signed `(process, resource, units)` triple a
//!   caller parsed
//!
//! And returns:
//! - The outcome, from a closed set
//! - The list of committed mutations (for the audit log)
//!
//! Raw inputs are range-checked here: a negative index is `InvalidIndex`,
//! negative units are `InvalidAmount`. Neither is ever coerced into a
//! release or a no-op.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::allocator::Allocator;
use crate::error::AllocError;
use crate::types::{Grant, Mutation, ProcessId, ResourceId, Units};
use crate::verify::AdmissionPolicy;

// ============================================================================
// Commands
// ============================================================================

/// Command variants - every event a driver can submit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Request units of a resource for a process
    Request {
        process: i64,
        resource: i64,
        units: i64,
    },
    /// Release units of a resource held by a process
    Release {
        process: i64,
        resource: i64,
        units: i64,
    },
}

impl Command {
    /// Shorthand for `Command::Request`
    pub fn request(process: i64, resource: i64, units: i64) -> Self {
        Command::Request {
            process,
            resource,
            units,
        }
    }

    /// Shorthand for `Command::Release`
    pub fn release(process: i64, resource: i64, units: i64) -> Self {
        Command::Release {
            process,
            resource,
            units,
        }
    }

    /// The raw `(process, resource, units)` triple
    pub fn triple(&self) -> (i64, i64, i64) {
        match *self {
            Command::Request {
                process,
                resource,
                units,
            }
            | Command::Release {
                process,
                resource,
                units,
            } => (process, resource, units),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p, r, u) = self.triple();
        match self {
            Command::Request { .. } => write!(f, "request({},{},{})", p, r, u),
            Command::Release { .. } => write!(f, "release({},{},{})", p, r, u),
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Outcome of a command - the closed set a driver reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Request committed
    Granted,
    /// Request committed; the resulting state is deadlocked (shadow only)
    GrantedDeadlocked,
    /// Request rolled back: it would have left the state unsafe (safe only)
    DeniedUnsafe,
    /// Release committed
    Released,
    /// Process or resource index out of range (or negative)
    InvalidIndex,
    /// Negative units
    InvalidAmount,
    /// More units requested than available
    InsufficientAvailable,
    /// Request would exceed the process's maximum claim
    ClaimExceeded,
    /// More units released than held
    ExceedsAllocation,
}

impl Outcome {
    /// Whether the command changed state (or was an admitted no-op).
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            Outcome::Granted | Outcome::GrantedDeadlocked | Outcome::Released
        )
    }

    /// Numeric code, non-negative on success.
    pub fn code(&self) -> i64 {
        match self {
            Outcome::Granted => 0,
            Outcome::Released => 1,
            Outcome::GrantedDeadlocked => 2,
            Outcome::DeniedUnsafe => -1,
            Outcome::InvalidIndex => -2,
            Outcome::InvalidAmount => -3,
            Outcome::InsufficientAvailable => -4,
            Outcome::ClaimExceeded => -5,
            Outcome::ExceedsAllocation => -6,
        }
    }
}

impl From<Grant> for Outcome {
    fn from(grant: Grant) -> Self {
        match grant {
            Grant::Granted => Outcome::Granted,
            Grant::GrantedDeadlocked => Outcome::GrantedDeadlocked,
        }
    }
}

impl From<AllocError> for Outcome {
    fn from(e: AllocError) -> Self {
        match e {
            AllocError::InvalidIndex { .. } => Outcome::InvalidIndex,
            AllocError::InsufficientAvailable { .. } => Outcome::InsufficientAvailable,
            AllocError::ClaimExceeded { .. } => Outcome::ClaimExceeded,
            AllocError::ExceedsAllocation { .. } => Outcome::ExceedsAllocation,
            AllocError::DeniedUnsafe => Outcome::DeniedUnsafe,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Granted => "Request granted",
            Outcome::GrantedDeadlocked => "Request granted; system is deadlocked",
            Outcome::DeniedUnsafe => "Request denied: unsafe state",
            Outcome::Released => "Release successful",
            Outcome::InvalidIndex => "Failed: invalid process or resource number",
            Outcome::InvalidAmount => "Failed: number of units must not be negative",
            Outcome::InsufficientAvailable => "Request failed: units requested exceed units available",
            Outcome::ClaimExceeded => "Request failed: maximum claim of process exceeded",
            Outcome::ExceedsAllocation => {
                "Release failed: units to release exceed current allocation"
            }
        };
        f.write_str(text)
    }
}

/// Result of one step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepResult {
    /// What the driver reports
    pub outcome: Outcome,
    /// Committed state changes; empty for every rejected command
    pub mutations: Vec<Mutation>,
}

impl StepResult {
    fn rejected(outcome: Outcome) -> Self {
        Self {
            outcome,
            mutations: Vec::new(),
        }
    }
}

// ============================================================================
// Step function
// ============================================================================

/// Convert the raw triple into typed, range-checked arguments.
///
/// Indices are checked (sign and range) before units, so a command with both
/// a bad index and negative units reports `InvalidIndex`.
fn decode<P: AdmissionPolicy>(
    allocator: &Allocator<P>,
    process: i64,
    resource: i64,
    units: i64,
) -> Result<(ProcessId, ResourceId, Units), Outcome> {
    let process = usize::try_from(process)
        .map(ProcessId)
        .map_err(|_| Outcome::InvalidIndex)?;
    let resource = usize::try_from(resource)
        .map(ResourceId)
        .map_err(|_| Outcome::InvalidIndex)?;
    allocator.state().check_indices(process, resource)?;
    let units = Units::try_from(units).map_err(|_| Outcome::InvalidAmount)?;
    Ok((process, resource, units))
}

/// Apply one command to an allocator.
///
/// Rejected commands leave the allocator untouched and produce no mutation.
pub fn step<P: AdmissionPolicy>(allocator: &mut Allocator<P>, command: Command) -> StepResult {
    match command {
        Command::Request {
            process,
            resource,
            units,
        } => {
            let (process, resource, units) = match decode(allocator, process, resource, units) {
                Ok(args) => args,
                Err(outcome) => return StepResult::rejected(outcome),
            };
            match allocator.request(process, resource, units) {
                Ok(grant) => StepResult {
                    outcome: grant.into(),
                    mutations: vec![Mutation::Allocated {
                        process,
                        resource,
                        units,
                    }],
                },
                Err(e) => StepResult::rejected(e.into()),
            }
        }
        Command::Release {
            process,
            resource,
            units,
        } => {
            let (process, resource, units) = match decode(allocator, process, resource, units) {
                Ok(args) => args,
                Err(outcome) => return StepResult::rejected(outcome),
            };
            match allocator.release(process, resource, units) {
                Ok(()) => StepResult {
                    outcome: Outcome::Released,
                    mutations: vec![Mutation::Released {
                        process,
                        resource,
                        units,
                    }],
                },
                Err(e) => StepResult::rejected(e.into()),
            }
        }
    }
}
