//! Resource state - pure data structure holding one allocator's accounting
//!
//! `ResourceState` holds the immutable model (counts, totals, maximum claims)
//! and the two mutable tables (`available`, `allocation`). Validation and
//! bookkeeping live here once and are shared by every admission policy.

use alloc::vec;
use alloc::vec::Vec;
use serde::Serialize;

use crate::config::ResourceModel;
use crate::error::AllocError;
use crate::types::{ProcessId, ResourceId, Units};

/// Accounting state of one allocator instance.
///
/// No I/O, no side effects. Mutated only through `apply_allocate` and
/// `apply_release`, which callers reach after validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceState {
    /// Counts, totals and maximum claims (immutable)
    pub(crate) model: ResourceModel,
    /// Units of each resource not held by any process
    pub(crate) available: Vec<Units>,
    /// Units of each resource held by each process
    pub(crate) allocation: Vec<Vec<Units>>,
}

impl ResourceState {
    /// Create the initial state: nothing allocated, everything available.
    pub fn new(model: ResourceModel) -> Self {
        let available = model.total_units.clone();
        let allocation = vec![vec![0; model.resource_count]; model.process_count];
        Self {
            model,
            available,
            allocation,
        }
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// The model this state was built from
    pub fn model(&self) -> &ResourceModel {
        &self.model
    }

    /// Number of processes
    pub fn process_count(&self) -> usize {
        self.model.process_count
    }

    /// Number of resource types
    pub fn resource_count(&self) -> usize {
        self.model.resource_count
    }

    /// Total units per resource
    pub fn total_units(&self) -> &[Units] {
        &self.model.total_units
    }

    /// Maximum claim matrix
    pub fn max_claim(&self) -> &[Vec<Units>] {
        &self.model.max_claim
    }

    /// Currently free units per resource
    pub fn available(&self) -> &[Units] {
        &self.available
    }

    /// Current allocation matrix
    pub fn allocation(&self) -> &[Vec<Units>] {
        &self.allocation
    }

    /// Units of `resource` held by `process`, `None` if out of range
    pub fn held(&self, process: ProcessId, resource: ResourceId) -> Option<Units> {
        self.allocation
            .get(process.0)
            .and_then(|row| row.get(resource.0))
            .copied()
    }

    /// Remaining need of `process` for `resource` (`max_claim - allocation`),
    /// `None` if out of range
    pub fn need(&self, process: ProcessId, resource: ResourceId) -> Option<Units> {
        let held = self.held(process, resource)?;
        let claim = self.model.max_claim[process.0][resource.0];
        Some(claim.saturating_sub(held))
    }

    /// Iterate over every process ID in ascending order
    pub fn processes(&self) -> impl Iterator<Item = ProcessId> {
        (0..self.model.process_count).map(ProcessId)
    }

    /// Whether `process`'s whole remaining need fits in `free`.
    ///
    /// `free` must have `resource_count` entries.
    pub(crate) fn need_fits(&self, process: usize, free: &[Units]) -> bool {
        self.model.max_claim[process]
            .iter()
            .zip(&self.allocation[process])
            .zip(free)
            .all(|((&claim, &held), &avail)| claim.saturating_sub(held) <= avail)
    }

    // ========================================================================
    // Validation (no mutation)
    // ========================================================================

    /// Check that both indices are in range.
    pub fn check_indices(&self, process: ProcessId, resource: ResourceId) -> Result<(), AllocError> {
        if process.0 < self.model.process_count && resource.0 < self.model.resource_count {
            Ok(())
        } else {
            Err(AllocError::InvalidIndex { process, resource })
        }
    }

    /// Validate a request: indices, then availability, then claim ceiling.
    pub fn check_request(
        &self,
        process: ProcessId,
        resource: ResourceId,
        units: Units,
    ) -> Result<(), AllocError> {
        self.check_indices(process, resource)?;

        let available = self.available[resource.0];
        if units > available {
            return Err(AllocError::InsufficientAvailable {
                requested: units,
                available,
            });
        }

        let held = self.allocation[process.0][resource.0];
        let max_claim = self.model.max_claim[process.0][resource.0];
        if units > max_claim.saturating_sub(held) {
            return Err(AllocError::ClaimExceeded {
                requested: units,
                held,
                max_claim,
            });
        }

        Ok(())
    }

    /// Validate a release: indices, then the process must hold `units`.
    pub fn check_release(
        &self,
        process: ProcessId,
        resource: ResourceId,
        units: Units,
    ) -> Result<(), AllocError> {
        self.check_indices(process, resource)?;

        let held = self.allocation[process.0][resource.0];
        if units > held {
            return Err(AllocError::ExceedsAllocation {
                requested: units,
                held,
            });
        }

        Ok(())
    }

    // ========================================================================
    // State mutation (callers validate first)
    // ========================================================================

    /// Move `units` from `available` into `allocation`.
    ///
    /// Precondition: `check_request` passed for the same arguments.
    pub(crate) fn apply_allocate(&mut self, process: ProcessId, resource: ResourceId, units: Units) {
        self.available[resource.0] -= units;
        self.allocation[process.0][resource.0] += units;
    }

    /// Move `units` from `allocation` back into `available`.
    ///
    /// Precondition: `check_release` passed for the same arguments.
    pub(crate) fn apply_release(&mut self, process: ProcessId, resource: ResourceId, units: Units) {
        self.allocation[process.0][resource.0] -= units;
        self.available[resource.0] += units;
    }
}
