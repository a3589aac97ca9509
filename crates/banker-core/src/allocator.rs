//! Policy-parametrized allocator
//!
//! `Allocator<P>` owns one `ResourceState` and accepts `request`/`release`
//! events. Validation and bookkeeping are shared; the policy `P` decides
//! whether a provisionally committed request stands.
//!
//! - `SafeAllocator` (`Allocator<Banker>`): commits only safe states, rolls
//!   back otherwise.
//! - `ShadowAllocator` (`Allocator<Shadow>`): commits everything that passes
//!   validation and reports deadlock.

use core::marker::PhantomData;

use alloc::vec::Vec;
use log::{debug, trace};

use crate::config::{ResourceModel, SystemConfig};
use crate::error::{AllocError, ConfigError};
use crate::state::ResourceState;
use crate::types::{Grant, ProcessId, ResourceId, Units, Verdict};
use crate::verify::{self, AdmissionPolicy, Banker, Shadow};

/// Banker's-algorithm allocator
pub type SafeAllocator = Allocator<Banker>;

/// Unchecked allocator with deadlock reporting
pub type ShadowAllocator = Allocator<Shadow>;

/// Resource allocator governed by admission policy `P`.
pub struct Allocator<P: AdmissionPolicy> {
    state: ResourceState,
    _policy: PhantomData<P>,
}

impl<P: AdmissionPolicy> Allocator<P> {
    /// Construct from a raw configuration.
    ///
    /// The configuration is taken by value; the allocator owns its copy of
    /// the totals and claims.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_model(config.validate()?))
    }

    /// Construct from an already validated model.
    pub fn from_model(model: ResourceModel) -> Self {
        debug!(
            "{} allocator: {} processes, {} resources, totals {:?}",
            P::NAME,
            model.process_count(),
            model.resource_count(),
            model.total_units()
        );
        Self {
            state: ResourceState::new(model),
            _policy: PhantomData,
        }
    }

    /// Request `units` of `resource` for `process`.
    ///
    /// Validation order: indices, availability, claim ceiling. On success the
    /// units are provisionally committed and the policy verifies the whole
    /// state. A rejected verdict is rolled back through the same bookkeeping
    /// `release` uses, restoring the previous state exactly.
    pub fn request(
        &mut self,
        process: ProcessId,
        resource: ResourceId,
        units: Units,
    ) -> Result<Grant, AllocError> {
        if let Err(e) = self.state.check_request(process, resource, units) {
            trace!("{} request({}, {}, {}) rejected: {}", P::NAME, process, resource, units, e);
            return Err(e);
        }

        self.state.apply_allocate(process, resource, units);
        let verdict = P::verify(&self.state);

        if !P::admits(verdict) {
            self.state.apply_release(process, resource, units);
            debug!(
                "{} request({}, {}, {}) denied: {:?}, rolled back",
                P::NAME,
                process,
                resource,
                units,
                verdict
            );
            return Err(AllocError::DeniedUnsafe);
        }

        if verdict.is_deadlocked() {
            debug!(
                "{} request({}, {}, {}) granted; state is deadlocked",
                P::NAME,
                process,
                resource,
                units
            );
            Ok(Grant::GrantedDeadlocked)
        } else {
            debug!("{} request({}, {}, {}) granted", P::NAME, process, resource, units);
            Ok(Grant::Granted)
        }
    }

    /// Release `units` of `resource` held by `process`.
    ///
    /// Never runs the policy check: releasing cannot make a safe state
    /// unsafe or create a deadlock.
    pub fn release(
        &mut self,
        process: ProcessId,
        resource: ResourceId,
        units: Units,
    ) -> Result<(), AllocError> {
        if let Err(e) = self.state.check_release(process, resource, units) {
            trace!("{} release({}, {}, {}) rejected: {}", P::NAME, process, resource, units, e);
            return Err(e);
        }

        self.state.apply_release(process, resource, units);
        debug!("{} release({}, {}, {}) done", P::NAME, process, resource, units);
        Ok(())
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    /// Whether the current state is safe (Banker's algorithm).
    pub fn is_safe(&self) -> bool {
        verify::is_safe(&self.state)
    }

    /// Whether every process is currently blocked.
    pub fn is_deadlocked(&self) -> bool {
        verify::is_deadlocked(&self.state)
    }

    /// This allocator's own policy verdict on the current state.
    pub fn verdict(&self) -> Verdict {
        P::verify(&self.state)
    }

    /// Reduction order proving safety, `None` if unsafe.
    pub fn safe_sequence(&self) -> Option<Vec<ProcessId>> {
        verify::safe_sequence(&self.state)
    }

    /// Processes that cannot finish from current availability.
    pub fn blocked_processes(&self) -> Vec<ProcessId> {
        verify::blocked_processes(&self.state)
    }

    /// Remaining need of `process` for `resource`.
    pub fn need(&self, process: ProcessId, resource: ResourceId) -> Option<Units> {
        self.state.need(process, resource)
    }

    /// The underlying accounting state.
    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// Policy name, as used in logs.
    pub fn policy_name(&self) -> &'static str {
        P::NAME
    }

}

impl<P: AdmissionPolicy> Clone for Allocator<P> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            _policy: PhantomData,
        }
    }
}

impl<P: AdmissionPolicy> core::fmt::Debug for Allocator<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Allocator")
            .field("policy", &P::NAME)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn textbook() -> SystemConfig {
        SystemConfig::new(3, 2, vec![2, 3], vec![vec![2, 1], vec![2, 2], vec![2, 2]])
    }

    fn ring() -> SystemConfig {
        SystemConfig::new(
            4,
            3,
            vec![1, 1, 1],
            vec![vec![1, 1, 0], vec![0, 1, 1], vec![1, 1, 0], vec![0, 0, 1]],
        )
    }

    fn p(i: usize) -> ProcessId {
        ProcessId(i)
    }

    fn r(i: usize) -> ResourceId {
        ResourceId(i)
    }

    #[test]
    fn test_construct_rejects_zero_processes() {
        let result = SafeAllocator::new(SystemConfig::new(0, 1, vec![1], vec![]));
        assert!(matches!(result, Err(ConfigError::NonPositiveCount { .. })));
    }

    #[test]
    fn test_safe_textbook_scenario() {
        let mut a = SafeAllocator::new(textbook()).unwrap();

        assert_eq!(a.request(p(0), r(1), 1), Ok(Grant::Granted));
        assert_eq!(a.request(p(2), r(1), 2), Ok(Grant::Granted));

        let before = a.state().clone();
        assert_eq!(a.request(p(1), r(0), 1), Err(AllocError::DeniedUnsafe));
        assert_eq!(a.state(), &before);
        assert_eq!(a.state().held(p(1), r(0)), Some(0));
        assert!(a.is_safe());
    }

    #[test]
    fn test_shadow_commits_what_safe_denies() {
        let mut a = ShadowAllocator::new(textbook()).unwrap();

        assert_eq!(a.request(p(0), r(1), 1), Ok(Grant::Granted));
        assert_eq!(a.request(p(2), r(1), 2), Ok(Grant::Granted));
        assert_eq!(a.request(p(1), r(0), 1), Ok(Grant::GrantedDeadlocked));
        assert_eq!(a.state().held(p(1), r(0)), Some(1));
        assert!(a.is_deadlocked());
        assert!(!a.is_safe());
        assert_eq!(a.verdict(), Verdict::Deadlocked);
    }

    #[test]
    fn test_ring_scenario_on_both_policies() {
        let mut safe = SafeAllocator::new(ring()).unwrap();
        let mut shadow = ShadowAllocator::new(ring()).unwrap();

        assert_eq!(safe.request(p(1), r(2), 1), Ok(Grant::Granted));
        assert_eq!(safe.request(p(2), r(0), 1), Ok(Grant::Granted));
        assert_eq!(shadow.request(p(1), r(2), 1), Ok(Grant::Granted));
        assert_eq!(shadow.request(p(2), r(0), 1), Ok(Grant::Granted));

        assert_eq!(safe.request(p(0), r(1), 1), Err(AllocError::DeniedUnsafe));
        assert_eq!(shadow.request(p(0), r(1), 1), Ok(Grant::GrantedDeadlocked));

        // Safe allocator can still serve P2
        assert_eq!(safe.request(p(2), r(1), 1), Ok(Grant::Granted));
    }

    #[test]
    fn test_validation_failures_leave_state_untouched() {
        let mut a = SafeAllocator::new(textbook()).unwrap();
        a.request(p(0), r(0), 1).unwrap();
        let before = a.state().clone();

        assert!(matches!(
            a.request(p(3), r(0), 1),
            Err(AllocError::InvalidIndex { .. })
        ));
        assert!(matches!(
            a.request(p(1), r(0), 2),
            Err(AllocError::InsufficientAvailable { .. })
        ));
        assert!(matches!(
            a.request(p(0), r(1), 2),
            Err(AllocError::ClaimExceeded { .. })
        ));
        assert!(matches!(
            a.release(p(0), r(0), 2),
            Err(AllocError::ExceedsAllocation { .. })
        ));
        assert!(matches!(
            a.release(p(0), r(7), 0),
            Err(AllocError::InvalidIndex { .. })
        ));

        assert_eq!(a.state(), &before);
    }

    #[test]
    fn test_release_returns_units() {
        let mut a = SafeAllocator::new(textbook()).unwrap();
        a.request(p(2), r(1), 2).unwrap();
        assert_eq!(a.state().available(), &[2, 1]);

        a.release(p(2), r(1), 2).unwrap();
        assert_eq!(a.state().available(), &[2, 3]);
        assert_eq!(a.state().held(p(2), r(1)), Some(0));
    }

    #[test]
    fn test_zero_unit_request_still_checks_safety() {
        let mut a = SafeAllocator::new(textbook()).unwrap();
        assert_eq!(a.request(p(1), r(0), 0), Ok(Grant::Granted));
        assert_eq!(a.release(p(1), r(0), 0), Ok(()));

        // An instance whose initial state is already unsafe denies even no-ops
        let mut over = SafeAllocator::new(SystemConfig::new(1, 1, vec![1], vec![vec![2]])).unwrap();
        assert!(!over.is_safe());
        assert_eq!(over.request(p(0), r(0), 0), Err(AllocError::DeniedUnsafe));
    }

    #[test]
    fn test_queries_are_idempotent() {
        let mut a = ShadowAllocator::new(textbook()).unwrap();
        a.request(p(1), r(0), 1).unwrap();
        assert_eq!(a.is_safe(), a.is_safe());
        assert_eq!(a.is_deadlocked(), a.is_deadlocked());
        assert_eq!(a.safe_sequence(), a.safe_sequence());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = SafeAllocator::new(textbook()).unwrap();
        let b = a.clone();
        a.request(p(0), r(0), 1).unwrap();
        assert_eq!(b.state().available(), &[2, 3]);
        assert_eq!(a.state().available(), &[1, 3]);
    }

    #[test]
    fn test_safe_allocator_only_mutates_into_safe_states() {
        let mut a = SafeAllocator::new(textbook()).unwrap();
        a.request(p(0), r(1), 1).unwrap();
        a.request(p(2), r(1), 2).unwrap();
        let before = a.state().clone();

        // P1 taking the last R0 unit would leave no process able to finish
        assert_eq!(a.request(p(1), r(0), 1), Err(AllocError::DeniedUnsafe));
        assert_eq!(a.state(), &before);
        assert!(a.is_safe());

        // The shadow commits the same sequence and lands in an unsafe state
        let mut shadow = ShadowAllocator::new(textbook()).unwrap();
        shadow.request(p(0), r(1), 1).unwrap();
        shadow.request(p(2), r(1), 2).unwrap();
        assert_eq!(shadow.request(p(1), r(0), 1), Ok(Grant::GrantedDeadlocked));
        assert!(!shadow.is_safe());
    }
}
