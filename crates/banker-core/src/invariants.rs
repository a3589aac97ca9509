//! Formal invariants for allocator verification
//!
//! This module contains runtime-checkable invariants that should always hold
//! after every committed operation. These are used for:
//! 1. Runtime assertion checking in tests
//! 2. Exhaustive small-model tests
//! 3. Formal verification with Kani
//!
//! # Invariants
//!
//! 1. **Shape**: `available`/`total_units` have one entry per resource,
//!    `allocation`/`max_claim` one row per process
//! 2. **Claim Ceiling**: `allocation[p][r] <= max_claim[p][r]`
//! 3. **Conservation**: `available[r] + sum_p allocation[p][r] == total_units[r]`
//! 4. **Availability Bound**: `available[r] <= total_units[r]`
//!
//! Non-negativity holds by construction (units are unsigned).

use alloc::string::String;
use alloc::vec::Vec;

use crate::state::ResourceState;

/// An invariant violation with details
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Description of what went wrong
    pub description: String,
}

/// Check all allocator invariants.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_all_invariants(state: &ResourceState) -> Vec<InvariantViolation> {
    let shape = check_shape(state);
    if !shape.is_empty() {
        // The remaining checks index by the declared counts
        return shape;
    }

    let mut violations = Vec::new();
    violations.extend(check_claim_ceiling(state));
    violations.extend(check_conservation(state));
    violations.extend(check_availability_bound(state));
    violations
}

/// Invariant 1: table shapes match the declared counts
fn check_shape(state: &ResourceState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let n = state.process_count();
    let m = state.resource_count();

    let mut check_len = |what: &str, actual: usize, expected: usize| {
        if actual != expected {
            violations.push(InvariantViolation {
                invariant: "shape",
                description: alloc::format!("{} has {} entries, expected {}", what, actual, expected),
            });
        }
    };

    check_len("available", state.available().len(), m);
    check_len("total_units", state.total_units().len(), m);
    check_len("allocation", state.allocation().len(), n);
    check_len("max_claim", state.max_claim().len(), n);
    for row in state.allocation() {
        check_len("allocation row", row.len(), m);
    }
    for row in state.max_claim() {
        check_len("max_claim row", row.len(), m);
    }

    violations
}

/// Invariant 2: no process holds more than its maximum claim
fn check_claim_ceiling(state: &ResourceState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (p, (held_row, claim_row)) in state
        .allocation()
        .iter()
        .zip(state.max_claim())
        .enumerate()
    {
        for (r, (&held, &claim)) in held_row.iter().zip(claim_row).enumerate() {
            if held > claim {
                violations.push(InvariantViolation {
                    invariant: "claim_ceiling",
                    description: alloc::format!(
                        "Process {} holds {} of resource {} but claims only {}",
                        p,
                        held,
                        r,
                        claim
                    ),
                });
            }
        }
    }

    violations
}

/// Invariant 3: units are neither created nor destroyed
fn check_conservation(state: &ResourceState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (r, &total) in state.total_units().iter().enumerate() {
        let held: u128 = state.allocation().iter().map(|row| row[r] as u128).sum();
        let accounted = held + state.available()[r] as u128;
        if accounted != total as u128 {
            violations.push(InvariantViolation {
                invariant: "conservation",
                description: alloc::format!(
                    "Resource {}: available {} + allocated {} != total {}",
                    r,
                    state.available()[r],
                    held,
                    total
                ),
            });
        }
    }

    violations
}

/// Invariant 4: never more free units than exist
fn check_availability_bound(state: &ResourceState) -> Vec<InvariantViolation> {
    state
        .available()
        .iter()
        .zip(state.total_units())
        .enumerate()
        .filter(|(_, (&avail, &total))| avail > total)
        .map(|(r, (avail, total))| InvariantViolation {
            invariant: "availability_bound",
            description: alloc::format!("Resource {}: available {} > total {}", r, avail, total),
        })
        .collect()
}

/// Assert all invariants hold (panic if not)
pub fn assert_invariants(state: &ResourceState) {
    let violations = check_all_invariants(state);
    if let Some(v) = violations.first() {
        panic!("Invariant violated: {} ({})", v.invariant, v.description);
    }
}

// ============================================================================
// Kani proofs for invariants
// ============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;
    use crate::allocator::{SafeAllocator, ShadowAllocator};
    use crate::config::SystemConfig;
    use crate::types::{ProcessId, ResourceId};
    use alloc::vec;

    fn small_config() -> SystemConfig {
        let t0: u8 = kani::any();
        let t1: u8 = kani::any();
        let c: [[u8; 2]; 2] = kani::any();
        kani::assume(t0 <= 3 && t1 <= 3);
        kani::assume(c.iter().flatten().all(|&v| v <= 3));
        SystemConfig::new(
            2,
            2,
            vec![t0 as i64, t1 as i64],
            vec![
                vec![c[0][0] as i64, c[0][1] as i64],
                vec![c[1][0] as i64, c[1][1] as i64],
            ],
        )
    }

    /// Proof: A request on the safe allocator maintains invariants, and a
    /// denial restores the previous state exactly
    #[kani::proof]
    #[kani::unwind(5)]
    fn safe_request_maintains_invariants() {
        let Ok(mut alloc) = SafeAllocator::new(small_config()) else {
            return;
        };
        let p: usize = kani::any();
        let r: usize = kani::any();
        let units: u8 = kani::any();
        kani::assume(p < 2 && r < 2);

        let before = alloc.state().clone();
        let result = alloc.request(ProcessId(p), ResourceId(r), units as u64);

        kani::assert(
            check_all_invariants(alloc.state()).is_empty(),
            "Request should maintain invariants",
        );
        if result.is_err() {
            kani::assert(alloc.state() == &before, "Rejected request must not mutate");
        }
    }

    /// Proof: Shadow request followed by release of the same amount is a no-op
    #[kani::proof]
    #[kani::unwind(5)]
    fn shadow_request_release_roundtrip() {
        let Ok(mut alloc) = ShadowAllocator::new(small_config()) else {
            return;
        };
        let p: usize = kani::any();
        let r: usize = kani::any();
        let units: u8 = kani::any();
        kani::assume(p < 2 && r < 2);

        let before = alloc.state().clone();
        if alloc.request(ProcessId(p), ResourceId(r), units as u64).is_ok() {
            kani::assert(
                alloc.release(ProcessId(p), ResourceId(r), units as u64).is_ok(),
                "Granted units can always be released",
            );
            kani::assert(alloc.state() == &before, "Release must undo request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;
    use crate::types::{ProcessId, ResourceId};
    use alloc::vec;

    fn state() -> ResourceState {
        let model = SystemConfig::new(2, 2, vec![3, 2], vec![vec![2, 1], vec![1, 2]])
            .validate()
            .unwrap();
        ResourceState::new(model)
    }

    #[test]
    fn test_fresh_state_holds_invariants() {
        assert!(check_all_invariants(&state()).is_empty());
    }

    #[test]
    fn test_bookkeeping_holds_invariants() {
        let mut s = state();
        s.apply_allocate(ProcessId(0), ResourceId(0), 2);
        s.apply_allocate(ProcessId(1), ResourceId(1), 2);
        s.apply_release(ProcessId(0), ResourceId(0), 1);
        assert_invariants(&s);
    }

    #[test]
    fn test_detects_conservation_violation() {
        let mut s = state();
        s.available[0] -= 1;
        let violations = check_all_invariants(&s);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].invariant, "conservation");
    }

    #[test]
    fn test_detects_claim_ceiling_violation() {
        let mut s = state();
        s.allocation[1][0] = 3;
        s.available[0] = 0;
        let violations = check_all_invariants(&s);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].invariant, "claim_ceiling");
    }

    #[test]
    fn test_detects_availability_bound_violation() {
        let mut s = state();
        s.available[1] = 5;
        let names: Vec<_> = check_all_invariants(&s).iter().map(|v| v.invariant).collect();
        assert!(names.contains(&"availability_bound"));
        assert!(names.contains(&"conservation"));
    }

    #[test]
    fn test_detects_shape_violation() {
        let mut s = state();
        s.allocation.pop();
        let violations = check_all_invariants(&s);
        assert!(violations.iter().all(|v| v.invariant == "shape"));
        assert!(!violations.is_empty());
    }

    #[test]
    #[should_panic(expected = "Invariant violated: conservation")]
    fn test_assert_invariants_panics() {
        let mut s = state();
        s.available[0] = 0;
        assert_invariants(&s);
    }
}
