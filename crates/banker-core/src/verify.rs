//! Safety and deadlock checks, and the admission policies built on them
//!
//! # Safety check (Banker's algorithm)
//!
//! Works on a scratch copy of `available`. Each pass scans unfinished
//! processes in ascending index order; a process whose remaining need fits in
//! the scratch vector is reduced: marked finished, its allocation returned to
//! the scratch vector. Passes repeat until one makes no progress. The state
//! is safe iff every process was reduced.
//!
//! Reducibility is monotone (the scratch vector only grows), so scan order
//! never changes the verdict; ascending order keeps the reduction sequence
//! reproducible.
//!
//! # Deadlock check
//!
//! A process is blocked when its remaining need for some resource exceeds
//! what is available right now. The state is deadlocked iff every process is
//! blocked. This is strictly stronger than unsafe.

use alloc::vec;
use alloc::vec::Vec;

use crate::state::ResourceState;
use crate::types::{ProcessId, Verdict};

// ============================================================================
// Safety check
// ============================================================================

/// Run the safety algorithm.
///
/// Returns the reduction order if every process can finish, `None` if the
/// state is unsafe. O(n² · m) worst case.
pub fn safe_sequence(state: &ResourceState) -> Option<Vec<ProcessId>> {
    let n = state.process_count();
    let mut free = state.available().to_vec();
    let mut finished = vec![false; n];
    let mut sequence = Vec::with_capacity(n);

    loop {
        let mut progressed = false;
        for p in 0..n {
            if finished[p] || !state.need_fits(p, &free) {
                continue;
            }
            finished[p] = true;
            for (slot, &held) in free.iter_mut().zip(&state.allocation()[p]) {
                *slot += held;
            }
            sequence.push(ProcessId(p));
            progressed = true;
        }
        if !progressed || sequence.len() == n {
            break;
        }
    }

    if sequence.len() == n {
        Some(sequence)
    } else {
        None
    }
}

/// Whether the state is safe under the Banker's algorithm.
pub fn is_safe(state: &ResourceState) -> bool {
    safe_sequence(state).is_some()
}

// ============================================================================
// Deadlock check
// ============================================================================

/// Processes whose remaining need cannot be met from current availability.
pub fn blocked_processes(state: &ResourceState) -> Vec<ProcessId> {
    state
        .processes()
        .filter(|p| !state.need_fits(p.0, state.available()))
        .collect()
}

/// Whether every process is blocked.
pub fn is_deadlocked(state: &ResourceState) -> bool {
    state
        .processes()
        .all(|p| !state.need_fits(p.0, state.available()))
}

// ============================================================================
// Admission policies
// ============================================================================

/// Acceptance policy of an allocator.
///
/// After a request passes validation it is provisionally committed, then
/// `verify` runs over the whole state. If `admits` rejects the verdict the
/// request is rolled back.
pub trait AdmissionPolicy {
    /// Short name for logs
    const NAME: &'static str;

    /// Judge the (provisionally committed) state.
    fn verify(state: &ResourceState) -> Verdict;

    /// Whether a provisional grant with this verdict stands.
    fn admits(verdict: Verdict) -> bool;
}

/// Banker's algorithm: only safe states are admitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Banker;

impl AdmissionPolicy for Banker {
    const NAME: &'static str = "safe";

    fn verify(state: &ResourceState) -> Verdict {
        if is_safe(state) {
            Verdict::Safe
        } else {
            Verdict::Unsafe
        }
    }

    fn admits(verdict: Verdict) -> bool {
        verdict == Verdict::Safe
    }
}

/// Shadow: everything that passes validation is admitted; deadlock is
/// detected for reporting only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shadow;

impl AdmissionPolicy for Shadow {
    const NAME: &'static str = "shadow";

    fn verify(state: &ResourceState) -> Verdict {
        if is_deadlocked(state) {
            Verdict::Deadlocked
        } else {
            Verdict::Inconclusive
        }
    }

    fn admits(_verdict: Verdict) -> bool {
        true
    }
}
