//! Replay
//!
//! Rebuilds an allocator from a CommitLog by starting from the genesis model
//! and re-submitting every commit through the allocator's own `request` and
//! `release`. The admission policy runs again on each allocation, so a log
//! that records a move the policy forbids does not replay.
//!
//! ```text
//! fold(genesis.model, commits, request | release) -> allocator
//! ```

use banker_core::{AdmissionPolicy, AllocError, Allocator, Mutation, ResourceState};
use log::debug;
use thiserror::Error;

use crate::commitlog::CommitLog;

/// Errors that can occur during replay.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// The log was recorded by an allocator with a different policy
    #[error("policy mismatch: log is {actual}, replaying as {expected}")]
    PolicyMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Commits after genesis were trimmed away
    #[error("log truncated: oldest retained commit is seq {first_seq}")]
    Truncated { first_seq: u64 },

    /// Hash, link or sequence number broken
    #[error("hash chain broken at seq {seq}")]
    BrokenChain { seq: u64 },

    /// The allocator refused a recorded mutation
    #[error("commit {seq} does not apply: {source}")]
    InvalidCommit { seq: u64, source: AllocError },

    /// Replay finished on a different state than expected
    #[error("replayed state differs from the expected state")]
    StateMismatch,
}

pub type ReplayResult<T> = Result<T, ReplayError>;

/// Rebuild an `Allocator<P>` from `log`.
///
/// # Example
///
/// ```ignore
/// let rebuilt: SafeAllocator = replay(gateway.commitlog())?;
/// assert_eq!(rebuilt.state(), gateway.allocator().state());
/// ```
pub fn replay<P: AdmissionPolicy>(log: &CommitLog) -> ReplayResult<Allocator<P>> {
    if let Some(seq) = log.first_broken_link() {
        return Err(ReplayError::BrokenChain { seq });
    }
    let genesis = log.genesis();
    if genesis.policy != P::NAME {
        return Err(ReplayError::PolicyMismatch {
            expected: P::NAME,
            actual: genesis.policy,
        });
    }
    if log.is_truncated() {
        let first_seq = log.commits().first().map_or(log.current_seq(), |c| c.seq);
        return Err(ReplayError::Truncated { first_seq });
    }

    let mut allocator = Allocator::<P>::from_model(genesis.model.clone());
    for commit in log.commits() {
        let applied = match commit.mutation {
            Mutation::Allocated {
                process,
                resource,
                units,
            } => allocator.request(process, resource, units).map(|_| ()),
            Mutation::Released {
                process,
                resource,
                units,
            } => allocator.release(process, resource, units),
        };
        applied.map_err(|source| ReplayError::InvalidCommit {
            seq: commit.seq,
            source,
        })?;
    }

    debug!("replayed {} commits under {} policy", log.len(), P::NAME);
    Ok(allocator)
}

/// Replay `log` and require the result to equal `expected`.
pub fn replay_and_verify<P: AdmissionPolicy>(
    log: &CommitLog,
    expected: &ResourceState,
) -> ReplayResult<Allocator<P>> {
    let allocator = replay::<P>(log)?;
    if allocator.state() != expected {
        return Err(ReplayError::StateMismatch);
    }
    Ok(allocator)
}
