//! Commit log
//!
//! Every committed mutation, in order, each commit hashed over its contents
//! and the previous commit's hash. The genesis record names the policy and
//! the validated model the allocator started from and is never trimmed.
//!
//! Replay from genesis is only possible while nothing has been trimmed;
//! see `CommitLog::is_truncated`.

use core::hash::Hasher;

use alloc::vec::Vec;
use banker_core::{Mutation, ResourceModel};
use log::warn;

use crate::types::{CommitId, EventId, Tick};

/// Default number of mutation commits retained
pub const DEFAULT_COMMITLOG_CAPACITY: usize = 100_000;

/// 64-bit FNV-1a.
///
/// `DefaultHasher` is unavailable without std and is not stable across
/// releases; chain hashes must not change between runs.
struct Fnv1a(u64);

impl Fnv1a {
    fn new() -> Self {
        Fnv1a(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv1a {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Where the log starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Genesis {
    /// `AdmissionPolicy::NAME` of the allocator being logged
    pub policy: &'static str,
    pub model: ResourceModel,
    pub id: CommitId,
}

impl Genesis {
    fn new(policy: &'static str, model: ResourceModel) -> Self {
        let mut genesis = Genesis {
            policy,
            model,
            id: 0,
        };
        genesis.id = genesis.compute_id();
        genesis
    }

    fn compute_id(&self) -> CommitId {
        let mut h = Fnv1a::new();
        h.write_usize(self.policy.len());
        h.write(self.policy.as_bytes());
        h.write_usize(self.model.process_count());
        h.write_usize(self.model.resource_count());
        for &t in self.model.total_units() {
            h.write_u64(t);
        }
        for &c in self.model.max_claim().iter().flatten() {
            h.write_u64(c);
        }
        h.finish()
    }
}

/// One committed mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commit {
    /// 1-based; genesis is seq 0
    pub seq: u64,
    pub tick: Tick,
    /// SysLog record of the submission that produced this commit
    pub caused_by: Option<EventId>,
    pub mutation: Mutation,
    pub prev: CommitId,
    pub id: CommitId,
}

impl Commit {
    /// Hash of the contents chained onto `prev`.
    pub fn compute_id(&self) -> CommitId {
        let mut h = Fnv1a::new();
        h.write_u64(self.prev);
        h.write_u64(self.seq);
        h.write_u64(self.tick);
        match self.caused_by {
            Some(event) => {
                h.write_u8(1);
                h.write_u64(event);
            }
            None => h.write_u8(0),
        }
        let (tag, process, resource, units) = match self.mutation {
            Mutation::Allocated {
                process,
                resource,
                units,
            } => (1u8, process, resource, units),
            Mutation::Released {
                process,
                resource,
                units,
            } => (2u8, process, resource, units),
        };
        h.write_u8(tag);
        h.write_usize(process.0);
        h.write_usize(resource.0);
        h.write_u64(units);
        h.finish()
    }
}

/// Bounded, hash-chained log of committed mutations.
#[derive(Clone, Debug)]
pub struct CommitLog {
    genesis: Genesis,
    commits: Vec<Commit>,
    next_seq: u64,
    head: CommitId,
    capacity: usize,
    /// Commits removed to stay within capacity
    dropped: u64,
}

impl CommitLog {
    pub fn new(policy: &'static str, model: ResourceModel) -> Self {
        Self::with_capacity(policy, model, DEFAULT_COMMITLOG_CAPACITY)
    }

    /// A log retaining at most `capacity` mutation commits (at least one).
    pub fn with_capacity(policy: &'static str, model: ResourceModel, capacity: usize) -> Self {
        let genesis = Genesis::new(policy, model);
        let head = genesis.id;
        Self {
            genesis,
            commits: Vec::new(),
            next_seq: 1,
            head,
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Append a mutation and return the new head.
    pub fn append(&mut self, mutation: Mutation, caused_by: Option<EventId>, tick: Tick) -> CommitId {
        let mut commit = Commit {
            seq: self.next_seq,
            tick,
            caused_by,
            mutation,
            prev: self.head,
            id: 0,
        };
        commit.id = commit.compute_id();

        if self.commits.len() == self.capacity {
            self.commits.remove(0);
            self.dropped += 1;
        }
        self.commits.push(commit);
        self.next_seq += 1;
        self.head = commit.id;
        self.head
    }

    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }

    /// Retained mutation commits, oldest first.
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    /// Retained commits with `start <= seq < end`.
    pub fn get_range(&self, start: u64, end: u64) -> impl Iterator<Item = &Commit> {
        self.commits
            .iter()
            .filter(move |c| c.seq >= start && c.seq < end)
    }

    /// The `count` newest commits, newest first.
    pub fn get_recent(&self, count: usize) -> impl Iterator<Item = &Commit> {
        self.commits.iter().rev().take(count)
    }

    pub fn head(&self) -> CommitId {
        self.head
    }

    /// Seq of the newest commit, 0 if only genesis exists.
    pub fn current_seq(&self) -> u64 {
        self.next_seq - 1
    }

    /// Number of retained mutation commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Whether commits between genesis and the oldest retained one were
    /// dropped. A truncated log still verifies but cannot be replayed.
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    /// Check the genesis hash and every retained link.
    pub fn verify_integrity(&self) -> bool {
        match self.first_broken_link() {
            None => true,
            Some(seq) => {
                warn!("commit log chain broken at seq {}", seq);
                false
            }
        }
    }

    /// Seq of the first commit whose hash or link does not check out.
    ///
    /// The oldest retained commit of a truncated log is linked to whatever
    /// it recorded, since its predecessor is gone.
    pub(crate) fn first_broken_link(&self) -> Option<u64> {
        if self.genesis.compute_id() != self.genesis.id {
            return Some(0);
        }
        let mut expected = match self.commits.first() {
            Some(first) if self.is_truncated() => (self.dropped + 1, first.prev),
            _ => (1, self.genesis.id),
        };
        for commit in &self.commits {
            if (commit.seq, commit.prev) != expected || commit.compute_id() != commit.id {
                return Some(commit.seq);
            }
            expected = (commit.seq + 1, commit.id);
        }
        if expected.1 != self.head {
            return Some(expected.0);
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn commits_mut(&mut self) -> &mut Vec<Commit> {
        &mut self.commits
    }
}
