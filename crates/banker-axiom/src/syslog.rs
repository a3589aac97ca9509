//! Submission log
//!
//! One record per command handed to the gateway, kept whether or not the
//! command changed anything. Denied and malformed commands only ever show
//! up here; the CommitLog holds mutations alone.

use alloc::vec::Vec;
use banker_core::{Command, Outcome};

use crate::types::{EventId, Tick};

/// Default number of records retained
pub const DEFAULT_SYSLOG_CAPACITY: usize = 10_000;

/// A submitted command and what the allocator answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SysEvent {
    pub id: EventId,
    pub tick: Tick,
    /// Raw command, exactly as submitted
    pub command: Command,
    pub outcome: Outcome,
}

impl SysEvent {
    /// Whether this submission produced a commit.
    pub fn committed(&self) -> bool {
        self.outcome.is_committed()
    }
}

/// Bounded, append-only submission log.
///
/// IDs keep counting when old records are dropped, so an ID is never
/// reused.
#[derive(Clone, Debug)]
pub struct SysLog {
    events: Vec<SysEvent>,
    next_id: EventId,
    capacity: usize,
}

impl Default for SysLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SYSLOG_CAPACITY)
    }
}

impl SysLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log retaining at most `capacity` records (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            next_id: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append a record and return its ID.
    pub fn record(&mut self, command: Command, outcome: Outcome, tick: Tick) -> EventId {
        let id = self.next_id;
        self.next_id += 1;
        if self.events.len() == self.capacity {
            self.events.remove(0);
        }
        self.events.push(SysEvent {
            id,
            tick,
            command,
            outcome,
        });
        id
    }

    /// Retained records, oldest first.
    pub fn events(&self) -> &[SysEvent] {
        &self.events
    }

    /// Look up a retained record.
    pub fn get(&self, id: EventId) -> Option<&SysEvent> {
        let first = self.events.first()?.id;
        let index = usize::try_from(id.checked_sub(first)?).ok()?;
        self.events.get(index)
    }

    /// The `count` newest records, newest first.
    pub fn get_recent(&self, count: usize) -> impl Iterator<Item = &SysEvent> {
        self.events.iter().rev().take(count)
    }

    pub fn outcome_of(&self, id: EventId) -> Option<Outcome> {
        self.get(id).map(|e| e.outcome)
    }

    /// Retained records whose command changed nothing.
    pub fn rejected(&self) -> impl Iterator<Item = &SysEvent> {
        self.events.iter().filter(|e| !e.committed())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// ID the next record will get; also the total ever recorded.
    pub fn next_id(&self) -> EventId {
        self.next_id
    }
}
