//! Banker Axiom Layer
//!
//! In-memory audit trail for one allocator:
//! - **SysLog**: every submitted command with its outcome, rejected ones included
//! - **CommitLog**: hash-chained record of committed mutations
//! - **AxiomGateway**: entry point that applies commands and records both
//! - **replay**: rebuilds an allocator from its CommitLog through `request`
//!   and `release`, policy check included
//!
//! # Replay Guarantee
//!
//! > An untrimmed CommitLog always replays to the state that produced it.
//!
//! Once the CommitLog has dropped old commits it still verifies, but replay
//! returns `ReplayError::Truncated`.

#![no_std]
extern crate alloc;

pub mod commitlog;
pub mod gateway;
pub mod replay;
pub mod syslog;
pub mod types;

pub use commitlog::{Commit, CommitLog, Genesis, DEFAULT_COMMITLOG_CAPACITY};
pub use gateway::{AxiomGateway, GatewayState};
pub use replay::{replay, replay_and_verify, ReplayError, ReplayResult};
pub use syslog::{SysEvent, SysLog, DEFAULT_SYSLOG_CAPACITY};
pub use types::*;
