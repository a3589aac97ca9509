//! Banker Core - Pure State Machine for Deadlock Avoidance and Detection
//!
//! This crate contains the **pure, I/O-free** allocator state machine: a
//! Banker's-algorithm allocator that refuses to enter unsafe states, and a
//! shadow twin that grants anything that fits and reports deadlock.
//!
//! # Design Principles
//!
//! 1. **One state machine**: validation and bookkeeping are shared; only the
//!    admission policy differs between the two allocators
//! 2. **No I/O or side effects**: Pure state transformations only
//! 3. **Deterministic**: Same command stream always produces the same outcomes
//! 4. **Verifiable**: Small enough for exhaustive tests and Kani proofs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       banker-core                           │
//! │                                                             │
//! │   ┌───────────────┐    ┌───────────────┐                    │
//! │   │ ResourceState │    │    step()     │                    │
//! │   │ - available   │───▶│  raw command  │                    │
//! │   │ - allocation  │    │  → Outcome    │                    │
//! │   │ - max_claim   │    └───────────────┘                    │
//! │   └───────────────┘                                         │
//! │                                                             │
//! │   ┌───────────────┐    ┌───────────────┐                    │
//! │   │ Allocator<P>  │    │  Invariants   │                    │
//! │   │ Banker/Shadow │    │  Assertions   │                    │
//! │   └───────────────┘    └───────────────┘                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              │ used by
//!                              ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │       banker-axiom       │   │         banker-sync          │
//! │  SysLog, CommitLog,      │   │  Mutex-serialized shared     │
//! │  gateway, replay         │   │  allocator                   │
//! └──────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - `types` - Identifiers, units, verdicts, mutations
//! - `config` - Raw `SystemConfig` and validated `ResourceModel`
//! - `error` - Configuration and allocation errors
//! - `state` - `ResourceState` accounting tables, validation, bookkeeping
//! - `verify` - Safety and deadlock checks, admission policies
//! - `allocator` - `Allocator<P>` with `SafeAllocator`/`ShadowAllocator`
//! - `step` - Pure `step(allocator, command) -> StepResult` function
//! - `twin` - Drives both allocators with one command stream
//! - `invariants` - Invariant assertions for verification

#![no_std]
extern crate alloc;

pub mod allocator;
pub mod config;
pub mod error;
pub mod invariants;
pub mod state;
pub mod step;
pub mod twin;
pub mod types;
pub mod verify;

// Re-export all public types for convenient access
pub use allocator::{Allocator, SafeAllocator, ShadowAllocator};
pub use config::{ResourceModel, SystemConfig};
pub use error::{AllocError, ConfigError};
pub use invariants::{assert_invariants, check_all_invariants, InvariantViolation};
pub use state::ResourceState;
pub use step::{step, Command, Outcome, StepResult};
pub use twin::{Twin, TwinReport};
pub use types::{Grant, Mutation, ProcessId, ResourceId, Units, Verdict};
pub use verify::{AdmissionPolicy, Banker, Shadow};
