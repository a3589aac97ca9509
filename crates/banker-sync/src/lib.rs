//! Banker Sync - Serialized Access for Concurrent Callers
//!
//! The core allocators are plain single-owner state machines. This crate is
//! the only place threads enter the picture: each allocator instance sits
//! behind one mutex, and every operation holds it from validation through
//! any rollback.
//!
//! # Module Organization
//!
//! - `shared` - `SharedAllocator<P>` handle and `SyncError`
//! - `loom_tests` - Concurrency tests using loom (with `loom` feature)
//!
//! # Verification
//!
//! 1. **Loom tests** (`cargo test --features loom`): Concurrency testing
//! 2. **Unit tests**: Real threads against the std mutex

pub mod shared;

#[cfg(any(test, feature = "loom"))]
mod loom_tests;

pub use shared::{SharedAllocator, SharedSafeAllocator, SharedShadowAllocator, SyncError};
