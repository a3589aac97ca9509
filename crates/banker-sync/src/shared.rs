//! Shared allocator handle
//!
//! `SharedAllocator<P>` wraps one allocator instance in a mutex so that
//! concurrent callers are serialized: each `request`, `release` or query
//! runs to completion (including the provisional commit, the policy check and
//! any rollback) before the next one observes the state.
//!
//! Under the `loom` feature the mutex and `Arc` come from loom, so the loom
//! tests explore every interleaving of the real implementation.

use banker_core::{
    step, AdmissionPolicy, AllocError, Allocator, Banker, Command, ConfigError, Grant, ProcessId,
    ResourceId, Shadow, StepResult, SystemConfig, Units,
};
use log::warn;
use thiserror::Error;

#[cfg(feature = "loom")]
use loom::sync::{Arc, Mutex, MutexGuard};
#[cfg(not(feature = "loom"))]
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared Banker's-algorithm allocator
pub type SharedSafeAllocator = SharedAllocator<Banker>;

/// Shared shadow allocator
pub type SharedShadowAllocator = SharedAllocator<Shadow>;

/// Errors from a shared allocator handle.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Another caller panicked while holding the lock
    #[error("allocator lock poisoned")]
    Poisoned,

    /// The operation itself was rejected
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Cloneable handle to one mutex-protected allocator.
pub struct SharedAllocator<P: AdmissionPolicy> {
    inner: Arc<Mutex<Allocator<P>>>,
}

impl<P: AdmissionPolicy> SharedAllocator<P> {
    /// Build a fresh allocator behind a new lock.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_allocator(Allocator::new(config)?))
    }

    /// Take ownership of an existing allocator.
    pub fn from_allocator(allocator: Allocator<P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(allocator)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Allocator<P>>, SyncError> {
        self.inner.lock().map_err(|_| {
            warn!("{} allocator lock poisoned", P::NAME);
            SyncError::Poisoned
        })
    }

    /// `Allocator::request` under the lock.
    pub fn request(
        &self,
        process: ProcessId,
        resource: ResourceId,
        units: Units,
    ) -> Result<Grant, SyncError> {
        Ok(self.lock()?.request(process, resource, units)?)
    }

    /// `Allocator::release` under the lock.
    pub fn release(
        &self,
        process: ProcessId,
        resource: ResourceId,
        units: Units,
    ) -> Result<(), SyncError> {
        Ok(self.lock()?.release(process, resource, units)?)
    }

    /// `step` under the lock.
    pub fn step(&self, command: Command) -> Result<StepResult, SyncError> {
        let mut guard = self.lock()?;
        Ok(step(&mut *guard, command))
    }

    /// Run a read-only query against a consistent state.
    pub fn with<R>(&self, f: impl FnOnce(&Allocator<P>) -> R) -> Result<R, SyncError> {
        Ok(f(&*self.lock()?))
    }

    /// Whether the current state is safe.
    pub fn is_safe(&self) -> Result<bool, SyncError> {
        self.with(|a| a.is_safe())
    }

    /// Whether the current state is deadlocked.
    pub fn is_deadlocked(&self) -> Result<bool, SyncError> {
        self.with(|a| a.is_deadlocked())
    }

    /// Copy of the allocator at this instant.
    pub fn snapshot(&self) -> Result<Allocator<P>, SyncError> {
        self.with(|a| a.clone())
    }
}

impl<P: AdmissionPolicy> Clone for SharedAllocator<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
