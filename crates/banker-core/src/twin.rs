//! Twin driver - one command stream, two allocators
//!
//! `Twin` feeds every command to a `SafeAllocator` and a `ShadowAllocator`
//! built from independent copies of the same configuration, and reports both
//! outcomes together. The shadow shows what would have happened without
//! deadlock avoidance.

use core::fmt;

use crate::allocator::{SafeAllocator, ShadowAllocator};
use crate::config::SystemConfig;
use crate::error::ConfigError;
use crate::step::{step, Command, Outcome, StepResult};

/// Paired outcomes of one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TwinReport {
    /// Outcome on the Banker's allocator
    pub safe: Outcome,
    /// Outcome on the shadow allocator
    pub shadow: Outcome,
}

impl TwinReport {
    /// Whether the shadow ended up deadlocked after this command.
    pub fn shadow_deadlocked(&self) -> bool {
        self.shadow == Outcome::GrantedDeadlocked
    }
}

impl fmt::Display for TwinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.safe)?;
        if self.shadow_deadlocked() {
            write!(f, " ** Deadlock detected in unsafe version **")?;
        }
        Ok(())
    }
}

/// A safe allocator and its shadow, driven in lockstep.
#[derive(Clone, Debug)]
pub struct Twin {
    safe: SafeAllocator,
    shadow: ShadowAllocator,
}

impl Twin {
    /// Build both allocators. Each gets its own copy of `config`.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        let shadow = ShadowAllocator::new(config.clone())?;
        let safe = SafeAllocator::new(config)?;
        Ok(Self { safe, shadow })
    }

    /// Apply `command` to both allocators.
    pub fn apply(&mut self, command: Command) -> TwinReport {
        let (safe, shadow) = self.apply_detailed(command);
        TwinReport {
            safe: safe.outcome,
            shadow: shadow.outcome,
        }
    }

    /// Apply `command` to both allocators, keeping the committed mutations.
    pub fn apply_detailed(&mut self, command: Command) -> (StepResult, StepResult) {
        let safe = step(&mut self.safe, command);
        let shadow = step(&mut self.shadow, command);
        (safe, shadow)
    }

    /// Whether the two accounting states have drifted apart.
    pub fn diverged(&self) -> bool {
        self.safe.state().allocation() != self.shadow.state().allocation()
    }

    /// The Banker's allocator
    pub fn safe(&self) -> &SafeAllocator {
        &self.safe
    }

    /// The shadow allocator
    pub fn shadow(&self) -> &ShadowAllocator {
        &self.shadow
    }
}
