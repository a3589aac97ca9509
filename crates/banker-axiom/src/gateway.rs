//! Axiom Gateway
//!
//! Entry point for all commands. The gateway:
//! 1. Runs `step` on the owned allocator
//! 2. Records the command and its outcome in the SysLog
//! 3. Appends any resulting mutations to the CommitLog, linked to that record
//!
//! Rejected commands therefore appear in the SysLog only.

use alloc::vec::Vec;
use banker_core::{step, AdmissionPolicy, Allocator, Command, ConfigError, Outcome, SystemConfig};
use log::trace;

use crate::commitlog::CommitLog;
use crate::syslog::SysLog;
use crate::types::{CommitId, Tick};

/// An allocator plus its submission and commit logs.
pub struct AxiomGateway<P: AdmissionPolicy> {
    allocator: Allocator<P>,
    syslog: SysLog,
    commitlog: CommitLog,
    /// Logical clock, advanced once per submission
    clock: Tick,
}

impl<P: AdmissionPolicy> AxiomGateway<P> {
    /// Create a gateway around a fresh allocator.
    ///
    /// The genesis record holds the policy name and the validated model.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        let model = config.validate()?;
        Ok(Self {
            commitlog: CommitLog::new(P::NAME, model.clone()),
            allocator: Allocator::from_model(model),
            syslog: SysLog::new(),
            clock: 0,
        })
    }

    /// Apply one command.
    ///
    /// Returns the outcome and the IDs of the commits it produced (empty for
    /// every rejected command).
    pub fn submit(&mut self, command: Command) -> (Outcome, Vec<CommitId>) {
        self.clock += 1;
        let tick = self.clock;

        let result = step(&mut self.allocator, command);
        let event = self.syslog.record(command, result.outcome, tick);
        let commit_ids = result
            .mutations
            .into_iter()
            .map(|m| self.commitlog.append(m, Some(event), tick))
            .collect();

        trace!("{} #{}: {} -> {:?}", P::NAME, event, command, result.outcome);
        (result.outcome, commit_ids)
    }

    /// The allocator (read-only; mutate through `submit`).
    pub fn allocator(&self) -> &Allocator<P> {
        &self.allocator
    }

    pub fn syslog(&self) -> &SysLog {
        &self.syslog
    }

    pub fn commitlog(&self) -> &CommitLog {
        &self.commitlog
    }

    /// Verify integrity of the commit chain.
    pub fn verify_integrity(&self) -> bool {
        self.commitlog.verify_integrity()
    }

    /// Counters for debugging and monitoring.
    pub fn state_summary(&self) -> GatewayState {
        GatewayState {
            policy: P::NAME,
            submissions: self.clock,
            syslog_len: self.syslog.len(),
            commitlog_len: self.commitlog.len(),
            commitlog_seq: self.commitlog.current_seq(),
            commitlog_head: self.commitlog.head(),
        }
    }
}

/// Summary of gateway state (for debugging/monitoring).
#[derive(Clone, Debug)]
pub struct GatewayState {
    /// Policy of the wrapped allocator
    pub policy: &'static str,
    /// Commands submitted so far
    pub submissions: u64,
    /// Records retained in the SysLog
    pub syslog_len: usize,
    /// Commits retained in the CommitLog
    pub commitlog_len: usize,
    /// Current sequence number in CommitLog
    pub commitlog_seq: u64,
    /// Head commit hash
    pub commitlog_head: CommitId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use banker_core::{Banker, Mutation, ProcessId, ResourceId, Shadow};

    fn textbook() -> SystemConfig {
        SystemConfig::new(3, 2, vec![2, 3], vec![vec![2, 1], vec![2, 2], vec![2, 2]])
    }

    #[test]
    fn test_gateway_creation() {
        let gateway = AxiomGateway::<Banker>::new(textbook()).unwrap();
        assert!(gateway.syslog().is_empty());
        assert!(gateway.commitlog().is_empty());

        let genesis = gateway.commitlog().genesis();
        assert_eq!(genesis.policy, "safe");
        assert_eq!(genesis.model.to_config(), textbook());
        assert_eq!(gateway.commitlog().head(), genesis.id);
    }

    #[test]
    fn test_gateway_rejects_bad_config() {
        let result = AxiomGateway::<Shadow>::new(SystemConfig::new(1, 1, vec![-1], vec![vec![0]]));
        assert!(matches!(result, Err(ConfigError::NegativeTotal { .. })));
    }

    #[test]
    fn test_gateway_rejected_command_has_no_commits() {
        let mut gateway = AxiomGateway::<Banker>::new(textbook()).unwrap();

        let (outcome, commits) = gateway.submit(Command::request(0, 0, -1));
        assert_eq!(outcome, Outcome::InvalidAmount);
        assert!(commits.is_empty());
        assert_eq!(gateway.syslog().len(), 1);
        assert!(gateway.commitlog().is_empty());
    }

    #[test]
    fn test_gateway_denied_request_is_audited_not_committed() {
        let mut gateway = AxiomGateway::<Banker>::new(textbook()).unwrap();
        gateway.submit(Command::request(0, 1, 1));
        gateway.submit(Command::request(2, 1, 2));

        let (outcome, commits) = gateway.submit(Command::request(1, 0, 1));
        assert_eq!(outcome, Outcome::DeniedUnsafe);
        assert!(commits.is_empty());
        assert_eq!(gateway.syslog().len(), 3);
        assert_eq!(gateway.commitlog().len(), 2);
        assert_eq!(gateway.syslog().outcome_of(2), Some(Outcome::DeniedUnsafe));
    }

    #[test]
    fn test_gateway_commit_links_to_submission() {
        let mut gateway = AxiomGateway::<Shadow>::new(textbook()).unwrap();
        gateway.submit(Command::request(0, 0, 5)); // claim exceeded
        let (outcome, commits) = gateway.submit(Command::request(1, 0, 1));

        assert_eq!(outcome, Outcome::Granted);
        assert_eq!(commits.len(), 1);
        let commit = &gateway.commitlog().commits()[0];
        assert_eq!(commit.id, commits[0]);
        assert_eq!(commit.seq, 1);
        assert_eq!(commit.caused_by, Some(1));
        assert_eq!(commit.tick, 2);
        assert_eq!(
            commit.mutation,
            Mutation::Allocated {
                process: ProcessId(1),
                resource: ResourceId(0),
                units: 1
            }
        );
    }

    #[test]
    fn test_gateway_state_summary() {
        let mut gateway = AxiomGateway::<Shadow>::new(textbook()).unwrap();
        gateway.submit(Command::request(1, 0, 1));
        gateway.submit(Command::release(1, 0, 2));

        let state = gateway.state_summary();
        assert_eq!(state.policy, "shadow");
        assert_eq!(state.submissions, 2);
        assert_eq!(state.syslog_len, 2);
        assert_eq!(state.commitlog_len, 1);
        assert_eq!(state.commitlog_seq, 1);
        assert_eq!(state.commitlog_head, gateway.commitlog().head());
        assert!(gateway.verify_integrity());
    }
}
