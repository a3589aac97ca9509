//! Identifiers shared by the audit logs.

/// Submission record identifier (monotonic, unique within a SysLog)
pub type EventId = u64;

/// Chained commit hash
pub type CommitId = u64;

/// Logical time: the gateway's submission counter
pub type Tick = u64;
