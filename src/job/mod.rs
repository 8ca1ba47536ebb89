// src/job/mod.rs

//! The job capability contract consumed by the workflow coordinator.
//!
//! - [`Job`] is the minimal contract: start, query status, terminate.
//! - [`process`] runs a job as a local shell command.
//! - [`fake`] provides a scripted in-memory job for tests and dry wiring.
//!
//! The coordinator never executes job work itself; it only invokes this
//! contract and observes [`JobStatus`] transitions.

pub mod fake;
pub mod process;

use std::sync::Arc;

use serde::Serialize;

pub use fake::FakeJob;
pub use process::ProcessJob;

/// Canonical job name type used throughout the crate.
pub type JobName = String;

/// Shared handle to a job implementation.
pub type JobHandle = Arc<dyn Job>;

/// Status of a job as observed by the coordinator.
///
/// The state machine is closed: `NotStarted -> Running -> {Finished, Failed,
/// Undetermined}`. `Finished` is the only success terminal; `Failed` and
/// `Undetermined` are both failure terminals for the coordinator, reported
/// separately for diagnostics. A looping workflow restarts terminal jobs,
/// which begins a fresh `Running` execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    NotStarted,
    Running,
    Finished,
    Failed,
    Undetermined,
}

impl JobStatus {
    /// Whether no further transition will occur within this pass.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Finished | JobStatus::Failed | JobStatus::Undetermined
        )
    }

    /// Whether the coordinator treats this status as a failure.
    pub fn is_failure(self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::Undetermined)
    }
}

/// An opaque unit of work with start, status query, and terminate operations.
///
/// Implementations execute out-of-band (another process, thread, or remote
/// system); all three operations must return promptly:
///
/// - [`start`](Job::start) is fire-and-forget: it begins execution and
///   returns without waiting for the work. Starting an already-terminal job
///   begins a fresh execution; starting a running job is a no-op.
/// - [`status`](Job::status) is a cheap snapshot query.
/// - [`kill`](Job::kill) requests termination, best-effort, and must be safe
///   to call in any state including already-terminal and never-started.
pub trait Job: Send + Sync {
    /// Stable unique identifier used for graph node identity and error
    /// reporting.
    fn name(&self) -> &str;

    fn start(&self);

    fn status(&self) -> JobStatus;

    fn kill(&self);
}
