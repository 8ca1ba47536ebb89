// src/errors.rs

//! Crate-wide error types and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A job or dependency was registered with an empty name.
    ///
    /// Name validity is the only capability check left at runtime; the rest
    /// of the job contract is enforced by the [`Job`](crate::job::Job) trait
    /// bound at compile time.
    #[error("Invalid job name: {0}")]
    InvalidJobName(String),

    #[error("Job '{0}' already exists in workflow")]
    DuplicateJob(String),

    /// The dependency graph is not acyclic. Carries the names of the nodes
    /// that could not be placed in any batch.
    #[error("Cycle detected in dependency graph involving jobs: {0:?}")]
    CyclicDependency(Vec<String>),

    /// `run()` was invoked a second time on the same workflow instance.
    #[error("Workflow metadata already computed; a workflow instance runs at most once")]
    MetadataAlreadyComputed,

    /// Metadata was read before the first `run()` computed it.
    #[error("Workflow metadata not computed yet; call run() first")]
    MetadataNotComputed,

    /// One or more jobs in a batch ended in a failure state. Raised after a
    /// best-effort kill of every job in the batch; later batches never start.
    #[error("Batch failed; failed jobs: {failed:?}, undetermined jobs: {undetermined:?}")]
    BatchFailure {
        failed: Vec<String>,
        undetermined: Vec<String>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
