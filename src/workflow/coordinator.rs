// src/workflow/coordinator.rs

//! The workflow coordinator: registration surface and the run-loop.

use std::sync::OnceLock;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::dag::{JobRegistry, Node, batch};
use crate::errors::{Result, WorkflowError};
use crate::job::{JobHandle, JobStatus};
use crate::workflow::metadata::WorkflowMetadata;

/// Interval between status polls while waiting on a batch.
///
/// A coordinator-level tunable (see [`Workflow::set_poll_interval`]), never
/// per-job.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A named set of jobs with dependency relationships, executed batch by
/// batch in dependency order.
///
/// Jobs are registered with [`add_job`](Workflow::add_job) before the first
/// run. The first [`run`](Workflow::run) computes the workflow metadata
/// (nodes, batch sequence, graph) exactly once into a write-once cell; the
/// instance then executes one pass over the batch sequence, or unboundedly
/// many when the loop flag is set. A second `run` on the same instance is a
/// usage bug and fails with [`WorkflowError::MetadataAlreadyComputed`].
pub struct Workflow {
    name: String,
    looping: bool,
    poll_interval: Duration,
    registry: JobRegistry,
    metadata: OnceLock<WorkflowMetadata>,
}

impl Workflow {
    /// Create a workflow with the loop flag off.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            looping: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            registry: JobRegistry::new(),
            metadata: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the whole batch sequence repeats until a batch fails.
    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    /// Register a job and its direct dependencies.
    ///
    /// Dependencies are job handles, not names, and need not be registered
    /// as top-level jobs themselves; referencing one creates its node on
    /// demand when the graph is built.
    pub fn add_job(&mut self, job: JobHandle, deps: Vec<JobHandle>) -> Result<()> {
        self.registry.register(job, deps)
    }

    /// Read-only access to the computed metadata.
    ///
    /// Fails with [`WorkflowError::MetadataNotComputed`] before the first
    /// run.
    pub fn metadata(&self) -> Result<&WorkflowMetadata> {
        self.metadata
            .get()
            .ok_or(WorkflowError::MetadataNotComputed)
    }

    /// Execute the workflow once, or forever when looping.
    ///
    /// Structural errors (cycles) surface here before any job starts. A
    /// failing batch ends the run with [`WorkflowError::BatchFailure`]
    /// regardless of the loop flag; later batches never start.
    pub async fn run(&self) -> Result<()> {
        let metadata = self.compute_metadata()?;

        info!(
            workflow = %self.name,
            jobs = metadata.nodes().len(),
            batches = metadata.batches().len(),
            looping = self.looping,
            "starting workflow run"
        );

        let mut pass: u64 = 0;
        let mut first_pass = true;
        while first_pass || self.looping {
            first_pass = false;
            pass += 1;
            debug!(workflow = %self.name, pass, "starting pass over batch sequence");

            for (index, nodes) in metadata.batches().iter().enumerate() {
                self.execute_and_wait(index, nodes).await?;
            }
        }

        info!(workflow = %self.name, "workflow run finished");
        Ok(())
    }

    /// Compute metadata exactly once for this instance.
    fn compute_metadata(&self) -> Result<&WorkflowMetadata> {
        if self.metadata.get().is_some() {
            return Err(WorkflowError::MetadataAlreadyComputed);
        }

        let graph = self.registry.build();
        let batches = batch(&graph)?;
        let nodes: Vec<Node> = graph.nodes().cloned().collect();

        self.metadata
            .set(WorkflowMetadata::new(nodes, batches, graph))
            .map_err(|_| WorkflowError::MetadataAlreadyComputed)?;
        self.metadata()
    }

    /// Start every job in the batch, then poll until all finish or any
    /// fails.
    ///
    /// Starts are sequential and fire-and-forget; polling is sequential
    /// within one pass, with a fixed sleep between passes as the only
    /// suspension point. On failure, every job in the batch gets a
    /// best-effort kill before the error is returned.
    async fn execute_and_wait(&self, index: usize, batch: &[Node]) -> Result<()> {
        let names: Vec<&str> = batch.iter().map(|n| n.name()).collect();
        info!(workflow = %self.name, batch = index, jobs = ?names, "starting batch");

        for node in batch {
            node.job().start();
        }

        loop {
            let mut all_finished = true;
            let mut failed: Vec<String> = Vec::new();
            let mut undetermined: Vec<String> = Vec::new();

            for node in batch {
                match node.job().status() {
                    JobStatus::Finished => {}
                    JobStatus::Failed => {
                        all_finished = false;
                        failed.push(node.name().to_string());
                    }
                    JobStatus::Undetermined => {
                        all_finished = false;
                        undetermined.push(node.name().to_string());
                    }
                    JobStatus::NotStarted | JobStatus::Running => {
                        all_finished = false;
                    }
                }
            }

            if all_finished {
                debug!(workflow = %self.name, batch = index, "batch finished");
                return Ok(());
            }

            if !failed.is_empty() || !undetermined.is_empty() {
                warn!(
                    workflow = %self.name,
                    batch = index,
                    ?failed,
                    ?undetermined,
                    "batch failed; killing all jobs in batch"
                );
                self.kill_batch(batch);
                return Err(WorkflowError::BatchFailure {
                    failed,
                    undetermined,
                });
            }

            sleep(self.poll_interval).await;
        }
    }

    /// Best-effort kill of every job in the batch, running or already
    /// terminal.
    fn kill_batch(&self, batch: &[Node]) {
        for node in batch {
            node.job().kill();
        }
    }
}
