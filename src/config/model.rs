// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file:
///
/// ```toml
/// [workflow]
/// name = "pipeline"
/// loop = false
/// poll_interval_ms = 1000
///
/// [job.build]
/// cmd = "cargo build"
///
/// [job.test]
/// cmd = "cargo test"
/// depends_on = ["build"]
/// ```
///
/// The `[workflow]` section is optional and has reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Workflow-level settings from `[workflow]`.
    #[serde(default)]
    pub workflow: WorkflowSection,

    /// All jobs from `[job.<name>]`.
    ///
    /// Keys are the *job names* (e.g. `"build"`, `"test"`).
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[workflow]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSection {
    /// Workflow name, used for logging and error reporting.
    #[serde(default = "default_workflow_name")]
    pub name: String,

    /// Whether the whole batch sequence repeats until a batch fails.
    ///
    /// `loop` is a Rust keyword, hence the rename.
    #[serde(default, rename = "loop")]
    pub looping: bool,

    /// Interval between status polls while waiting on a batch, in
    /// milliseconds. Workflow-level, never per-job.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_workflow_name() -> String {
    "flowdag".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            name: default_workflow_name(),
            looping: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl WorkflowSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `[job.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// The command to execute.
    pub cmd: String,

    /// Names of jobs that must finish before this one starts.
    #[serde(default)]
    pub depends_on: Vec<String>,
}
