// src/job/process.rs

//! Local-process job: each start runs a shell command.

use std::process::Stdio;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::job::{Job, JobStatus};

/// A [`Job`] that executes a shell command in a child process.
///
/// `start()` spawns the process plus one monitor task and returns
/// immediately; the monitor observes the exit status and records the
/// terminal [`JobStatus`]. `kill()` signals the monitor, which terminates
/// the child. Starting a terminal job re-runs the command, which is what a
/// looping workflow relies on.
pub struct ProcessJob {
    name: String,
    cmd: String,
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    status: JobStatus,
    /// Bumped on every start; stale monitors must not write status.
    epoch: u64,
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl ProcessJob {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            inner: Arc::new(Mutex::new(Inner {
                status: JobStatus::NotStarted,
                epoch: 0,
                cancel_tx: None,
            })),
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    fn set_status(inner: &Arc<Mutex<Inner>>, epoch: u64, status: JobStatus) {
        let mut guard = inner.lock().unwrap();
        if guard.epoch != epoch {
            // A newer start superseded this execution; its monitor owns the
            // status now.
            return;
        }
        guard.status = status;
        if status.is_terminal() {
            guard.cancel_tx = None;
        }
    }
}

impl Job for ProcessJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) {
        let (epoch, cancel_rx) = {
            let mut guard = self.inner.lock().unwrap();
            if guard.status == JobStatus::Running {
                warn!(job = %self.name, "start() called while already running; ignoring");
                return;
            }
            guard.epoch += 1;
            guard.status = JobStatus::Running;
            let (tx, rx) = oneshot::channel();
            guard.cancel_tx = Some(tx);
            (guard.epoch, rx)
        };

        info!(job = %self.name, cmd = %self.cmd, "starting job process");

        let name = self.name.clone();
        let cmd = self.cmd.clone();
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let status = monitor_process(&name, &cmd, cancel_rx).await;
            ProcessJob::set_status(&inner, epoch, status);
        });
    }

    fn status(&self) -> JobStatus {
        self.inner.lock().unwrap().status
    }

    fn kill(&self) {
        let cancel_tx = self.inner.lock().unwrap().cancel_tx.take();
        match cancel_tx {
            Some(tx) => {
                info!(job = %self.name, "kill requested; signalling monitor");
                // The monitor may already have exited; nothing to do then.
                let _ = tx.send(());
            }
            None => {
                debug!(job = %self.name, "kill requested but no execution in flight");
            }
        }
    }
}

/// Run the command to completion (or cancellation) and return the terminal
/// status for this execution.
async fn monitor_process(
    name: &str,
    cmd: &str,
    mut cancel_rx: oneshot::Receiver<()>,
) -> JobStatus {
    let mut child = match spawn_shell(name, cmd) {
        Ok(child) => child,
        Err(err) => {
            warn!(job = %name, error = %err, "failed to spawn job process");
            return JobStatus::Failed;
        }
    };

    drain_output(name, &mut child);

    tokio::select! {
        status_res = child.wait() => {
            match status_res {
                Ok(status) => {
                    let code = status.code().unwrap_or(-1);
                    info!(
                        job = %name,
                        exit_code = code,
                        success = status.success(),
                        "job process exited"
                    );
                    if status.success() {
                        JobStatus::Finished
                    } else {
                        JobStatus::Failed
                    }
                }
                Err(err) => {
                    // The process outcome cannot be established.
                    warn!(job = %name, error = %err, "waiting for job process failed");
                    JobStatus::Undetermined
                }
            }
        }

        cancel = &mut cancel_rx => {
            if cancel.is_ok() {
                info!(job = %name, "termination requested; killing job process");
            }
            if let Err(err) = child.kill().await {
                warn!(job = %name, error = %err, "failed to kill job process");
                return JobStatus::Undetermined;
            }
            JobStatus::Failed
        }
    }
}

/// Build and spawn a shell command appropriate for the platform.
fn spawn_shell(name: &str, cmd: &str) -> Result<Child> {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    command
        .spawn()
        .with_context(|| format!("spawning process for job '{name}'"))
}

/// Consume stdout/stderr so pipe buffers don't fill; log at debug.
fn drain_output(name: &str, child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        let job = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(job = %job, "stdout: {}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let job = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(job = %job, "stderr: {}", line);
            }
        });
    }
}
