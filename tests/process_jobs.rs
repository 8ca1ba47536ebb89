// tests/process_jobs.rs

//! End-to-end runs over real shell commands.

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use flowdag::errors::WorkflowError;
use flowdag::job::{Job, JobHandle, JobStatus, ProcessJob};
use flowdag::workflow::Workflow;

type TestResult = Result<(), Box<dyn Error>>;

const TEST_POLL: Duration = Duration::from_millis(20);

#[tokio::test]
async fn chain_of_real_commands_finishes_in_order() -> TestResult {
    with_timeout(async {
        init_tracing();

        let a = Arc::new(ProcessJob::new("a", "exit 0"));
        let b = Arc::new(ProcessJob::new("b", "exit 0"));

        let mut workflow = Workflow::new("real-chain");
        workflow.set_poll_interval(TEST_POLL);
        workflow.add_job(b.clone() as JobHandle, vec![a.clone() as JobHandle])?;
        workflow.add_job(a.clone() as JobHandle, vec![])?;

        workflow.run().await?;

        assert_eq!(a.status(), JobStatus::Finished);
        assert_eq!(b.status(), JobStatus::Finished);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn failing_command_fails_the_run() -> TestResult {
    with_timeout(async {
        init_tracing();

        let ok = Arc::new(ProcessJob::new("ok", "exit 0"));
        let bad = Arc::new(ProcessJob::new("bad", "exit 3"));
        let never = Arc::new(ProcessJob::new("never", "exit 0"));

        let mut workflow = Workflow::new("real-failure");
        workflow.set_poll_interval(TEST_POLL);
        workflow.add_job(ok.clone() as JobHandle, vec![])?;
        workflow.add_job(bad.clone() as JobHandle, vec![])?;
        workflow.add_job(
            never.clone() as JobHandle,
            vec![ok.clone() as JobHandle, bad.clone() as JobHandle],
        )?;

        let err = workflow.run().await.expect_err("run must fail");
        match err {
            WorkflowError::BatchFailure { failed, .. } => {
                assert!(failed.contains(&"bad".to_string()));
            }
            other => panic!("expected BatchFailure, got {other:?}"),
        }

        assert_eq!(bad.status(), JobStatus::Failed);
        assert_eq!(never.status(), JobStatus::NotStarted);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn long_running_sibling_is_killed_on_batch_failure() -> TestResult {
    with_timeout(async {
        init_tracing();

        // `slow` would run far past the test timeout if the fail-fast kill
        // did not reach it.
        let slow = Arc::new(ProcessJob::new("slow", "sleep 30"));
        let bad = Arc::new(ProcessJob::new("bad", "exit 1"));

        let mut workflow = Workflow::new("real-kill");
        workflow.set_poll_interval(TEST_POLL);
        workflow.add_job(slow.clone() as JobHandle, vec![])?;
        workflow.add_job(bad.clone() as JobHandle, vec![])?;

        let err = workflow.run().await.expect_err("run must fail");
        assert!(matches!(err, WorkflowError::BatchFailure { .. }));

        // The kill is asynchronous; give the monitor a moment to reap the
        // child and record the terminal status.
        for _ in 0..100 {
            if slow.status().is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(slow.status(), JobStatus::Failed);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn spawn_failure_surfaces_as_failed_status() -> TestResult {
    with_timeout(async {
        init_tracing();

        // A command that the shell itself cannot find still spawns `sh`,
        // which exits non-zero; either way the job must end up Failed.
        let bogus = Arc::new(ProcessJob::new("bogus", "no_such_command_flowdag_test"));

        let mut workflow = Workflow::new("real-bogus");
        workflow.set_poll_interval(TEST_POLL);
        workflow.add_job(bogus.clone() as JobHandle, vec![])?;

        let err = workflow.run().await.expect_err("run must fail");
        assert!(matches!(err, WorkflowError::BatchFailure { .. }));
        assert_eq!(bogus.status(), JobStatus::Failed);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn kill_is_safe_in_any_state() -> TestResult {
    with_timeout(async {
        init_tracing();

        let job = ProcessJob::new("idle", "exit 0");

        // Never started.
        job.kill();
        assert_eq!(job.status(), JobStatus::NotStarted);

        // Already terminal.
        let done = Arc::new(ProcessJob::new("done", "exit 0"));
        let mut workflow = Workflow::new("real-kill-idempotent");
        workflow.set_poll_interval(TEST_POLL);
        workflow.add_job(done.clone() as JobHandle, vec![])?;
        workflow.run().await?;

        assert_eq!(done.status(), JobStatus::Finished);
        done.kill();
        done.kill();
        assert_eq!(done.status(), JobStatus::Finished);

        Ok(())
    })
    .await
}
