// src/job/fake.rs

//! Scripted in-memory job used by tests.
//!
//! `FakeJob` never does real work: each start consumes the next scripted
//! outcome, optionally holding `Running` for a number of status polls first.
//! Start and kill invocations are counted so tests can assert on the
//! coordinator's behaviour.

use std::sync::Mutex;

use tracing::debug;

use crate::job::{Job, JobStatus};

pub struct FakeJob {
    name: String,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    status: JobStatus,
    starts: u32,
    kills: u32,
    /// How many status polls report `Running` after each start before the
    /// scripted outcome becomes visible.
    running_polls: u32,
    polls_left: u32,
    /// Outcome per start; the last entry repeats for further starts.
    outcomes: Vec<JobStatus>,
}

impl FakeJob {
    /// A job whose Nth start yields `outcomes[N]` (last entry repeats).
    pub fn new(name: impl Into<String>, outcomes: Vec<JobStatus>) -> Self {
        assert!(!outcomes.is_empty(), "FakeJob needs at least one outcome");
        Self {
            name: name.into(),
            state: Mutex::new(State {
                status: JobStatus::NotStarted,
                starts: 0,
                kills: 0,
                running_polls: 0,
                polls_left: 0,
                outcomes,
            }),
        }
    }

    /// A job that finishes successfully on every start.
    pub fn finishing(name: impl Into<String>) -> Self {
        Self::new(name, vec![JobStatus::Finished])
    }

    /// A job that fails on every start.
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, vec![JobStatus::Failed])
    }

    /// A job that ends in an undetermined state on every start.
    pub fn undetermined(name: impl Into<String>) -> Self {
        Self::new(name, vec![JobStatus::Undetermined])
    }

    /// A job that finishes for `passes` starts, then fails. Used to bound
    /// looping-workflow tests.
    pub fn failing_after(name: impl Into<String>, passes: u32) -> Self {
        let mut outcomes = vec![JobStatus::Finished; passes as usize];
        outcomes.push(JobStatus::Failed);
        Self::new(name, outcomes)
    }

    /// Report `Running` for `polls` status queries after each start before
    /// the scripted outcome becomes visible.
    pub fn with_running_polls(self, polls: u32) -> Self {
        self.state.lock().unwrap().running_polls = polls;
        self
    }

    pub fn start_count(&self) -> u32 {
        self.state.lock().unwrap().starts
    }

    pub fn kill_count(&self) -> u32 {
        self.state.lock().unwrap().kills
    }
}

impl Job for FakeJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self) {
        let mut state = self.state.lock().unwrap();
        state.starts += 1;
        state.polls_left = state.running_polls;
        state.status = JobStatus::Running;
        debug!(job = %self.name, start = state.starts, "fake job started");
    }

    fn status(&self) -> JobStatus {
        let mut state = self.state.lock().unwrap();
        if state.status != JobStatus::Running {
            return state.status;
        }
        if state.polls_left > 0 {
            state.polls_left -= 1;
            return JobStatus::Running;
        }
        let idx = (state.starts.max(1) as usize - 1).min(state.outcomes.len() - 1);
        state.status = state.outcomes[idx];
        state.status
    }

    fn kill(&self) {
        let mut state = self.state.lock().unwrap();
        state.kills += 1;
        if state.status == JobStatus::Running {
            state.status = JobStatus::Failed;
        }
        debug!(job = %self.name, kills = state.kills, "fake job killed");
    }
}
