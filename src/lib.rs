// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod job;
pub mod logging;
pub mod workflow;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::dag::{JobRegistry, batch};
use crate::job::{JobHandle, ProcessJob};
use crate::workflow::Workflow;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - one process-backed job per `[job.<name>]` section
/// - the workflow coordinator
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let workflow = workflow_from_config(&cfg, args.looping)?;
    workflow.run().await?;
    Ok(())
}

/// Build a [`Workflow`] of [`ProcessJob`]s from a validated config.
///
/// `force_loop` turns looping on regardless of the config's `loop` setting
/// (the `--loop` flag).
pub fn workflow_from_config(cfg: &ConfigFile, force_loop: bool) -> Result<Workflow> {
    let mut workflow = Workflow::new(cfg.workflow.name.clone());
    workflow.set_loop(cfg.workflow.looping || force_loop);
    workflow.set_poll_interval(cfg.workflow.poll_interval());

    // One shared handle per config entry, so a job referenced as a
    // dependency and the same job registered directly resolve to the same
    // node.
    let jobs: BTreeMap<String, JobHandle> = cfg
        .job
        .iter()
        .map(|(name, job_cfg)| {
            let handle: JobHandle = Arc::new(ProcessJob::new(name.clone(), job_cfg.cmd.clone()));
            (name.clone(), handle)
        })
        .collect();

    for (name, job_cfg) in cfg.job.iter() {
        let mut deps = Vec::with_capacity(job_cfg.depends_on.len());
        for dep in &job_cfg.depends_on {
            let handle = jobs
                .get(dep)
                .with_context(|| format!("job '{name}' depends on unknown job '{dep}'"))?;
            deps.push(handle.clone());
        }
        let handle = jobs
            .get(name)
            .with_context(|| format!("job '{name}' missing from job table"))?;
        workflow.add_job(handle.clone(), deps)?;
    }

    Ok(workflow)
}

/// Simple dry-run output: print jobs, deps, commands and the batch order.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    println!("flowdag dry-run");
    println!("  workflow.name = {}", cfg.workflow.name);
    println!("  workflow.loop = {}", cfg.workflow.looping);
    println!("  workflow.poll_interval_ms = {}", cfg.workflow.poll_interval_ms);
    println!();

    println!("jobs ({}):", cfg.job.len());
    for (name, job) in cfg.job.iter() {
        println!("  - {name}");
        println!("      cmd: {}", job.cmd);
        if !job.depends_on.is_empty() {
            println!("      depends_on: {:?}", job.depends_on);
        }
    }
    println!();

    let mut registry = JobRegistry::new();
    for (name, job_cfg) in cfg.job.iter() {
        let handle: JobHandle = Arc::new(ProcessJob::new(name.clone(), job_cfg.cmd.clone()));
        // Dependencies resolve by name when the graph is built; fresh
        // handles are fine here since nothing runs.
        let deps = job_cfg
            .depends_on
            .iter()
            .map(|dep| {
                let cmd = cfg.job.get(dep).map(|j| j.cmd.clone()).unwrap_or_default();
                Arc::new(ProcessJob::new(dep.clone(), cmd)) as JobHandle
            })
            .collect();
        registry.register(handle, deps)?;
    }

    let graph = registry.build();
    let batches = batch(&graph)?;
    println!("batch order ({} batches):", batches.len());
    for (index, nodes) in batches.iter().enumerate() {
        let names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
        println!("  {index}: {names:?}");
    }

    Ok(())
}
