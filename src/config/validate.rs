// src/config/validate.rs

use anyhow::{Result, anyhow};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one job
/// - all `depends_on` entries refer to existing jobs
/// - no job depends on itself
/// - the job graph has no cycles
///
/// Everything here fails before any process is spawned.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_job_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &ConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(anyhow!("config must contain at least one [job.<name>] section"));
    }
    Ok(())
}

fn validate_job_dependencies(cfg: &ConfigFile) -> Result<()> {
    for (name, job) in cfg.job.iter() {
        for dep in job.depends_on.iter() {
            if !cfg.job.contains_key(dep) {
                return Err(anyhow!(
                    "job '{}' has unknown dependency '{}' in `depends_on`",
                    name,
                    dep
                ));
            }
            if dep == name {
                return Err(anyhow!(
                    "job '{}' cannot depend on itself in `depends_on`",
                    name
                ));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &ConfigFile) -> Result<()> {
    // Edge direction: dep -> job. For:
    //   [job.test]
    //   depends_on = ["build"]
    // we add edge build -> test.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.job.keys() {
        graph.add_node(name.as_str());
    }

    for (name, job) in cfg.job.iter() {
        for dep in job.depends_on.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(anyhow!(
                "cycle detected in job dependencies involving job '{}'",
                node
            ))
        }
    }
}
