// src/dag/graph.rs

//! Job registry and dependency graph.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::errors::{Result, WorkflowError};
use crate::job::{JobHandle, JobName};

/// A (name, job) pair. Two nodes are equal iff their names are equal: a job
/// referenced as a dependency and the same job registered directly resolve
/// to the same logical node.
#[derive(Clone)]
pub struct Node {
    name: JobName,
    job: JobHandle,
}

impl Node {
    fn new(name: JobName, job: JobHandle) -> Self {
        Self { name, job }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job(&self) -> &JobHandle {
        &self.job
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.name).finish()
    }
}

/// Registry of jobs and their declared dependencies, filled before the first
/// run and read once by [`JobRegistry::build`].
#[derive(Default)]
pub struct JobRegistry {
    entries: BTreeMap<JobName, RegistryEntry>,
}

struct RegistryEntry {
    job: JobHandle,
    deps: Vec<JobHandle>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job with its direct dependencies.
    ///
    /// Dependencies need not be registered as top-level jobs themselves;
    /// a dependency reference creates its node on demand at build time.
    pub fn register(&mut self, job: JobHandle, deps: Vec<JobHandle>) -> Result<()> {
        if job.name().is_empty() {
            return Err(WorkflowError::InvalidJobName(
                "job name must not be empty".to_string(),
            ));
        }
        for dep in &deps {
            if dep.name().is_empty() {
                return Err(WorkflowError::InvalidJobName(format!(
                    "dependency of job '{}' has an empty name",
                    job.name()
                )));
            }
        }
        if self.entries.contains_key(job.name()) {
            return Err(WorkflowError::DuplicateJob(job.name().to_string()));
        }

        self.entries
            .insert(job.name().to_string(), RegistryEntry { job, deps });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Construct the dependency graph from the registry.
    ///
    /// For every registered job this creates (or reuses, keyed by name) its
    /// node, and for each declared dependency creates (or reuses) the
    /// dependency's node and adds an edge job -> dependency. Deterministic
    /// for a fixed registry; an empty registry yields an empty graph.
    pub fn build(&self) -> DagGraph {
        let mut nodes: BTreeMap<JobName, DagNode> = BTreeMap::new();

        for (name, entry) in &self.entries {
            nodes
                .entry(name.clone())
                .or_insert_with(|| DagNode::new(Node::new(name.clone(), entry.job.clone())));
        }

        for (name, entry) in &self.entries {
            for dep in &entry.deps {
                let dep_name = dep.name().to_string();
                nodes
                    .entry(dep_name.clone())
                    .or_insert_with(|| DagNode::new(Node::new(dep_name.clone(), dep.clone())));

                let node = nodes.get_mut(name).expect("registered node exists");
                if !node.deps.contains(&dep_name) {
                    node.deps.push(dep_name.clone());
                }
                let dep_node = nodes.get_mut(&dep_name).expect("dependency node exists");
                if !dep_node.dependents.contains(name) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        DagGraph { nodes }
    }
}

/// Internal node structure: the node itself plus immediate deps and
/// dependents.
#[derive(Debug, Clone)]
struct DagNode {
    node: Node,
    /// Direct dependencies: jobs that must finish before this one starts.
    deps: Vec<JobName>,
    /// Direct dependents: jobs that depend on this one.
    dependents: Vec<JobName>,
}

impl DagNode {
    fn new(node: Node) -> Self {
        Self {
            node,
            deps: Vec::new(),
            dependents: Vec::new(),
        }
    }
}

/// In-memory dependency graph keyed by job name.
///
/// Acyclicity is not checked here; [`crate::dag::batch`] reports a
/// [`WorkflowError::CyclicDependency`] before any job starts.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: BTreeMap<JobName, DagNode>,
}

impl DagGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in name order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(|n| &n.node)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name).map(|n| &n.node)
    }

    /// Immediate dependencies of a job.
    pub fn dependencies_of(&self, name: &str) -> &[JobName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a job.
    pub fn dependents_of(&self, name: &str) -> &[JobName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
