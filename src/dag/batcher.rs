// src/dag/batcher.rs

//! Layered topological batching.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dag::graph::{DagGraph, Node};
use crate::errors::{Result, WorkflowError};

/// Convert the dependency graph into an ordered sequence of independent
/// batches.
///
/// Layered Kahn's algorithm: repeatedly extract the set of nodes with no
/// remaining unresolved dependencies, remove them and their edges, and
/// append that set as the next batch. For every edge (A depends on B), B's
/// batch index is strictly less than A's; every node appears in exactly one
/// batch. Order *within* a batch carries no meaning.
///
/// Fails with [`WorkflowError::CyclicDependency`] carrying the names of the
/// nodes that could not be placed.
pub fn batch(graph: &DagGraph) -> Result<Vec<Vec<Node>>> {
    let mut unresolved: BTreeMap<&str, usize> = graph
        .nodes()
        .map(|node| (node.name(), graph.dependencies_of(node.name()).len()))
        .collect();

    let mut batches: Vec<Vec<Node>> = Vec::new();

    while !unresolved.is_empty() {
        let ready: Vec<&str> = unresolved
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| *name)
            .collect();

        if ready.is_empty() {
            let stuck: Vec<String> = unresolved.keys().map(|s| s.to_string()).collect();
            return Err(WorkflowError::CyclicDependency(stuck));
        }

        for name in &ready {
            unresolved.remove(name);
            for dependent in graph.dependents_of(name) {
                if let Some(count) = unresolved.get_mut(dependent.as_str()) {
                    *count -= 1;
                }
            }
        }

        let nodes: Vec<Node> = ready
            .iter()
            .map(|name| graph.node(name).expect("ready node exists in graph").clone())
            .collect();
        debug!(batch = batches.len(), jobs = ?ready, "batch resolved");
        batches.push(nodes);
    }

    Ok(batches)
}
