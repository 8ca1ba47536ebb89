// src/workflow/metadata.rs

//! Immutable workflow metadata.

use crate::dag::{DagGraph, Node};

/// The (nodes, batch sequence, graph) triple computed on a workflow's first
/// run. Read-only thereafter; the write-once cell lives in the coordinator.
#[derive(Debug, Clone)]
pub struct WorkflowMetadata {
    nodes: Vec<Node>,
    batches: Vec<Vec<Node>>,
    graph: DagGraph,
}

impl WorkflowMetadata {
    pub(crate) fn new(nodes: Vec<Node>, batches: Vec<Vec<Node>>, graph: DagGraph) -> Self {
        Self {
            nodes,
            batches,
            graph,
        }
    }

    /// Every node of the workflow, in name order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The batch sequence: for every dependency edge, the dependency's batch
    /// index is strictly less than the dependent's.
    pub fn batches(&self) -> &[Vec<Node>] {
        &self.batches
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }
}
