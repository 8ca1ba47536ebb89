// src/dag/mod.rs

//! Dependency graph construction and topological batching.
//!
//! - [`graph`] accumulates registered jobs into a directed graph keyed by
//!   job name.
//! - [`batcher`] converts the graph into an ordered sequence of independent
//!   batches, or reports a cycle.

pub mod batcher;
pub mod graph;

pub use batcher::batch;
pub use graph::{DagGraph, JobRegistry, Node};
