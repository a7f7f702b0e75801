//! Dependency graph - directed edges from data inputs to their dependents.
//!
//! An edge `input → dependent` means "dependent reads input". Inputs are
//! always columns or measures; dependents may be any [`GraphNode`]. Edges
//! are only ever added, and adding an existing edge is a no-op.

pub mod types;

pub use types::*;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

use crate::model::DataInput;

/// Dependency edges of one semantic model.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<GraphNode, ()>,

    /// Index: node → NodeIndex
    node_index: HashMap<GraphNode, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.node_index.insert(node, idx);
        idx
    }

    /// Record that `dependent` reads `input`. Returns false if the edge
    /// already existed.
    pub fn add_dependent(&mut self, input: DataInput, dependent: GraphNode) -> bool {
        let from = self.ensure_node(input.into());
        let to = self.ensure_node(dependent);
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Direct dependents of `input`, in the order they were added.
    pub fn dependents(&self, input: DataInput) -> Vec<GraphNode> {
        self.neighbors(input.into(), Direction::Outgoing)
    }

    pub fn has_dependents(&self, input: DataInput) -> bool {
        self.node_index
            .get(&GraphNode::from(input))
            .is_some_and(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .next()
                    .is_some()
            })
    }

    /// Inputs read directly by `node`, in the order they were added.
    pub fn inputs_of(&self, node: GraphNode) -> Vec<DataInput> {
        self.neighbors(node, Direction::Incoming)
            .into_iter()
            .filter_map(GraphNode::as_data_input)
            .collect()
    }

    fn neighbors(&self, node: GraphNode, direction: Direction) -> Vec<GraphNode> {
        let Some(&idx) = self.node_index.get(&node) else {
            return Vec::new();
        };
        // petgraph yields the most recently added edge first
        let mut nodes: Vec<GraphNode> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n])
            .collect();
        nodes.reverse();
        nodes
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}
