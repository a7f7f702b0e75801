//! Semantic layer - the model, its dependency graph and usage analysis.
//!
//! The workflow has three phases:
//!
//! 1. **Load** - populate a [`SemanticModel`] from a metadata source, or
//!    start from an empty disconnected model
//! 2. **Link** - reports add dependency edges as their references resolve
//!    (see [`crate::report`])
//! 3. **Classify** - walk the finished graph to compute [`UsageState`]s

pub mod error;
pub mod graph;
pub mod loader;
pub mod semantic_model;
pub mod usage;

pub use error::{ModelError, ModelResult};
pub use graph::{DependencyGraph, GraphNode, LeafKind, LeafNode, NodeDescription};
pub use semantic_model::{RunMode, SemanticModel};
pub use usage::{classify_all, usage_state, UsageClassifier, UsageState};
