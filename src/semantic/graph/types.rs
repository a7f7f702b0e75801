//! Type definitions for the dependency graph.
//!
//! Nodes are tagged arena indices. Semantic-model entities point into the
//! model's entity arenas; report-side objects (reports, pages, visuals and
//! filters) point into the model's leaf registry.

use serde::Serialize;
use std::fmt;

use crate::model::{ColumnId, DataInput, LeafId, MeasureId, RelationshipId, TableId};

// ============================================================================
// Nodes
// ============================================================================

/// A node of the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum GraphNode {
    Table(TableId),
    Column(ColumnId),
    Measure(MeasureId),
    Relationship(RelationshipId),
    Report(LeafId),
    Page(LeafId),
    Visual(LeafId),
    Filter(LeafId),
}

impl GraphNode {
    /// The column or measure behind this node, if it is one.
    pub fn as_data_input(self) -> Option<DataInput> {
        match self {
            GraphNode::Column(id) => Some(DataInput::Column(id)),
            GraphNode::Measure(id) => Some(DataInput::Measure(id)),
            _ => None,
        }
    }

    /// Whether depending on an input through this node counts as a use
    /// regardless of the node's own usage.
    pub fn is_real_use(self) -> bool {
        match self {
            GraphNode::Column(_) | GraphNode::Measure(_) => false,
            GraphNode::Table(_)
            | GraphNode::Relationship(_)
            | GraphNode::Report(_)
            | GraphNode::Page(_)
            | GraphNode::Visual(_)
            | GraphNode::Filter(_) => true,
        }
    }

    pub fn leaf_id(self) -> Option<LeafId> {
        match self {
            GraphNode::Report(id)
            | GraphNode::Page(id)
            | GraphNode::Visual(id)
            | GraphNode::Filter(id) => Some(id),
            _ => None,
        }
    }
}

impl From<DataInput> for GraphNode {
    fn from(input: DataInput) -> Self {
        match input {
            DataInput::Column(id) => GraphNode::Column(id),
            DataInput::Measure(id) => GraphNode::Measure(id),
        }
    }
}

impl From<TableId> for GraphNode {
    fn from(id: TableId) -> Self {
        GraphNode::Table(id)
    }
}

impl From<ColumnId> for GraphNode {
    fn from(id: ColumnId) -> Self {
        GraphNode::Column(id)
    }
}

impl From<MeasureId> for GraphNode {
    fn from(id: MeasureId) -> Self {
        GraphNode::Measure(id)
    }
}

impl From<RelationshipId> for GraphNode {
    fn from(id: RelationshipId) -> Self {
        GraphNode::Relationship(id)
    }
}

// ============================================================================
// Report-side leaves
// ============================================================================

/// Kind of a report-side object registered with a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Report,
    Page,
    Visual,
    Filter,
}

impl LeafKind {
    pub(crate) fn node(self, id: LeafId) -> GraphNode {
        match self {
            LeafKind::Report => GraphNode::Report(id),
            LeafKind::Page => GraphNode::Page(id),
            LeafKind::Visual => GraphNode::Visual(id),
            LeafKind::Filter => GraphNode::Filter(id),
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeafKind::Report => "report",
            LeafKind::Page => "page",
            LeafKind::Visual => "visual",
            LeafKind::Filter => "filter",
        };
        f.write_str(s)
    }
}

/// What a model knows about a report-side dependent: enough to describe it
/// without borrowing the report that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafNode {
    pub kind: LeafKind,
    /// Display name ("Sales by Region", "Page Filter '2'", ...).
    pub name: String,
    /// Target type label ("barChart", "PowerBI Report Page", ...).
    pub target_type: String,
    /// Containing object: page for a visual, report for a page.
    pub parent: Option<LeafId>,
}

/// Human-readable description of a graph node, as shown to consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeDescription {
    pub target_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}
