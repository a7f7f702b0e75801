//! Semantic-model vocabulary: tables, columns, measures and relationships.
//!
//! Entities are plain data owned by a [`SemanticModel`](crate::semantic::SemanticModel)
//! and addressed through arena indices ([`TableId`], [`ColumnId`], ...).

pub mod column;
pub mod ids;
pub mod measure;
pub mod relationship;
pub mod table;

pub use column::{Column, ColumnKind};
pub use ids::{ColumnId, LeafId, MeasureId, RelationshipId, TableId};
pub use measure::Measure;
pub use relationship::Relationship;
pub use table::Table;

use serde::Serialize;

/// A column or measure: the only entity kinds whose usage is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DataInput {
    Column(ColumnId),
    Measure(MeasureId),
}

impl From<ColumnId> for DataInput {
    fn from(id: ColumnId) -> Self {
        DataInput::Column(id)
    }
}

impl From<MeasureId> for DataInput {
    fn from(id: MeasureId) -> Self {
        DataInput::Measure(id)
    }
}
