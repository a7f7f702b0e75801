// src/model/table.rs
use super::{ColumnId, MeasureId, TableId};

/// A table of the semantic model.
///
/// Tables list the columns and measures they own. The same columns and
/// measures are also reachable through the model's flat registries; both
/// are indexes over the model's arenas.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub(crate) id: TableId,
    name: String,
    /// Identifier reported by the metadata backend (0 for placeholders).
    backend_id: u64,
    columns: Vec<ColumnId>,
    measures: Vec<MeasureId>,
}

impl Table {
    pub(crate) fn new(id: TableId, name: impl Into<String>, backend_id: u64) -> Self {
        Self {
            id,
            name: name.into(),
            backend_id,
            columns: Vec::new(),
            measures: Vec::new(),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_id(&self) -> u64 {
        self.backend_id
    }

    /// Placeholder tables are fabricated by permissive lookups and carry no
    /// backend identifier.
    pub fn is_placeholder(&self) -> bool {
        self.backend_id == 0
    }

    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    pub fn measures(&self) -> &[MeasureId] {
        &self.measures
    }

    pub(crate) fn add_column(&mut self, column: ColumnId) -> bool {
        if self.columns.contains(&column) {
            return false;
        }
        self.columns.push(column);
        true
    }

    pub(crate) fn add_measure(&mut self, measure: MeasureId) -> bool {
        if self.measures.contains(&measure) {
            return false;
        }
        self.measures.push(measure);
        true
    }
}
