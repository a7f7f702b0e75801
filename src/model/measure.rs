// src/model/measure.rs
use super::{MeasureId, TableId};

/// A measure (named calculation) of the semantic model.
///
/// Measure names are unique within a model, so lookups go by name alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub(crate) id: MeasureId,
    backend_id: u64,
    name: String,
    /// Home table. Only a placeholder created without a table name lacks one.
    table: Option<TableId>,
    expression: Option<String>,
}

impl Measure {
    pub(crate) fn new(
        id: MeasureId,
        backend_id: u64,
        name: impl Into<String>,
        table: Option<TableId>,
        expression: Option<String>,
    ) -> Self {
        Self {
            id,
            backend_id,
            name: name.into(),
            table,
            expression,
        }
    }

    pub fn id(&self) -> MeasureId {
        self.id
    }

    pub fn backend_id(&self) -> u64 {
        self.backend_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<TableId> {
        self.table
    }

    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub(crate) fn attach_to(&mut self, table: TableId) {
        self.table = Some(table);
    }
}
