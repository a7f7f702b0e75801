// src/model/column.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ColumnId, TableId};

/// Whether a column is stored or computed by an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Column,
    CalculatedColumn,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Column => "Column",
            ColumnKind::CalculatedColumn => "CalculatedColumn",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of a semantic-model table, including calculated columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) id: ColumnId,
    backend_id: u64,
    name: String,
    table: TableId,
    /// Defining expression; only calculated columns have one.
    expression: Option<String>,
}

impl Column {
    pub(crate) fn new(
        id: ColumnId,
        backend_id: u64,
        name: impl Into<String>,
        table: TableId,
        expression: Option<String>,
    ) -> Self {
        Self {
            id,
            backend_id,
            name: name.into(),
            table,
            expression: expression.filter(|e| !e.trim().is_empty()),
        }
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn backend_id(&self) -> u64 {
        self.backend_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning table. Every column has one.
    pub fn table(&self) -> TableId {
        self.table
    }

    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub fn kind(&self) -> ColumnKind {
        if self.expression.is_some() {
            ColumnKind::CalculatedColumn
        } else {
            ColumnKind::Column
        }
    }
}
