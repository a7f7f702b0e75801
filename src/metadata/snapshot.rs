//! Snapshot-backed metadata source.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::provider::{MetadataError, MetadataResult, MetadataSource};
use super::types::*;

/// A complete copy of the five metadata views.
///
/// Built in memory with the `with_*` methods, or read from a JSON export:
///
/// ```json
/// {
///   "tables": [{"ID": 1, "Name": "Sales"}],
///   "columns": [{"ID": 10, "TableID": 1, "ExplicitName": "Amount"}],
///   "measures": [{"ID": 20, "TableID": 1, "Name": "Total Sales", "Expression": "SUM(Sales[Amount])"}],
///   "relationships": [],
///   "dependencies": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSnapshot {
    pub tables: Vec<TableRow>,
    pub columns: Vec<ColumnRow>,
    pub measures: Vec<MeasureRow>,
    pub relationships: Vec<RelationshipRow>,
    pub dependencies: Vec<DependencyRow>,
}

impl MetadataSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> MetadataResult<Self> {
        serde_json::from_str(json).map_err(MetadataError::Parse)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn with_table(mut self, id: u64, name: &str) -> Self {
        self.tables.push(TableRow {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_column(mut self, id: u64, table_id: u64, name: &str) -> Self {
        self.columns.push(ColumnRow {
            id,
            table_id,
            explicit_name: Some(name.to_string()),
            inferred_name: None,
            expression: None,
        });
        self
    }

    pub fn with_calculated_column(
        mut self,
        id: u64,
        table_id: u64,
        name: &str,
        expression: &str,
    ) -> Self {
        self.columns.push(ColumnRow {
            id,
            table_id,
            explicit_name: Some(name.to_string()),
            inferred_name: None,
            expression: Some(expression.to_string()),
        });
        self
    }

    pub fn with_measure(mut self, id: u64, table_id: u64, name: &str, expression: &str) -> Self {
        self.measures.push(MeasureRow {
            id,
            table_id,
            name: name.to_string(),
            expression: Some(expression.to_string()),
        });
        self
    }

    pub fn with_relationship(mut self, name: &str, from_column_id: u64, to_column_id: u64) -> Self {
        self.relationships.push(RelationshipRow {
            from_column_id,
            to_column_id,
            name: name.to_string(),
            is_active: true,
        });
        self
    }

    /// Record that `object` (in `table`) references `referenced` (in
    /// `referenced_table`).
    pub fn with_dependency(
        mut self,
        object_type: CalcObjectType,
        table: &str,
        object: &str,
        referenced_type: CalcObjectType,
        referenced_table: &str,
        referenced: &str,
    ) -> Self {
        self.dependencies.push(DependencyRow {
            object_type,
            table: table.to_string(),
            object: object.to_string(),
            referenced_object_type: referenced_type,
            referenced_table: referenced_table.to_string(),
            referenced_object: referenced.to_string(),
        });
        self
    }
}

impl MetadataSource for MetadataSnapshot {
    fn tables(&mut self) -> MetadataResult<Vec<TableRow>> {
        Ok(self.tables.clone())
    }

    fn columns(&mut self) -> MetadataResult<Vec<ColumnRow>> {
        Ok(self.columns.clone())
    }

    fn measures(&mut self) -> MetadataResult<Vec<MeasureRow>> {
        Ok(self.measures.clone())
    }

    fn relationships(&mut self) -> MetadataResult<Vec<RelationshipRow>> {
        Ok(self.relationships.clone())
    }

    fn dependencies(&mut self) -> MetadataResult<Vec<DependencyRow>> {
        Ok(self.dependencies.clone())
    }
}
