//! Row types returned by a metadata source.
//!
//! Field names follow the engine's system views (`TMSCHEMA_TABLES`,
//! `TMSCHEMA_COLUMNS`, `TMSCHEMA_MEASURES`, `TMSCHEMA_RELATIONSHIPS` and
//! `DISCOVER_CALC_DEPENDENCY`) so that an exported snapshot deserializes
//! without renaming.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A row of the tables view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Name")]
    pub name: String,
}

/// A row of the columns view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "TableID")]
    pub table_id: u64,
    /// User-defined name, absent for system-named columns.
    #[serde(rename = "ExplicitName", default)]
    pub explicit_name: Option<String>,
    #[serde(rename = "InferredName", default)]
    pub inferred_name: Option<String>,
    #[serde(rename = "Expression", default)]
    pub expression: Option<String>,
}

impl ColumnRow {
    /// Display name: the explicit name when present, otherwise the inferred one.
    pub fn name(&self) -> &str {
        self.explicit_name
            .as_deref()
            .or(self.inferred_name.as_deref())
            .unwrap_or_default()
    }
}

/// A row of the measures view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureRow {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "TableID")]
    pub table_id: u64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Expression", default)]
    pub expression: Option<String>,
}

/// A row of the relationships view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRow {
    #[serde(rename = "FromColumnID")]
    pub from_column_id: u64,
    #[serde(rename = "ToColumnID")]
    pub to_column_id: u64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "IsActive", default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Object type tag used on both sides of a calculation dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalcObjectType {
    Column,
    CalcColumn,
    Measure,
    CalcTable,
    Table,
    Hierarchy,
    Relationship,
    #[serde(other)]
    Other,
}

impl CalcObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalcObjectType::Column => "COLUMN",
            CalcObjectType::CalcColumn => "CALC_COLUMN",
            CalcObjectType::Measure => "MEASURE",
            CalcObjectType::CalcTable => "CALC_TABLE",
            CalcObjectType::Table => "TABLE",
            CalcObjectType::Hierarchy => "HIERARCHY",
            CalcObjectType::Relationship => "RELATIONSHIP",
            CalcObjectType::Other => "OTHER",
        }
    }
}

impl fmt::Display for CalcObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the calculation-dependency view: `object` references
/// `referenced_object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRow {
    #[serde(rename = "OBJECT_TYPE")]
    pub object_type: CalcObjectType,
    #[serde(rename = "TABLE", default)]
    pub table: String,
    #[serde(rename = "OBJECT")]
    pub object: String,
    #[serde(rename = "REFERENCED_OBJECT_TYPE")]
    pub referenced_object_type: CalcObjectType,
    #[serde(rename = "REFERENCED_TABLE", default)]
    pub referenced_table: String,
    #[serde(rename = "REFERENCED_OBJECT")]
    pub referenced_object: String,
}

impl DependencyRow {
    /// True for dependencies between model objects the loader tracks:
    /// a measure, calculated column or calculated table referencing a
    /// column, calculated column or measure.
    pub fn is_model_dependency(&self) -> bool {
        matches!(
            self.object_type,
            CalcObjectType::CalcColumn | CalcObjectType::Measure | CalcObjectType::CalcTable
        ) && matches!(
            self.referenced_object_type,
            CalcObjectType::Column | CalcObjectType::CalcColumn | CalcObjectType::Measure
        )
    }
}
