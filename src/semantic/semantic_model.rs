//! Semantic model: entity registries plus the dependency graph.
//!
//! `SemanticModel` owns every table, column, measure and relationship of one
//! model, the dependency edges between them, and the report-side objects
//! registered as dependents while reports are linked against it.
//!
//! # Example
//!
//! ```ignore
//! use findmeasure::semantic::SemanticModel;
//!
//! // Permissive model: unknown references become placeholders
//! let mut model = SemanticModel::disconnected("Local");
//! let amount = model.column_placeholder("Amount", "Sales")?;
//!
//! // Connected model: entities come from the metadata backend
//! let mut model = SemanticModel::connected("Sales", "Data Source=...;Initial Catalog=Sales");
//! model.load_full_model(&mut snapshot)?;
//! let total = model.find_measure("Total Sales");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::model::{
    Column, ColumnId, DataInput, LeafId, Measure, MeasureId, Relationship,
    RelationshipId, Table, TableId,
};

use super::error::{ModelError, ModelResult};
use super::graph::{DependencyGraph, GraphNode, LeafKind, LeafNode, NodeDescription};

/// How missing entities are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Entities come from a metadata backend; lookups report not-found.
    #[default]
    Connected,
    /// No backend; unknown entities are fabricated as placeholders.
    Disconnected,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Connected => f.write_str("connected"),
            RunMode::Disconnected => f.write_str("disconnected"),
        }
    }
}

// ============================================================================
// Entity arenas
// ============================================================================

/// Arenas and lookup indexes for the entities of one model.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntityStore {
    tables: Vec<Table>,
    columns: Vec<Column>,
    measures: Vec<Measure>,
    relationships: Vec<Relationship>,

    table_by_name: HashMap<String, TableId>,
    table_by_backend_id: HashMap<u64, TableId>,
    column_by_name: HashMap<(TableId, String), ColumnId>,
    column_by_backend_id: HashMap<u64, ColumnId>,
    measure_by_name: HashMap<String, MeasureId>,
    relationship_by_endpoints: HashMap<(ColumnId, ColumnId), RelationshipId>,
}

impl EntityStore {
    pub(crate) fn add_table(&mut self, name: &str, backend_id: u64) -> TableId {
        let id = TableId::new(self.tables.len());
        self.tables.push(Table::new(id, name, backend_id));
        self.table_by_name.entry(name.to_string()).or_insert(id);
        if backend_id != 0 {
            self.table_by_backend_id.insert(backend_id, id);
        }
        id
    }

    pub(crate) fn add_column(
        &mut self,
        backend_id: u64,
        name: &str,
        table: TableId,
        expression: Option<String>,
    ) -> ColumnId {
        let id = ColumnId::new(self.columns.len());
        self.columns
            .push(Column::new(id, backend_id, name, table, expression));
        self.tables[table.index()].add_column(id);
        self.column_by_name
            .entry((table, name.to_string()))
            .or_insert(id);
        if backend_id != 0 {
            self.column_by_backend_id.insert(backend_id, id);
        }
        id
    }

    pub(crate) fn add_measure(
        &mut self,
        backend_id: u64,
        name: &str,
        table: Option<TableId>,
        expression: Option<String>,
    ) -> MeasureId {
        let id = MeasureId::new(self.measures.len());
        self.measures
            .push(Measure::new(id, backend_id, name, table, expression));
        if let Some(table) = table {
            self.tables[table.index()].add_measure(id);
        }
        self.measure_by_name.entry(name.to_string()).or_insert(id);
        id
    }

    /// Adds a relationship unless one already connects the same columns.
    /// Returns the relationship id and whether it was newly created.
    pub(crate) fn add_relationship(
        &mut self,
        name: &str,
        from_column: ColumnId,
        to_column: ColumnId,
        is_active: bool,
    ) -> (RelationshipId, bool) {
        if let Some(&existing) = self.relationship_by_endpoints.get(&(from_column, to_column)) {
            return (existing, false);
        }
        let id = RelationshipId::new(self.relationships.len());
        self.relationships
            .push(Relationship::new(id, name, from_column, to_column, is_active));
        self.relationship_by_endpoints
            .insert((from_column, to_column), id);
        (id, true)
    }

    fn attach_measure(&mut self, measure: MeasureId, table: TableId) {
        self.measures[measure.index()].attach_to(table);
        self.tables[table.index()].add_measure(measure);
    }

    pub(crate) fn table_by_name(&self, name: &str) -> Option<TableId> {
        self.table_by_name.get(name).copied()
    }

    pub(crate) fn table_by_backend_id(&self, id: u64) -> Option<TableId> {
        self.table_by_backend_id.get(&id).copied()
    }

    pub(crate) fn column_by_name(&self, name: &str, table_name: &str) -> Option<ColumnId> {
        let table = self.table_by_name(table_name)?;
        self.column_by_name.get(&(table, name.to_string())).copied()
    }

    pub(crate) fn column_by_backend_id(&self, id: u64) -> Option<ColumnId> {
        self.column_by_backend_id.get(&id).copied()
    }

    pub(crate) fn measure_by_name(&self, name: &str) -> Option<MeasureId> {
        self.measure_by_name.get(name).copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.columns.is_empty()
            && self.measures.is_empty()
            && self.relationships.is_empty()
    }
}

// ============================================================================
// SemanticModel
// ============================================================================

/// A semantic model and its dependency graph for one analysis run.
#[derive(Debug, Clone)]
pub struct SemanticModel {
    name: String,
    /// Connection descriptor the model was opened with (empty when local).
    connection: String,
    mode: RunMode,
    pub(crate) entities: EntityStore,
    pub(crate) graph: DependencyGraph,
    /// Report-side dependents, addressed by [`LeafId`].
    leaves: Vec<LeafNode>,
    next_filter_number: u32,
}

impl SemanticModel {
    pub fn new(name: impl Into<String>, connection: impl Into<String>, mode: RunMode) -> Self {
        Self {
            name: name.into(),
            connection: connection.into(),
            mode,
            entities: EntityStore::default(),
            graph: DependencyGraph::new(),
            leaves: Vec::new(),
            next_filter_number: 0,
        }
    }

    /// A model whose entities will be loaded from a metadata backend.
    pub fn connected(name: impl Into<String>, connection: impl Into<String>) -> Self {
        Self::new(name, connection, RunMode::Connected)
    }

    /// A permissive model that fabricates the entities reports refer to.
    pub fn disconnected(name: impl Into<String>) -> Self {
        Self::new(name, String::new(), RunMode::Disconnected)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    // ------------------------------------------------------------------------
    // Registries
    // ------------------------------------------------------------------------

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.entities.tables.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.entities.columns.iter()
    }

    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.entities.measures.iter()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.entities.relationships.iter()
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.entities.tables[id.index()]
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.entities.columns[id.index()]
    }

    pub fn measure(&self, id: MeasureId) -> &Measure {
        &self.entities.measures[id.index()]
    }

    pub fn relationship(&self, id: RelationshipId) -> &Relationship {
        &self.entities.relationships[id.index()]
    }

    /// Every column and measure, columns first.
    pub fn data_inputs(&self) -> impl Iterator<Item = DataInput> + '_ {
        self.entities
            .columns
            .iter()
            .map(|c| DataInput::Column(c.id()))
            .chain(self.entities.measures.iter().map(|m| DataInput::Measure(m.id())))
    }

    // ------------------------------------------------------------------------
    // Lookups (no side effects)
    // ------------------------------------------------------------------------

    pub fn find_table(&self, name: &str) -> Option<TableId> {
        self.entities.table_by_name(name)
    }

    pub fn find_table_by_backend_id(&self, id: u64) -> Option<TableId> {
        self.entities.table_by_backend_id(id)
    }

    pub fn find_measure(&self, name: &str) -> Option<MeasureId> {
        self.entities.measure_by_name(name)
    }

    pub fn find_column(&self, name: &str, table_name: &str) -> Option<ColumnId> {
        self.entities.column_by_name(name, table_name)
    }

    pub fn find_column_by_backend_id(&self, id: u64) -> Option<ColumnId> {
        self.entities.column_by_backend_id(id)
    }

    // ------------------------------------------------------------------------
    // Placeholders (disconnected mode)
    // ------------------------------------------------------------------------

    fn ensure_disconnected(&self, kind: &'static str, name: &str) -> ModelResult<()> {
        match self.mode {
            RunMode::Disconnected => Ok(()),
            RunMode::Connected => Err(ModelError::PlaceholderInConnectedMode {
                model: self.name.clone(),
                kind,
                name: name.to_string(),
            }),
        }
    }

    fn ensure_table(&mut self, name: &str) -> TableId {
        match self.entities.table_by_name(name) {
            Some(id) => id,
            None => self.entities.add_table(name, 0),
        }
    }

    /// The table named `name`, created with a zero backend id if missing.
    pub fn table_placeholder(&mut self, name: &str) -> ModelResult<TableId> {
        self.ensure_disconnected("table", name)?;
        Ok(self.ensure_table(name))
    }

    /// The column `name` of table `table_name`, created (along with its
    /// table) if missing.
    pub fn column_placeholder(&mut self, name: &str, table_name: &str) -> ModelResult<ColumnId> {
        self.ensure_disconnected("column", name)?;
        if let Some(id) = self.entities.column_by_name(name, table_name) {
            return Ok(id);
        }
        let table = self.ensure_table(table_name);
        Ok(self.entities.add_column(0, name, table, None))
    }

    /// The measure `name`, created if missing. When a table name is given
    /// and the measure has no table yet, the measure is attached to it.
    pub fn measure_placeholder(
        &mut self,
        name: &str,
        table_name: Option<&str>,
    ) -> ModelResult<MeasureId> {
        self.ensure_disconnected("measure", name)?;
        let table = table_name.map(|t| self.ensure_table(t));
        match self.entities.measure_by_name(name) {
            Some(id) => {
                if let (Some(table), None) = (table, self.measure(id).table()) {
                    self.entities.attach_measure(id, table);
                }
                Ok(id)
            }
            None => Ok(self.entities.add_measure(0, name, table, None)),
        }
    }

    // ------------------------------------------------------------------------
    // Mode-aware resolution
    // ------------------------------------------------------------------------

    /// Find the column in connected mode, fabricate it in disconnected mode.
    pub fn resolve_column(&mut self, name: &str, table_name: &str) -> Option<ColumnId> {
        match self.mode {
            RunMode::Connected => self.find_column(name, table_name),
            RunMode::Disconnected => self.column_placeholder(name, table_name).ok(),
        }
    }

    /// Find the measure in connected mode, fabricate it in disconnected mode.
    pub fn resolve_measure(&mut self, name: &str, table_name: Option<&str>) -> Option<MeasureId> {
        match self.mode {
            RunMode::Connected => self.find_measure(name),
            RunMode::Disconnected => self.measure_placeholder(name, table_name).ok(),
        }
    }

    // ------------------------------------------------------------------------
    // Data inputs
    // ------------------------------------------------------------------------

    /// Record that `dependent` reads `input`. Duplicate edges are ignored.
    pub fn add_dependent(&mut self, input: DataInput, dependent: GraphNode) -> bool {
        self.graph.add_dependent(input, dependent)
    }

    pub fn dependents(&self, input: DataInput) -> Vec<GraphNode> {
        self.graph.dependents(input)
    }

    pub fn inputs_of(&self, node: GraphNode) -> Vec<DataInput> {
        self.graph.inputs_of(node)
    }

    pub fn input_name(&self, input: DataInput) -> &str {
        match input {
            DataInput::Column(id) => self.column(id).name(),
            DataInput::Measure(id) => self.measure(id).name(),
        }
    }

    /// Owning table of a column or measure. Only a table-less measure
    /// placeholder has none.
    pub fn input_table(&self, input: DataInput) -> Option<&Table> {
        let table = match input {
            DataInput::Column(id) => Some(self.column(id).table()),
            DataInput::Measure(id) => self.measure(id).table(),
        };
        table.map(|t| self.table(t))
    }

    pub fn input_expression(&self, input: DataInput) -> Option<&str> {
        match input {
            DataInput::Column(id) => self.column(id).expression(),
            DataInput::Measure(id) => self.measure(id).expression(),
        }
    }

    /// "Column", "CalculatedColumn" or "Measure".
    pub fn input_type(&self, input: DataInput) -> &'static str {
        match input {
            DataInput::Column(id) => self.column(id).kind().as_str(),
            DataInput::Measure(_) => "Measure",
        }
    }

    /// `Table[Name]`, or `[Name]` without a table.
    pub fn qualified_name(&self, input: DataInput) -> String {
        match self.input_table(input) {
            Some(table) => format!("{}[{}]", table.name(), self.input_name(input)),
            None => format!("[{}]", self.input_name(input)),
        }
    }

    // ------------------------------------------------------------------------
    // Report-side leaves
    // ------------------------------------------------------------------------

    pub(crate) fn register_leaf(&mut self, leaf: LeafNode) -> GraphNode {
        let id = LeafId::new(self.leaves.len());
        let kind = leaf.kind;
        self.leaves.push(leaf);
        kind.node(id)
    }

    pub fn leaf(&self, id: LeafId) -> &LeafNode {
        &self.leaves[id.index()]
    }

    /// Take the next filter display number. Numbers are unique per model.
    pub(crate) fn next_filter_number(&mut self) -> u32 {
        let n = self.next_filter_number;
        self.next_filter_number += 1;
        n
    }

    /// Describe any graph node for display.
    pub fn describe(&self, node: GraphNode) -> NodeDescription {
        match node {
            GraphNode::Table(id) => NodeDescription {
                target_type: "Table".to_string(),
                name: self.table(id).name().to_string(),
                ..Default::default()
            },
            GraphNode::Column(id) => {
                let column = self.column(id);
                NodeDescription {
                    target_type: column.kind().as_str().to_string(),
                    name: column.name().to_string(),
                    table: Some(self.table(column.table()).name().to_string()),
                    ..Default::default()
                }
            }
            GraphNode::Measure(id) => {
                let measure = self.measure(id);
                NodeDescription {
                    target_type: "Measure".to_string(),
                    name: measure.name().to_string(),
                    table: measure.table().map(|t| self.table(t).name().to_string()),
                    ..Default::default()
                }
            }
            GraphNode::Relationship(id) => NodeDescription {
                target_type: "Relationship".to_string(),
                name: self.relationship(id).name().to_string(),
                ..Default::default()
            },
            GraphNode::Report(id)
            | GraphNode::Page(id)
            | GraphNode::Visual(id)
            | GraphNode::Filter(id) => self.describe_leaf(id),
        }
    }

    fn describe_leaf(&self, id: LeafId) -> NodeDescription {
        let leaf = self.leaf(id);
        let mut description = NodeDescription {
            target_type: leaf.target_type.clone(),
            name: leaf.name.clone(),
            ..Default::default()
        };

        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.leaf(cur);
            match node.kind {
                LeafKind::Report if description.report.is_none() => {
                    description.report = Some(node.name.clone());
                }
                LeafKind::Page if description.page.is_none() => {
                    description.page = Some(node.name.clone());
                }
                _ => {}
            }
            current = node.parent;
        }
        description
    }
}
