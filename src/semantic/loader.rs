//! Connected-mode loading of a semantic model from a metadata source.
//!
//! The load runs five phases in a fixed order (tables, columns, measures,
//! relationships, dependencies). Each phase builds on the previous ones,
//! so everything is staged in a fresh entity store and graph and only
//! swapped into the model once all five succeed.

use tracing::{debug, info};

use crate::metadata::{
    ColumnRow, DependencyRow, MeasureRow, MetadataError, MetadataSource, RelationshipRow,
    TableRow,
};
use crate::model::DataInput;

use super::error::{ModelError, ModelResult};
use super::graph::{DependencyGraph, GraphNode};
use super::semantic_model::{EntityStore, RunMode, SemanticModel};

impl SemanticModel {
    /// Populate the model from `source`.
    ///
    /// Does nothing for a disconnected model. On error the model is left
    /// exactly as it was.
    pub fn load_full_model(&mut self, source: &mut dyn MetadataSource) -> ModelResult<()> {
        if self.mode() == RunMode::Disconnected {
            debug!(model = %self.name(), "disconnected model, skipping metadata load");
            return Ok(());
        }

        let wrap = |source: MetadataError| ModelError::Metadata {
            model: self.name().to_string(),
            source,
        };

        let tables = source.tables().map_err(wrap)?;
        let columns = source.columns().map_err(wrap)?;
        let measures = source.measures().map_err(wrap)?;
        let relationships = source.relationships().map_err(wrap)?;
        let dependencies = source.dependencies().map_err(wrap)?;

        let mut staged = StagedLoad::default();
        staged.load_tables(&tables);
        staged.load_columns(&columns)?;
        staged.load_measures(&measures)?;
        staged.load_relationships(&relationships)?;
        let dependency_edges = staged.load_dependencies(&dependencies)?;

        info!(
            model = %self.name(),
            tables = tables.len(),
            columns = columns.len(),
            measures = measures.len(),
            relationships = relationships.len(),
            dependencies = dependency_edges,
            "loaded semantic model"
        );

        self.entities = staged.entities;
        self.graph = staged.graph;
        Ok(())
    }
}

#[derive(Default)]
struct StagedLoad {
    entities: EntityStore,
    graph: DependencyGraph,
}

impl StagedLoad {
    fn load_tables(&mut self, rows: &[TableRow]) {
        for row in rows {
            self.entities.add_table(&row.name, row.id);
        }
        debug!(count = rows.len(), "loaded tables");
    }

    fn load_columns(&mut self, rows: &[ColumnRow]) -> ModelResult<()> {
        for row in rows {
            let table = self.entities.table_by_backend_id(row.table_id).ok_or_else(|| {
                ModelError::ColumnTableNotFound {
                    table_id: row.table_id,
                    column: row.name().to_string(),
                }
            })?;
            self.entities
                .add_column(row.id, row.name(), table, row.expression.clone());
        }
        debug!(count = rows.len(), "loaded columns");
        Ok(())
    }

    fn load_measures(&mut self, rows: &[MeasureRow]) -> ModelResult<()> {
        for row in rows {
            let table = self.entities.table_by_backend_id(row.table_id).ok_or_else(|| {
                ModelError::MeasureTableNotFound {
                    table_id: row.table_id,
                    measure: row.name.clone(),
                }
            })?;
            self.entities
                .add_measure(row.id, &row.name, Some(table), row.expression.clone());
        }
        debug!(count = rows.len(), "loaded measures");
        Ok(())
    }

    fn load_relationships(&mut self, rows: &[RelationshipRow]) -> ModelResult<()> {
        for row in rows {
            let endpoints = (
                self.entities.column_by_backend_id(row.from_column_id),
                self.entities.column_by_backend_id(row.to_column_id),
            );
            let (Some(from), Some(to)) = endpoints else {
                return Err(ModelError::RelationshipEndpointNotFound {
                    relationship: row.name.clone(),
                    from_column_id: row.from_column_id,
                    to_column_id: row.to_column_id,
                });
            };

            let (id, _) = self
                .entities
                .add_relationship(&row.name, from, to, row.is_active);
            self.graph
                .add_dependent(DataInput::Column(from), GraphNode::Relationship(id));
            self.graph
                .add_dependent(DataInput::Column(to), GraphNode::Relationship(id));
        }
        debug!(count = rows.len(), "loaded relationships");
        Ok(())
    }

    /// Returns the number of dependency edges added.
    fn load_dependencies(&mut self, rows: &[DependencyRow]) -> ModelResult<usize> {
        let mut added = 0;
        for row in rows.iter().filter(|r| r.is_model_dependency()) {
            let input = self.referenced_input(row)?;
            let dependent = self.referencing_node(row)?;
            if self.graph.add_dependent(input, dependent) {
                added += 1;
            }
        }
        debug!(rows = rows.len(), edges = added, "loaded dependencies");
        Ok(added)
    }

    fn referenced_input(&self, row: &DependencyRow) -> ModelResult<DataInput> {
        if let Some(column) = self
            .entities
            .column_by_name(&row.referenced_object, &row.referenced_table)
        {
            return Ok(DataInput::Column(column));
        }
        if let Some(measure) = self.entities.measure_by_name(&row.referenced_object) {
            return Ok(DataInput::Measure(measure));
        }
        Err(ModelError::DependencyNotFound {
            object_type: row.referenced_object_type.to_string(),
            table: row.referenced_table.clone(),
            name: row.referenced_object.clone(),
        })
    }

    fn referencing_node(&self, row: &DependencyRow) -> ModelResult<GraphNode> {
        if let Some(column) = self.entities.column_by_name(&row.object, &row.table) {
            return Ok(GraphNode::Column(column));
        }
        if let Some(measure) = self.entities.measure_by_name(&row.object) {
            return Ok(GraphNode::Measure(measure));
        }
        if let Some(table) = self.entities.table_by_name(&row.object) {
            return Ok(GraphNode::Table(table));
        }
        Err(ModelError::DependentNotFound {
            object_type: row.object_type.to_string(),
            table: row.table.clone(),
            name: row.object.clone(),
        })
    }
}
