//! Cross-linking of report field references to semantic-model entities.

use tracing::debug;

use crate::model::DataInput;
use crate::semantic::{GraphNode, LeafNode, SemanticModel};
use crate::warnings::{MissingColumnWarning, MissingMeasureWarning, WarningBus, WarningSender};

use super::layout::{FieldKind, FieldReference};

/// Resolves references on behalf of one report while it is linked.
///
/// A resolved reference becomes a dependency edge from the column or
/// measure to the consuming report object. An unresolved one is published
/// as a warning and dropped.
pub struct ReferenceResolver<'a> {
    model: &'a mut SemanticModel,
    warnings: &'a WarningBus,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(model: &'a mut SemanticModel, warnings: &'a WarningBus) -> Self {
        Self { model, warnings }
    }

    pub(crate) fn register(&mut self, leaf: LeafNode) -> GraphNode {
        self.model.register_leaf(leaf)
    }

    pub(crate) fn next_filter_number(&mut self) -> u32 {
        self.model.next_filter_number()
    }

    /// Resolve one reference read by `consumer`.
    pub fn resolve(&mut self, reference: &FieldReference, consumer: &WarningSender) -> Option<DataInput> {
        let input = match reference.kind {
            FieldKind::Column => self
                .model
                .resolve_column(&reference.name, &reference.table)
                .map(DataInput::Column),
            FieldKind::Measure => self
                .model
                .resolve_measure(&reference.name, Some(&reference.table))
                .map(DataInput::Measure),
        };

        let Some(input) = input else {
            debug!(reference = %reference, consumer = %consumer.description, "unresolved reference");
            self.publish_missing(reference, consumer);
            return None;
        };

        self.model.add_dependent(input, consumer.node);
        Some(input)
    }

    /// Resolve every reference, returning the distinct inputs found.
    pub fn resolve_all(
        &mut self,
        references: &[FieldReference],
        consumer: &WarningSender,
    ) -> Vec<DataInput> {
        let mut inputs = Vec::with_capacity(references.len());
        for reference in references {
            if let Some(input) = self.resolve(reference, consumer) {
                if !inputs.contains(&input) {
                    inputs.push(input);
                }
            }
        }
        inputs
    }

    fn publish_missing(&self, reference: &FieldReference, consumer: &WarningSender) {
        match reference.kind {
            FieldKind::Column => self.warnings.publish(MissingColumnWarning {
                column: reference.name.clone(),
                table: reference.table.clone(),
                sender: consumer.clone(),
            }),
            FieldKind::Measure => self.warnings.publish(MissingMeasureWarning {
                measure: reference.name.clone(),
                table: reference.table.clone(),
                sender: consumer.clone(),
            }),
        }
    }
}
