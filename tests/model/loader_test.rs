#[cfg(test)]
mod tests {
    use findmeasure::metadata::{
        CalcObjectType, ColumnRow, DependencyRow, MeasureRow, MetadataError, MetadataResult,
        MetadataSnapshot, MetadataSource, RelationshipRow, TableRow,
    };
    use findmeasure::model::{ColumnKind, DataInput};
    use findmeasure::semantic::{GraphNode, ModelError, SemanticModel};

    /// Helper to build the Sales/Product model used by most tests
    fn sales_snapshot() -> MetadataSnapshot {
        MetadataSnapshot::new()
            .with_table(1, "Sales")
            .with_table(2, "Product")
            .with_column(10, 1, "Amount")
            .with_column(11, 1, "ProductKey")
            .with_column(20, 2, "ProductKey")
            .with_calculated_column(12, 1, "Net", "Sales[Amount] * 0.9")
            .with_measure(30, 1, "Total Sales", "SUM(Sales[Amount])")
            .with_measure(31, 1, "Total Net", "SUM(Sales[Net])")
            .with_relationship("Sales_Product", 11, 20)
            .with_dependency(
                CalcObjectType::Measure,
                "Sales",
                "Total Sales",
                CalcObjectType::Column,
                "Sales",
                "Amount",
            )
            .with_dependency(
                CalcObjectType::CalcColumn,
                "Sales",
                "Net",
                CalcObjectType::Column,
                "Sales",
                "Amount",
            )
            .with_dependency(
                CalcObjectType::Measure,
                "Sales",
                "Total Net",
                CalcObjectType::CalcColumn,
                "Sales",
                "Net",
            )
    }

    fn loaded() -> SemanticModel {
        let mut model = SemanticModel::connected("Sales", "Initial Catalog=Sales");
        model.load_full_model(&mut sales_snapshot()).unwrap();
        model
    }

    #[test]
    fn test_load_entities() {
        let model = loaded();

        assert_eq!(model.tables().count(), 2);
        assert_eq!(model.columns().count(), 4);
        assert_eq!(model.measures().count(), 2);
        assert_eq!(model.relationships().count(), 1);

        let sales = model.find_table("Sales").unwrap();
        assert_eq!(model.find_table_by_backend_id(1), Some(sales));
        assert!(!model.table(sales).is_placeholder());

        let net = model.find_column("Net", "Sales").unwrap();
        assert_eq!(model.column(net).kind(), ColumnKind::CalculatedColumn);
        assert_eq!(model.column(net).expression(), Some("Sales[Amount] * 0.9"));
        assert_eq!(model.find_column_by_backend_id(12), Some(net));

        let total = model.find_measure("Total Sales").unwrap();
        assert_eq!(model.measure(total).table(), Some(sales));
        assert_eq!(model.input_expression(total.into()), Some("SUM(Sales[Amount])"));
    }

    #[test]
    fn test_relationship_depends_on_both_endpoints() {
        let model = loaded();
        let relationship = model.relationships().next().unwrap();
        let (from, to) = relationship.endpoints();

        assert_eq!(model.find_column("ProductKey", "Sales"), Some(from));
        assert_eq!(model.find_column("ProductKey", "Product"), Some(to));
        assert!(relationship.is_active());

        let node = GraphNode::Relationship(relationship.id());
        assert_eq!(model.dependents(from.into()), vec![node]);
        assert_eq!(model.dependents(to.into()), vec![node]);
    }

    #[test]
    fn test_dependency_edges() {
        let model = loaded();
        let amount = model.find_column("Amount", "Sales").unwrap();
        let net = model.find_column("Net", "Sales").unwrap();
        let total_sales = model.find_measure("Total Sales").unwrap();
        let total_net = model.find_measure("Total Net").unwrap();

        assert_eq!(
            model.dependents(amount.into()),
            vec![GraphNode::Measure(total_sales), GraphNode::Column(net)]
        );
        assert_eq!(model.dependents(net.into()), vec![GraphNode::Measure(total_net)]);
        assert_eq!(
            model.inputs_of(GraphNode::Measure(total_net)),
            vec![DataInput::Column(net)]
        );
    }

    #[test]
    fn test_load_from_json_snapshot() {
        let json = r#"{
            "tables": [{"ID": 1, "Name": "Sales"}],
            "columns": [
                {"ID": 10, "TableID": 1, "ExplicitName": "Amount"},
                {"ID": 11, "TableID": 1, "InferredName": "RowNumber-2662979B"}
            ],
            "measures": [{"ID": 20, "TableID": 1, "Name": "Total Sales", "Expression": "SUM(Sales[Amount])"}],
            "dependencies": [{
                "OBJECT_TYPE": "MEASURE", "TABLE": "Sales", "OBJECT": "Total Sales",
                "REFERENCED_OBJECT_TYPE": "COLUMN", "REFERENCED_TABLE": "Sales", "REFERENCED_OBJECT": "Amount"
            }]
        }"#;
        let mut snapshot = MetadataSnapshot::from_json_str(json).unwrap();
        let mut model = SemanticModel::connected("Sales", "");
        model.load_full_model(&mut snapshot).unwrap();

        assert_eq!(model.columns().count(), 2);
        assert!(model.find_column("RowNumber-2662979B", "Sales").is_some());
        let amount = model.find_column("Amount", "Sales").unwrap();
        assert_eq!(model.dependents(amount.into()).len(), 1);
    }

    #[test]
    fn test_non_model_dependencies_are_ignored() {
        let mut snapshot = MetadataSnapshot::new()
            .with_table(1, "Sales")
            .with_column(10, 1, "Amount")
            .with_dependency(
                CalcObjectType::Hierarchy,
                "Sales",
                "Amount Hierarchy",
                CalcObjectType::Column,
                "Sales",
                "Amount",
            );
        let mut model = SemanticModel::connected("Sales", "");
        model.load_full_model(&mut snapshot).unwrap();
        assert_eq!(model.graph().edge_count(), 0);
    }

    #[test]
    fn test_column_with_unknown_table_fails() {
        let mut snapshot = MetadataSnapshot::new()
            .with_table(1, "Sales")
            .with_column(10, 7, "Amount");
        let mut model = SemanticModel::connected("Sales", "");
        let err = model.load_full_model(&mut snapshot).unwrap_err();

        assert!(matches!(err, ModelError::ColumnTableNotFound { table_id: 7, .. }));
        assert!(err.to_string().contains("Amount"));
        assert_eq!(model.tables().count(), 0);
    }

    #[test]
    fn test_relationship_with_unknown_column_fails() {
        let mut snapshot = MetadataSnapshot::new()
            .with_table(1, "Sales")
            .with_column(10, 1, "Amount")
            .with_relationship("Broken", 10, 99);
        let mut model = SemanticModel::connected("Sales", "");
        let err = model.load_full_model(&mut snapshot).unwrap_err();
        assert!(matches!(
            err,
            ModelError::RelationshipEndpointNotFound { to_column_id: 99, .. }
        ));
    }

    #[test]
    fn test_dependency_on_unknown_object_fails() {
        let mut snapshot = MetadataSnapshot::new()
            .with_table(1, "Sales")
            .with_measure(20, 1, "Total", "SUM(Sales[Gone])")
            .with_dependency(
                CalcObjectType::Measure,
                "Sales",
                "Total",
                CalcObjectType::Column,
                "Sales",
                "Gone",
            );
        let mut model = SemanticModel::connected("Sales", "");
        let err = model.load_full_model(&mut snapshot).unwrap_err();

        assert!(matches!(err, ModelError::DependencyNotFound { ref name, .. } if name == "Gone"));
        assert_eq!(model.measures().count(), 0);
        assert_eq!(model.graph().edge_count(), 0);
    }

    /// A source whose dependency query fails
    struct FailingSource {
        inner: MetadataSnapshot,
    }

    impl MetadataSource for FailingSource {
        fn tables(&mut self) -> MetadataResult<Vec<TableRow>> {
            self.inner.tables()
        }

        fn columns(&mut self) -> MetadataResult<Vec<ColumnRow>> {
            self.inner.columns()
        }

        fn measures(&mut self) -> MetadataResult<Vec<MeasureRow>> {
            self.inner.measures()
        }

        fn relationships(&mut self) -> MetadataResult<Vec<RelationshipRow>> {
            self.inner.relationships()
        }

        fn dependencies(&mut self) -> MetadataResult<Vec<DependencyRow>> {
            Err(MetadataError::Query {
                view: "DISCOVER_CALC_DEPENDENCY".to_string(),
                message: "connection reset".to_string(),
            })
        }
    }

    #[test]
    fn test_source_failure_leaves_model_empty() {
        let mut source = FailingSource {
            inner: sales_snapshot(),
        };
        let mut model = SemanticModel::connected("Sales", "");
        let err = model.load_full_model(&mut source).unwrap_err();

        assert!(matches!(err, ModelError::Metadata { .. }));
        assert_eq!(model.tables().count(), 0);
        assert_eq!(model.columns().count(), 0);
    }
}
