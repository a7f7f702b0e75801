#[cfg(test)]
mod tests {
    use findmeasure::model::{ColumnKind, DataInput};
    use findmeasure::semantic::{GraphNode, ModelError, RunMode, SemanticModel};

    #[test]
    fn test_new_model_defaults() {
        let model = SemanticModel::connected("Sales", "Data Source=localhost");
        assert_eq!(model.name(), "Sales");
        assert_eq!(model.connection(), "Data Source=localhost");
        assert_eq!(model.mode(), RunMode::Connected);
        assert_eq!(model.tables().count(), 0);
        assert_eq!(model.graph().edge_count(), 0);
    }

    #[test]
    fn test_column_placeholder_creates_table_once() {
        let mut model = SemanticModel::disconnected("Local");
        let amount = model.column_placeholder("Amount", "Sales").unwrap();
        let cost = model.column_placeholder("Cost", "Sales").unwrap();
        let again = model.column_placeholder("Amount", "Sales").unwrap();

        assert_eq!(amount, again);
        assert_ne!(amount, cost);
        assert_eq!(model.tables().count(), 1);

        let table = model.find_table("Sales").unwrap();
        assert!(model.table(table).is_placeholder());
        assert_eq!(model.table(table).columns(), &[amount, cost]);
        assert_eq!(model.column(amount).kind(), ColumnKind::Column);
    }

    #[test]
    fn test_same_column_name_in_two_tables() {
        let mut model = SemanticModel::disconnected("Local");
        let sales = model.column_placeholder("Date", "Sales").unwrap();
        let budget = model.column_placeholder("Date", "Budget").unwrap();

        assert_ne!(sales, budget);
        assert_eq!(model.find_column("Date", "Budget"), Some(budget));
        assert_eq!(model.find_column("Date", "Missing"), None);
    }

    #[test]
    fn test_measure_placeholder_attaches_table_later() {
        let mut model = SemanticModel::disconnected("Local");
        let total = model.measure_placeholder("Total", None).unwrap();
        assert_eq!(model.measure(total).table(), None);
        assert_eq!(model.qualified_name(total.into()), "[Total]");

        let same = model.measure_placeholder("Total", Some("Sales")).unwrap();
        assert_eq!(total, same);
        let sales = model.find_table("Sales").unwrap();
        assert_eq!(model.measure(total).table(), Some(sales));
        assert_eq!(model.table(sales).measures(), &[total]);
        assert_eq!(model.qualified_name(total.into()), "Sales[Total]");

        // A later table name does not move the measure.
        model.measure_placeholder("Total", Some("Budget")).unwrap();
        assert_eq!(model.measure(total).table(), Some(sales));
    }

    #[test]
    fn test_placeholders_rejected_when_connected() {
        let mut model = SemanticModel::connected("Sales", "");
        let err = model.measure_placeholder("Total", Some("Sales")).unwrap_err();
        assert!(matches!(
            err,
            ModelError::PlaceholderInConnectedMode { kind: "measure", .. }
        ));
        assert!(model.table_placeholder("Sales").is_err());
        assert_eq!(model.tables().count(), 0);
    }

    #[test]
    fn test_resolution_follows_mode() {
        let mut connected = SemanticModel::connected("Sales", "");
        assert_eq!(connected.resolve_column("Amount", "Sales"), None);
        assert_eq!(connected.resolve_measure("Total", Some("Sales")), None);

        let mut disconnected = SemanticModel::disconnected("Local");
        assert!(disconnected.resolve_column("Amount", "Sales").is_some());
        assert!(disconnected.resolve_measure("Total", Some("Sales")).is_some());
        assert_eq!(disconnected.data_inputs().count(), 2);
    }

    #[test]
    fn test_data_inputs_list_columns_first() {
        let mut model = SemanticModel::disconnected("Local");
        let total = model.measure_placeholder("Total", Some("Sales")).unwrap();
        let amount = model.column_placeholder("Amount", "Sales").unwrap();

        let inputs: Vec<DataInput> = model.data_inputs().collect();
        assert_eq!(inputs, vec![DataInput::Column(amount), DataInput::Measure(total)]);
    }

    #[test]
    fn test_dependents_and_inputs() {
        let mut model = SemanticModel::disconnected("Local");
        let amount = model.column_placeholder("Amount", "Sales").unwrap();
        let total = model.measure_placeholder("Total", Some("Sales")).unwrap();

        assert!(model.add_dependent(amount.into(), GraphNode::Measure(total)));
        assert!(!model.add_dependent(amount.into(), GraphNode::Measure(total)));

        assert_eq!(model.dependents(amount.into()), vec![GraphNode::Measure(total)]);
        assert_eq!(model.inputs_of(GraphNode::Measure(total)), vec![DataInput::Column(amount)]);
        assert_eq!(model.graph().edge_count(), 1);
    }

    #[test]
    fn test_describe_model_entities() {
        let mut model = SemanticModel::disconnected("Local");
        let amount = model.column_placeholder("Amount", "Sales").unwrap();

        let description = model.describe(GraphNode::Column(amount));
        assert_eq!(description.target_type, "Column");
        assert_eq!(description.name, "Amount");
        assert_eq!(description.table.as_deref(), Some("Sales"));
        assert_eq!(description.report, None);
    }

    #[test]
    fn test_mode_is_fixed_at_construction() {
        let mut connected = SemanticModel::new("Sales", "", RunMode::Connected);
        assert!(connected.resolve_column("Amount", "Sales").is_none());
        assert_eq!(connected.mode().to_string(), "connected");

        let mut local = SemanticModel::new("Sales", "", RunMode::Disconnected);
        assert!(local.resolve_column("Amount", "Sales").is_some());
        assert_eq!(local.mode().to_string(), "disconnected");
    }
}
