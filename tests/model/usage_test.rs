#[cfg(test)]
mod tests {
    use findmeasure::model::{MeasureId, TableId};
    use findmeasure::semantic::{
        classify_all, usage_state, GraphNode, SemanticModel, UsageClassifier, UsageState,
    };

    fn model_with_measures(names: &[&str]) -> (SemanticModel, Vec<MeasureId>) {
        let mut model = SemanticModel::disconnected("Local");
        let ids = names
            .iter()
            .map(|name| model.measure_placeholder(name, Some("Sales")).unwrap())
            .collect();
        (model, ids)
    }

    /// A calculated table standing in for a real consumer
    fn consumer(model: &mut SemanticModel, name: &str) -> GraphNode {
        let table: TableId = model.table_placeholder(name).unwrap();
        GraphNode::Table(table)
    }

    #[test]
    fn test_states_are_ordered() {
        assert!(UsageState::Unused < UsageState::UsedByUnused);
        assert!(UsageState::UsedByUnused < UsageState::Used);
        assert_eq!(UsageState::UsedByUnused.to_string(), "UsedByUnused");
    }

    #[test]
    fn test_no_dependents_is_unused() {
        let (model, ids) = model_with_measures(&["Total"]);
        assert_eq!(usage_state(&model, ids[0].into()), UsageState::Unused);
    }

    #[test]
    fn test_chain_to_consumer_is_used() {
        // Amount -> Base -> Total -> Top Sales
        let (mut model, ids) = model_with_measures(&["Base", "Total"]);
        let amount = model.column_placeholder("Amount", "Sales").unwrap();
        let top = consumer(&mut model, "Top Sales");
        model.add_dependent(amount.into(), GraphNode::Measure(ids[0]));
        model.add_dependent(ids[0].into(), GraphNode::Measure(ids[1]));
        model.add_dependent(ids[1].into(), top);

        assert_eq!(usage_state(&model, amount.into()), UsageState::Used);
        assert_eq!(usage_state(&model, ids[0].into()), UsageState::Used);
        assert_eq!(usage_state(&model, ids[1].into()), UsageState::Used);
    }

    #[test]
    fn test_only_unused_dependents_is_used_by_unused() {
        let (mut model, ids) = model_with_measures(&["Base", "Total"]);
        model.add_dependent(ids[0].into(), GraphNode::Measure(ids[1]));

        assert_eq!(usage_state(&model, ids[0].into()), UsageState::UsedByUnused);
        assert_eq!(usage_state(&model, ids[1].into()), UsageState::Unused);
    }

    #[test]
    fn test_calculated_table_is_a_real_use() {
        let mut model = SemanticModel::disconnected("Local");
        let key = model.column_placeholder("Key", "Sales").unwrap();
        let other = model.column_placeholder("Other", "Sales").unwrap();
        let top = consumer(&mut model, "Top Sales");

        model.add_dependent(other.into(), top);
        assert!(top.is_real_use());
        assert_eq!(usage_state(&model, other.into()), UsageState::Used);
        assert_eq!(usage_state(&model, key.into()), UsageState::Unused);
    }

    #[test]
    fn test_cycle_terminates() {
        let (mut model, ids) = model_with_measures(&["A", "B"]);
        model.add_dependent(ids[0].into(), GraphNode::Measure(ids[1]));
        model.add_dependent(ids[1].into(), GraphNode::Measure(ids[0]));

        assert_eq!(usage_state(&model, ids[0].into()), UsageState::UsedByUnused);
        assert_eq!(usage_state(&model, ids[1].into()), UsageState::UsedByUnused);
    }

    #[test]
    fn test_cycle_with_exit_to_consumer() {
        let (mut model, ids) = model_with_measures(&["A", "B"]);
        let top = consumer(&mut model, "Top Sales");
        model.add_dependent(ids[0].into(), GraphNode::Measure(ids[1]));
        model.add_dependent(ids[1].into(), GraphNode::Measure(ids[0]));
        model.add_dependent(ids[1].into(), top);

        assert_eq!(usage_state(&model, ids[0].into()), UsageState::Used);
        assert_eq!(usage_state(&model, ids[1].into()), UsageState::Used);
    }

    #[test]
    fn test_classify_all_agrees_with_single_queries() {
        let (mut model, ids) = model_with_measures(&["A", "B", "C", "D", "E"]);
        let amount = model.column_placeholder("Amount", "Sales").unwrap();
        let top = consumer(&mut model, "Top Sales");
        model.add_dependent(amount.into(), GraphNode::Measure(ids[0]));
        model.add_dependent(ids[0].into(), GraphNode::Measure(ids[1]));
        model.add_dependent(ids[1].into(), top);
        model.add_dependent(ids[2].into(), GraphNode::Measure(ids[3]));
        model.add_dependent(ids[3].into(), GraphNode::Measure(ids[2]));

        let all = classify_all(&model);
        assert_eq!(all.len(), 6);
        for (input, state) in &all {
            assert_eq!(*state, usage_state(&model, *input), "{}", model.qualified_name(*input));
        }

        let mut classifier = UsageClassifier::new(&model);
        assert_eq!(classifier.state(amount.into()), UsageState::Used);
        assert_eq!(classifier.state(ids[2].into()), UsageState::UsedByUnused);
        assert_eq!(classifier.state(ids[4].into()), UsageState::Unused);
    }
}
