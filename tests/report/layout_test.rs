#[cfg(test)]
mod tests {
    use findmeasure::report::{FieldKind, FieldReference, LayoutError, LoadOptions, ReportLayout};
    use serde_json::{json, Value};

    /// Helper to embed a JSON value as text, the way report layouts store
    /// visual configs and filters
    fn embed(value: Value) -> Value {
        Value::String(value.to_string())
    }

    fn column(source: Value, property: &str) -> Value {
        json!({"Column": {"Expression": {"SourceRef": source}, "Property": property}})
    }

    fn measure(source: Value, property: &str) -> Value {
        json!({"Measure": {"Expression": {"SourceRef": source}, "Property": property}})
    }

    fn region_filter() -> Value {
        json!({
            "name": "Filter1",
            "expression": column(json!({"Entity": "Sales"}), "Region"),
            "filter": {
                "Version": 2,
                "From": [{"Name": "s", "Entity": "Sales", "Type": 0}],
                "Where": [{"Condition": {"In": {
                    "Expressions": [column(json!({"Source": "s"}), "Region")],
                    "Values": [[{"Literal": {"Value": "'West'"}}]]
                }}}]
            },
            "type": "Categorical"
        })
    }

    fn bar_chart(name: &str, hidden: bool) -> Value {
        let mut single_visual = json!({
            "visualType": "barChart",
            "prototypeQuery": {
                "Version": 2,
                "From": [
                    {"Name": "s", "Entity": "Sales", "Type": 0},
                    {"Name": "d", "Entity": "Date", "Type": 0}
                ],
                "Select": [
                    column(json!({"Source": "d"}), "Year"),
                    measure(json!({"Source": "s"}), "Total Sales")
                ]
            }
        });
        if hidden {
            single_visual["display"] = json!({"mode": "hidden"});
        }
        json!({
            "x": 10.0,
            "y": 20.0,
            "config": embed(json!({"name": name, "singleVisual": single_visual})),
            "filters": embed(json!([region_filter()]))
        })
    }

    fn store_layout() -> String {
        json!({
            "id": 0,
            "sections": [
                {
                    "name": "ReportSection1",
                    "displayName": "Overview",
                    "config": "{}",
                    "filters": embed(json!([{
                        "name": "Filter2",
                        "expression": measure(json!({"Entity": "Sales"}), "Total Sales")
                    }])),
                    "visualContainers": [bar_chart("chart1", false), bar_chart("chart2", true)]
                },
                {
                    "name": "ReportSection2",
                    "displayName": "Details",
                    "config": embed(json!({"visibility": 1})),
                    "visualContainers": [bar_chart("chart3", false)]
                }
            ],
            "filters": "[]"
        })
        .to_string()
    }

    fn reference(kind: FieldKind, table: &str, name: &str) -> FieldReference {
        FieldReference {
            kind,
            table: table.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_parse_pages_visuals_and_filters() {
        let layout = ReportLayout::parse(&store_layout(), &LoadOptions::default()).unwrap();

        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.visual_count(), 3);
        // one page filter, one filter on each visual, no report filters
        assert_eq!(layout.filter_count(), 4);

        let overview = &layout.pages[0];
        assert_eq!(overview.name, "ReportSection1");
        assert_eq!(overview.display_name, "Overview");
        assert!(!overview.hidden);
        assert_eq!(
            overview.filters[0].references,
            vec![reference(FieldKind::Measure, "Sales", "Total Sales")]
        );

        let chart = &overview.visuals[0];
        assert_eq!(chart.name, "chart1");
        assert_eq!(chart.visual_type, "barChart");
        assert_eq!(
            chart.references,
            vec![
                reference(FieldKind::Column, "Date", "Year"),
                reference(FieldKind::Measure, "Sales", "Total Sales"),
            ]
        );
        assert_eq!(
            chart.filters[0].references,
            vec![reference(FieldKind::Column, "Sales", "Region")]
        );
        assert!(chart.filters[0].conditions.contains("'West'"));

        assert!(overview.visuals[1].hidden);
        assert!(layout.pages[1].hidden);
    }

    #[test]
    fn test_hidden_objects_excluded_by_options() {
        let options = LoadOptions {
            include_hidden_pages: false,
            include_hidden_visuals: false,
        };
        let layout = ReportLayout::parse(&store_layout(), &options).unwrap();

        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.pages[0].display_name, "Overview");
        assert_eq!(layout.visual_count(), 1);
        assert_eq!(layout.pages[0].visuals[0].name, "chart1");
    }

    #[test]
    fn test_filter_expression_metadata_uses_nested_aliases() {
        let filter = json!({
            "name": "Filter3",
            "filterExpressionMetadata": {
                "expressions": [
                    column(json!({"Source": "p"}), "Category"),
                    measure(json!({"Source": "s"}), "Margin")
                ],
                "cachedValueItems": [],
                "jsonFilter": {
                    "From": [
                        {"Name": "p", "Entity": "Product", "Type": 0},
                        {"Name": "s", "Entity": "Sales", "Type": 0}
                    ]
                }
            }
        });
        let doc = json!({
            "sections": [],
            "filters": embed(json!([filter]))
        });
        let layout = ReportLayout::parse(&doc.to_string(), &LoadOptions::default()).unwrap();

        assert_eq!(layout.filters.len(), 1);
        assert_eq!(
            layout.filters[0].references,
            vec![
                reference(FieldKind::Column, "Product", "Category"),
                reference(FieldKind::Measure, "Sales", "Margin"),
            ]
        );
    }

    #[test]
    fn test_filter_without_expression_has_no_references() {
        let doc = json!({
            "sections": [],
            "filters": embed(json!([{"name": "Filter4", "type": "Advanced"}]))
        });
        let layout = ReportLayout::parse(&doc.to_string(), &LoadOptions::default()).unwrap();
        assert_eq!(layout.filters.len(), 1);
        assert!(layout.filters[0].references.is_empty());
    }

    #[test]
    fn test_visual_without_query_has_no_references() {
        let doc = json!({
            "sections": [{
                "name": "P",
                "config": "{}",
                "visualContainers": [{
                    "config": embed(json!({"name": "title", "singleVisual": {"visualType": "textbox"}}))
                }]
            }]
        });
        let layout = ReportLayout::parse(&doc.to_string(), &LoadOptions::default()).unwrap();
        let visual = &layout.pages[0].visuals[0];
        assert_eq!(visual.visual_type, "textbox");
        assert!(visual.references.is_empty());
    }

    #[test]
    fn test_invalid_documents() {
        let err = ReportLayout::parse("not json", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidDocument(_)));

        let err = ReportLayout::parse(r#"{"id": 0}"#, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LayoutError::MissingSections));

        let doc = json!({"sections": [{"name": "P", "visualContainers": []}]});
        let err = ReportLayout::parse(&doc.to_string(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LayoutError::MissingField { field: "config", .. }));
    }

    #[test]
    fn test_reference_without_source_ref_is_fatal() {
        let doc = json!({
            "sections": [{
                "name": "P",
                "config": "{}",
                "visualContainers": [{
                    "config": embed(json!({
                        "name": "v",
                        "singleVisual": {
                            "visualType": "card",
                            "prototypeQuery": {
                                "From": [],
                                "Select": [{"Measure": {"Property": "Total"}}]
                            }
                        }
                    }))
                }]
            }]
        });
        let err = ReportLayout::parse(&doc.to_string(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LayoutError::MissingField { field: "Expression.SourceRef", .. }));
    }
}
