#[cfg(test)]
mod tests {
    use cubist::model::{ComposedMetric, SimpleMetric};
    use cubist::{Aggregation, DataSet, Entity, Metric, Model, NumberFormat, SchemaError};

    fn customers_data_set() -> DataSet {
        let mut model = Model::new();
        let customer = model
            .add_entity(Entity::new("Customer", "", "e_dim"))
            .unwrap();
        DataSet::new(customer, "Customers")
    }

    #[test]
    fn test_metrics_keep_definition_order() {
        let mut data_set = customers_data_set();
        data_set
            .add_simple_metric(SimpleMetric::new(
                "# Orders",
                "Number of purchases",
                "number_of_orders",
                Aggregation::Sum,
            ))
            .unwrap();
        data_set
            .add_simple_metric(SimpleMetric::new(
                "Revenue (lifetime)",
                "Lifetime revenue",
                "revenue_lifetime",
                Aggregation::Sum,
            ))
            .unwrap();
        data_set
            .add_composed_metric(ComposedMetric::new(
                "Revenue per order",
                "Average revenue of an order",
                "[Revenue (lifetime)] / [# Orders]",
            ))
            .unwrap();

        let names: Vec<&str> = data_set.metrics().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["# Orders", "Revenue (lifetime)", "Revenue per order"]);
        assert!(data_set.find_metric("Revenue per order").is_some());
        assert!(data_set.find_metric("Revenue").is_none());
    }

    #[test]
    fn test_duplicate_metric_name_is_rejected() {
        let mut data_set = customers_data_set();
        data_set
            .add_simple_metric(SimpleMetric::new("Revenue", "", "revenue", Aggregation::Sum))
            .unwrap();
        let err = data_set
            .add_simple_metric(SimpleMetric::new("Revenue", "", "revenue", Aggregation::Sum))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateMetric {
                name: "Revenue".into(),
                data_set: "Customers".into()
            }
        );
    }

    #[test]
    fn test_composed_metric_with_unknown_reference_is_rejected() {
        let mut data_set = customers_data_set();
        let err = data_set
            .add_composed_metric(ComposedMetric::new(
                "Revenue per order",
                "",
                "[Revenue] / [# Orders]",
            ))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownMetric {
                name: "Revenue".into(),
                data_set: "Customers".into()
            }
        );
    }

    #[test]
    fn test_composed_metric_without_references_is_rejected() {
        let mut data_set = customers_data_set();
        let err = data_set
            .add_composed_metric(ComposedMetric::new("Constant", "", "1 + 1"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyFormula { .. }));
    }

    #[test]
    fn test_composed_metric_may_reference_composed_metrics() {
        let mut data_set = customers_data_set();
        data_set
            .add_simple_metric(SimpleMetric::new("Revenue", "", "revenue", Aggregation::Sum))
            .unwrap();
        data_set
            .add_simple_metric(SimpleMetric::new("Cost", "", "cost", Aggregation::Sum))
            .unwrap();
        data_set
            .add_composed_metric(ComposedMetric::new("Profit", "", "[Revenue] - [Cost]"))
            .unwrap();
        data_set
            .add_composed_metric(ComposedMetric::new(
                "Margin",
                "",
                "[Profit] / [Revenue]",
            ))
            .unwrap();

        let Some(Metric::Composed(margin)) = data_set.find_metric("Margin") else {
            panic!("expected a composed metric");
        };
        assert_eq!(margin.parent_names(), &["Profit", "Revenue"]);
    }

    #[test]
    fn test_display_formulas() {
        let mut data_set = customers_data_set();
        data_set
            .add_simple_metric(SimpleMetric::new(
                "# Orders",
                "",
                "number_of_orders",
                Aggregation::Sum,
            ))
            .unwrap();
        data_set
            .add_simple_metric(
                SimpleMetric::new("# Customers", "", "customer_id", Aggregation::DistinctCount)
                    .with_number_format(NumberFormat::Standard),
            )
            .unwrap();
        data_set
            .add_composed_metric(ComposedMetric::new(
                "Orders per customer",
                "",
                "[# Orders] / [# Customers]",
            ))
            .unwrap();

        let formulas: Vec<String> = data_set
            .metrics()
            .iter()
            .map(|m| m.display_formula())
            .collect();
        assert_eq!(
            formulas,
            vec![
                "sum(number_of_orders)",
                "distinct-count(customer_id)",
                "[# Orders] / [# Customers]",
            ]
        );
    }

    #[test]
    fn test_metric_serializes_for_documentation_consumers() {
        let metric = SimpleMetric::new("Revenue", "Total revenue", "revenue", Aggregation::Sum);
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["aggregation"], "sum");
        assert_eq!(json["number_format"], "Standard");
    }
}
