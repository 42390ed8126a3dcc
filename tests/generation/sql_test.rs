#[cfg(test)]
mod tests {
    use cubist::model::{ComposedMetric, SimpleMetric};
    use cubist::sql::{Ansi, SqlGenerator};
    use cubist::{
        Aggregation, Attribute, AttributeType, DataSet, Entity, LinkOptions, Model, PathStep,
    };

    struct Fixture {
        model: Model,
        customers: DataSet,
        order_items: DataSet,
    }

    /// The web-shop example model: customers, orders, order items, products.
    fn fixture() -> Fixture {
        let mut model = Model::new();
        let customer = model
            .add_entity(
                Entity::new("Customer", "People that made a purchase", "e_dim")
                    .with_attribute(
                        Attribute::new("Customer ID", "The unique identifier of the customer")
                            .with_type(AttributeType::Id)
                            .high_cardinality(),
                    )
                    .with_attribute(Attribute::new("Age", "Age of the customer").personal_data())
                    .with_attribute(
                        Attribute::new(
                            "duration since first order days",
                            "Days since the first order",
                        )
                        .with_column_name("duration_since_first_order_days")
                        .with_type(AttributeType::Duration)
                        .inaccessible_via_entity_link(),
                    ),
            )
            .unwrap();
        let order = model
            .add_entity(
                Entity::new("Order", "Orders made at the stores", "e_dim")
                    .with_attribute(
                        Attribute::new("Order date", "The order timestamp")
                            .with_type(AttributeType::Date),
                    )
                    .with_attribute(
                        Attribute::new("Status", "New / In process / Closed")
                            .with_type(AttributeType::Enum)
                            .important_field(),
                    ),
            )
            .unwrap();
        let product = model
            .add_entity(
                Entity::new("Product", "Products sold at the stores", "e_dim").with_attribute(
                    Attribute::new("Categories", "Where the product is displayed")
                        .with_type(AttributeType::Array),
                ),
            )
            .unwrap();
        let order_item = model
            .add_entity(
                Entity::new("Order item", "The unique items of an order", "e_dim")
                    .with_attribute(
                        Attribute::new("Order item ID", "Unique ID of items in an order")
                            .with_type(AttributeType::Id)
                            .high_cardinality(),
                    ),
            )
            .unwrap();

        model.link_entity(
            customer,
            order,
            LinkOptions::new()
                .with_fk_column("first_order_fk")
                .with_prefix("First order"),
        );
        model.link_entity(
            order,
            customer,
            LinkOptions::new().with_fk_column("customer_fk"),
        );
        model.link_entity(
            order_item,
            order,
            LinkOptions::new().with_fk_column("order_fk"),
        );
        model.link_entity(
            order_item,
            product,
            LinkOptions::new().with_fk_column("product_fk"),
        );

        let mut customers = DataSet::new(customer, "Customers").with_max_entity_link_depth(2);
        customers
            .add_simple_metric(
                SimpleMetric::new(
                    "# Orders",
                    "Number of purchases made by this customer",
                    "number_of_orders",
                    Aggregation::Sum,
                )
                .important_field(),
            )
            .unwrap();
        customers
            .add_simple_metric(SimpleMetric::new(
                "Revenue (lifetime)",
                "Lifetime revenue of this customer",
                "revenue_lifetime",
                Aggregation::Sum,
            ))
            .unwrap();
        customers
            .add_composed_metric(ComposedMetric::new(
                "Revenue per order",
                "The average revenue of an order",
                "[Revenue (lifetime)] / [# Orders]",
            ))
            .unwrap();
        customers
            .exclude_path(
                &model,
                &[PathStep::via("Order", "First order"), PathStep::to("Customer")],
            )
            .unwrap();
        customers
            .exclude_attributes(
                &model,
                &[PathStep::via("Order", "First order")],
                Some(&["Order date"]),
            )
            .unwrap();

        let mut order_items = DataSet::new(order_item, "Order items").with_max_entity_link_depth(1);
        order_items
            .add_simple_metric(SimpleMetric::new(
                "Revenue",
                "Revenue based on item price and delivery fee",
                "revenue",
                Aggregation::Sum,
            ))
            .unwrap();
        order_items
            .include_attributes(
                &model,
                &[PathStep::to("Order"), PathStep::to("Customer")],
                &["Age"],
            )
            .unwrap();

        Fixture {
            model,
            customers,
            order_items,
        }
    }

    #[test]
    fn test_flattened_select_for_order_items() {
        let fixture = fixture();
        let generator = SqlGenerator::new(&fixture.model, Ansi);
        let sql = generator.flattened_select(&fixture.order_items);
        assert_eq!(
            sql,
            "SELECT\n    \
             \"Order item\".\"order_item_id\" AS \"Order item ID\",\n    \
             \"Order\".\"order_date\" AS \"Order date\",\n    \
             CAST(\"Order\".\"status\" AS TEXT) AS \"Order status\",\n    \
             \"Order Customer\".\"age\" AS \"Order customer age\",\n    \
             \"Product\".\"categories\" AS \"Product categories\",\n    \
             COALESCE(\"Order item\".\"revenue\", 0) AS \"Revenue\"\n\
             FROM \"e_dim\".\"order_item\" AS \"Order item\"\n\
             LEFT JOIN \"e_dim\".\"order\" AS \"Order\" ON \"Order item\".\"order_fk\" = \"Order\".\"order_id\"\n\
             LEFT JOIN \"e_dim\".\"customer\" AS \"Order Customer\" ON \"Order\".\"customer_fk\" = \"Order Customer\".\"customer_id\"\n\
             LEFT JOIN \"e_dim\".\"product\" AS \"Product\" ON \"Order item\".\"product_fk\" = \"Product\".\"product_id\""
        );
    }

    #[test]
    fn test_flattened_select_for_customers_renders_three_metric_columns() {
        let fixture = fixture();
        let generator = SqlGenerator::new(&fixture.model, Ansi);
        let sql = generator.flattened_select(&fixture.customers);

        assert!(sql.contains("COALESCE(\"Customer\".\"number_of_orders\", 0) AS \"# Orders\""));
        assert!(sql.contains("COALESCE(\"Customer\".\"revenue_lifetime\", 0) AS \"Revenue (lifetime)\""));
        // the composed metric guards its denominator against zero
        assert!(sql.contains(
            "(COALESCE(\"Customer\".\"revenue_lifetime\", 0)) / \
             NULLIF(COALESCE(\"Customer\".\"number_of_orders\", 0), 0) AS \"Revenue per order\""
        ));

        // the excluded back-reference produces no join
        assert_eq!(sql.matches("LEFT JOIN").count(), 1);
        assert!(sql.contains(
            "LEFT JOIN \"e_dim\".\"order\" AS \"First order Order\" \
             ON \"Customer\".\"first_order_fk\" = \"First order Order\".\"order_id\""
        ));
        // the per-path attribute exclusion hides the order date
        assert!(!sql.contains("\"First order Order\".\"order_date\""));
        assert!(sql.contains("CAST(\"First order Order\".\"status\" AS TEXT) AS \"First order status\""));
    }

    #[test]
    fn test_division_guard_applies_only_to_denominators() {
        let fixture = fixture();
        let mut data_set = fixture.customers.clone();
        data_set
            .add_composed_metric(ComposedMetric::new(
                "Total engagement",
                "",
                "[Revenue (lifetime)] + [# Orders]",
            ))
            .unwrap();

        let generator = SqlGenerator::new(&fixture.model, Ansi);
        let sql = generator.flattened_select(&data_set);
        assert!(sql.contains(
            "(COALESCE(\"Customer\".\"revenue_lifetime\", 0)) + \
             (COALESCE(\"Customer\".\"number_of_orders\", 0)) AS \"Total engagement\""
        ));
    }

    #[test]
    fn test_division_guard_propagates_through_nested_composed_metrics() {
        let fixture = fixture();
        let mut data_set = fixture.customers.clone();
        data_set
            .add_composed_metric(ComposedMetric::new(
                "Orders per revenue",
                "",
                "[# Orders] / [Revenue per order]",
            ))
            .unwrap();

        let generator = SqlGenerator::new(&fixture.model, Ansi);
        let sql = generator.flattened_select(&data_set);
        assert!(sql.contains(
            "(COALESCE(\"Customer\".\"number_of_orders\", 0)) / \
             NULLIF((COALESCE(\"Customer\".\"revenue_lifetime\", 0)) / \
             NULLIF(COALESCE(\"Customer\".\"number_of_orders\", 0), 0), 0) \
             AS \"Orders per revenue\""
        ));
    }

    #[test]
    fn test_count_metrics_render_as_presence_indicators() {
        let fixture = fixture();
        let mut data_set = fixture.order_items.clone();
        data_set
            .add_simple_metric(SimpleMetric::new(
                "# Order items",
                "",
                "order_item_id",
                Aggregation::DistinctCount,
            ))
            .unwrap();

        let generator = SqlGenerator::new(&fixture.model, Ansi);
        let sql = generator.flattened_select(&data_set);
        assert!(sql.contains(
            "CASE WHEN \"Order item\".\"order_item_id\" IS NOT NULL THEN 1 ELSE 0 END \
             AS \"# Order items\""
        ));
    }

    #[test]
    fn test_star_schema_select_for_order_items() {
        let fixture = fixture();
        let generator = SqlGenerator::new(&fixture.model, Ansi);
        let sql = generator.star_schema_select(&fixture.order_items);
        assert_eq!(
            sql,
            "SELECT\n    \
             \"Order item\".\"order_item_id\",\n    \
             \"Order item\".\"revenue\",\n    \
             \"Order item\".\"order_fk\" AS \"Order item order_fk\",\n    \
             CAST(TO_CHAR(\"Order\".\"order_date\", 'YYYYMMDD') AS INTEGER) AS \"Order date (FK)\",\n    \
             \"Order\".\"customer_fk\" AS \"Order customer_fk\",\n    \
             \"Order item\".\"product_fk\" AS \"Order item product_fk\"\n\
             FROM \"e_dim\".\"order_item\" AS \"Order item\"\n\
             LEFT JOIN \"e_dim\".\"order\" AS \"Order\" ON \"Order item\".\"order_fk\" = \"Order\".\"order_id\"\n\
             LEFT JOIN \"e_dim\".\"customer\" AS \"Order Customer\" ON \"Order\".\"customer_fk\" = \"Order Customer\".\"customer_id\"\n\
             LEFT JOIN \"e_dim\".\"product\" AS \"Product\" ON \"Order item\".\"product_fk\" = \"Product\".\"product_id\""
        );
    }

    #[test]
    fn test_star_schema_keeps_duration_attributes_as_raw_foreign_keys() {
        let fixture = fixture();
        let generator = SqlGenerator::new(&fixture.model, Ansi);
        let sql = generator.star_schema_select(&fixture.customers);
        assert!(sql.contains(
            "\"Customer\".\"duration_since_first_order_days\" \
             AS \"Duration since first order days (FK)\""
        ));
        // inlined only as a foreign key, not as a plain column
        assert!(!sql.contains("\"duration_since_first_order_days\","));
    }
}
