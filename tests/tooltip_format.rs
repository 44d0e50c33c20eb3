use order_atlas::AggregateRecord;
use order_atlas::models::{ChoroplethMetric, Metric, Order, TimeWindow};
use order_atlas::profile::country_profiles;
use order_atlas::tooltip::{city_tooltip, country_tooltip, format_metric_value};

fn record() -> AggregateRecord {
    AggregateRecord {
        orders: 4,
        sales: 1234.5,
        profit: -12.5,
        quantity: 11.0,
        shipping: 99.999,
        discount: 1.0,
        max_discount: 0.5,
    }
}

#[test]
fn city_tooltip_per_metric() {
    let r = record();
    assert_eq!(city_tooltip("Paris", Some(&r), Metric::Orders), "Paris\nOrders: 4");
    assert_eq!(city_tooltip("Paris", Some(&r), Metric::Sales), "Paris\nTotal Sales: $1,234.50");
    assert_eq!(city_tooltip("Paris", Some(&r), Metric::Profit), "Paris\nNet: -$12.50");
    assert_eq!(city_tooltip("Paris", Some(&r), Metric::Quantity), "Paris\nQuantity: 11");
    assert_eq!(city_tooltip("Paris", Some(&r), Metric::Shipping), "Paris\nShipping Cost: $100.00");
    assert_eq!(
        city_tooltip("Paris", Some(&r), Metric::Discount),
        "Paris\nHighest Discount: 50.0%\nAverage Discount: 25.0%"
    );
}

#[test]
fn missing_record_yields_only_the_name() {
    assert_eq!(city_tooltip("Nowhere", None, Metric::Sales), "Nowhere");
    assert_eq!(country_tooltip("Nowhere", None, ChoroplethMetric::Segment), "Nowhere");
}

#[test]
fn legend_values_follow_the_metric_unit() {
    assert_eq!(format_metric_value(Metric::Discount, 0.125), "12.5%");
    assert_eq!(format_metric_value(Metric::Profit, -3.0), "-$3.00");
    assert_eq!(format_metric_value(Metric::Orders, 12345.0), "12,345");
}

fn orders() -> Vec<Order> {
    let base = Order {
        country: "United States".into(),
        city: "Seattle".into(),
        ship_mode: "First Class".into(),
        segment: "Consumer".into(),
        category: "Technology".into(),
        order_priority: "High".into(),
        quantity: Some(3.0),
        ..Default::default()
    };
    vec![
        Order {
            sales: Some(100.0),
            profit: Some(40.0),
            discount: Some(0.1),
            shipping_cost: Some(10.0),
            ..base.clone()
        },
        Order {
            sales: Some(300.0),
            profit: Some(-10.0),
            discount: Some(0.3),
            shipping_cost: Some(30.0),
            order_priority: "Critical".into(),
            ..base
        },
    ]
}

#[test]
fn country_tooltip_per_heatmap_metric() {
    let profiles = country_profiles(&orders(), &TimeWindow::unbounded());
    let usa = profiles.get("USA");
    assert!(usa.is_some());

    assert_eq!(country_tooltip("USA", usa, ChoroplethMetric::Orders), "USA\nTotal Orders: 2");
    assert_eq!(
        country_tooltip("USA", usa, ChoroplethMetric::ShippingMode),
        "USA\nStandard Class: 0\nFirst Class: 2\nSecond Class: 0\nSame Day: 0"
    );
    assert_eq!(
        country_tooltip("USA", usa, ChoroplethMetric::Sales),
        "USA\nLowest: $100.00\nAverage: $200.00\nHighest: $300.00"
    );
    assert_eq!(
        country_tooltip("USA", usa, ChoroplethMetric::Profit),
        "USA\nTotal Profit: $30.00\nLowest: -$10.00\nAverage: $15.00\nHighest: $40.00"
    );
    assert_eq!(
        country_tooltip("USA", usa, ChoroplethMetric::Discounts),
        "USA\nAverage Discount: 20.0%"
    );
    assert_eq!(
        country_tooltip("USA", usa, ChoroplethMetric::Priority),
        "USA\nMedium: 0 (0.0%)\nHigh: 1 (50.0%)\nLow: 0 (0.0%)\nCritical: 1 (50.0%)"
    );
    assert_eq!(country_tooltip("USA", usa, ChoroplethMetric::Quantity), "USA\nTotal Quantity: 6");
}
