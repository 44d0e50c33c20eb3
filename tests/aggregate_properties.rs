use chrono::NaiveDate;
use order_atlas::models::{Granularity, Metric, Order, TimeWindow};
use order_atlas::{AggregateMapping, aggregate, normalize_country_name};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn order(country: &str, city: &str, day: Option<u32>, sales: Option<f64>, profit: f64, discount: f64) -> Order {
    Order {
        country: country.into(),
        city: city.into(),
        order_date: day.map(d),
        sales,
        profit: Some(profit),
        quantity: Some(2.0),
        discount: Some(discount),
        shipping_cost: Some(1.5),
        ..Default::default()
    }
}

fn sample() -> Vec<Order> {
    vec![
        order("United States", "New York City", Some(1), Some(100.0), 20.0, 0.0),
        order("United States", "Seattle", Some(3), Some(50.0), -15.0, 0.2),
        order("United States", "Seattle", Some(9), None, 5.0, 0.5),
        order("France", "Paris", Some(5), Some(80.0), 12.0, 0.1),
        order("France", "Lyon", Some(12), Some(f64::NAN), -3.0, 0.0),
        order("Germany", "Berlin", Some(20), Some(40.0), 8.0, 0.3),
        order("Germany", "Berlin", None, Some(999.0), 999.0, 0.9),
    ]
}

fn window(a: u32, b: u32) -> TimeWindow {
    TimeWindow::between(d(a), d(b))
}

#[test]
fn aggregate_is_idempotent() {
    let orders = sample();
    for g in [Granularity::Country, Granularity::City] {
        let w = window(2, 15);
        assert_eq!(aggregate(&orders, &w, g), aggregate(&orders, &w, g));
    }
}

#[test]
fn only_orders_inside_the_window_contribute() {
    let orders = sample();
    let w = window(3, 9);
    let expected = orders.iter().filter(|o| w.contains(o.order_date)).count() as u64;
    let m = aggregate(&orders, &w, Granularity::City);
    assert_eq!(m.total_orders(), expected);
    assert_eq!(expected, 3);
    // bounds are inclusive
    assert!(m.city("USA", "Seattle").is_some_and(|r| r.orders == 2));
    assert!(m.city("USA", "New York City").is_none());
}

#[test]
fn counts_are_conserved_across_granularities() {
    let orders = sample();
    let w = window(1, 31);
    let by_country = aggregate(&orders, &w, Granularity::Country);
    let by_city = aggregate(&orders, &w, Granularity::City);
    assert_eq!(by_country.total_orders(), by_city.total_orders());
    assert_eq!(by_country.by_country(), by_city.by_country());
}

#[test]
fn non_signed_totals_are_never_negative() {
    let orders = sample();
    let m = aggregate(&orders, &TimeWindow::unbounded(), Granularity::City);
    let mut saw_negative_profit = false;
    for b in m.buckets() {
        for metric in [Metric::Orders, Metric::Sales, Metric::Quantity, Metric::Shipping, Metric::Discount] {
            assert!(b.record.value(metric) >= 0.0, "{metric} negative for {}", b.name());
        }
        saw_negative_profit |= b.record.profit < 0.0;
    }
    assert!(saw_negative_profit, "profit keeps its sign");
}

#[test]
fn max_discount_matches_brute_force() {
    let orders = sample();
    let w = TimeWindow::unbounded();
    let m = aggregate(&orders, &w, Granularity::Country);
    for b in m.buckets() {
        let brute = orders
            .iter()
            .filter(|o| normalize_country_name(&o.country) == b.country && w.contains(o.order_date))
            .map(|o| o.discount.unwrap_or(0.0))
            .fold(0.0_f64, f64::max);
        assert_eq!(b.record.max_discount, brute, "{}", b.country);
    }
}

#[test]
fn missing_and_non_finite_numerics_contribute_zero() {
    let orders = sample();
    let m = aggregate(&orders, &window(1, 31), Granularity::Country);
    let usa = m.country("USA").unwrap();
    assert_eq!(usa.orders, 3);
    assert_eq!(usa.sales, 150.0);
    let fr = m.country("France").unwrap();
    assert_eq!(fr.sales, 80.0);
    assert!(fr.sales.is_finite());
}

#[test]
fn undated_orders_only_count_in_an_open_window() {
    let orders = sample();
    let open = aggregate(&orders, &TimeWindow::unbounded(), Granularity::Country);
    assert_eq!(open.country("Germany").unwrap().orders, 2);
    let half_open = aggregate(&orders, &TimeWindow::new(Some(d(1)), None), Granularity::Country);
    assert_eq!(half_open.country("Germany").unwrap().orders, 1);
}

#[test]
fn inverted_window_and_empty_input_yield_empty_mappings() {
    let orders = sample();
    let inverted = aggregate(&orders, &window(10, 2), Granularity::City);
    assert!(inverted.is_empty());
    assert_eq!(inverted.granularity(), Granularity::City);

    let empty = aggregate(&[], &TimeWindow::unbounded(), Granularity::Country);
    assert_eq!(empty, AggregateMapping::empty(Granularity::Country));
}

#[test]
fn country_keys_are_normalized() {
    let orders = sample();
    let m = aggregate(&orders, &TimeWindow::unbounded(), Granularity::City);
    assert!(m.country("USA").is_some());
    assert!(m.country("United States").is_none());
}

#[test]
fn discount_metric_reads_the_average() {
    let orders = sample();
    let m = aggregate(&orders, &window(1, 31), Granularity::Country);
    let usa = m.country("USA").unwrap();
    assert!((usa.value(Metric::Discount) - 0.7 / 3.0).abs() < 1e-12);
    assert_eq!(usa.max_discount, 0.5);
}
