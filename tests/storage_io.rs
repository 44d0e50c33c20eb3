use chrono::NaiveDate;
use order_atlas::animation::BoundsProvider;
use order_atlas::models::{Granularity, TimeWindow};
use order_atlas::{aggregate, storage};
use std::fs;
use tempfile::tempdir;

const HEADER: &str = "Row ID,Order ID,Order Date,Ship Date,Ship Mode,Customer ID,Customer Name,Segment,City,State,Country,Postal Code,Market,Region,Product ID,Category,Sub-Category,Product Name,Sales,Quantity,Discount,Profit,Shipping Cost,Order Priority";

fn sample_csv() -> String {
    [
        HEADER,
        "1,CA-1,2014-01-03,2014-01-07,Standard Class,C1,Ann,Consumer,Seattle,Washington,United States,98103,US,West,P1,Technology,Phones,Phone,221.98,2,0,62.15,40.77,High",
        "2,CA-2,01/09/2014,01/12/2014,First Class,C2,Bob,Corporate,Paris,Ile-de-France,France,,EU,Central,P2,Furniture,Chairs,Chair,\"$1,234.50\",3,0.1,-12.5,10,Medium",
        "3,CA-3,,,Same Day,C3,Cy,Home Office,Lyon,Auvergne,France,,EU,Central,P3,Office Supplies,Paper,Paper,abc,,0.2,3,,Low",
    ]
    .join("\n")
}

#[test]
fn loads_orders_leniently() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("orders.csv");
    fs::write(&path, sample_csv()).unwrap();

    let ds = storage::load_orders_csv(&path).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.skipped, 0);

    let paris = &ds.orders[1];
    assert_eq!(paris.order_date, NaiveDate::from_ymd_opt(2014, 1, 9));
    assert_eq!(paris.sales, Some(1234.5));
    assert_eq!(paris.profit, Some(-12.5));

    let lyon = &ds.orders[2];
    assert_eq!(lyon.order_date, None);
    assert_eq!(lyon.sales, None);
    assert_eq!(lyon.quantity, None);
    assert_eq!(lyon.sales_or_zero(), 0.0);

    assert_eq!(
        ds.dataset_bounds(),
        Some((
            NaiveDate::from_ymd_opt(2014, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2014, 1, 9).unwrap()
        ))
    );
}

#[test]
fn loaded_orders_aggregate_under_boundary_names() {
    let ds = storage::read_orders(sample_csv().as_bytes()).unwrap();
    let m = aggregate(&ds.orders, &TimeWindow::unbounded(), Granularity::Country);
    assert_eq!(m.country("USA").map(|r| r.orders), Some(1));
    assert_eq!(m.country("France").map(|r| r.sales), Some(1234.5));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = storage::load_orders_csv(dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, order_atlas::Error::Io(_)));
}

#[test]
fn export_csv_prefixes_formula_cells() {
    let dir = tempdir().unwrap();
    let csv_text = [HEADER, "1,X,2014-01-03,,,,,,+cmd,,@evil,,,,,,,,5,1,0,1,1,"].join("\n");
    let ds = storage::read_orders(csv_text.as_bytes()).unwrap();
    let m = aggregate(&ds.orders, &TimeWindow::unbounded(), Granularity::City);

    let path = dir.path().join("agg.csv");
    storage::save_aggregates_csv(&m, &path).unwrap();
    let txt = fs::read_to_string(&path).unwrap();
    assert!(txt.starts_with("country,city,orders,sales,"));
    assert!(txt.contains("'@evil,'+cmd,1,"));
    assert!(!txt.contains(",@evil"));
}

#[test]
fn export_json_keeps_granularity_tag() {
    let dir = tempdir().unwrap();
    let ds = storage::read_orders(sample_csv().as_bytes()).unwrap();
    let m = aggregate(&ds.orders, &TimeWindow::unbounded(), Granularity::City);
    let path = dir.path().join("agg.json");
    storage::save_aggregates_json(&m, &path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v["granularity"], "city");
    assert_eq!(v["buckets"]["France"]["Lyon"]["orders"], 1);
}
