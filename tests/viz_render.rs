use order_atlas::dashboard::{CountryFill, Symbol};
use order_atlas::models::{Granularity, Metric, Order};
use order_atlas::render::render_symbol_sheet;
use order_atlas::style::{Rgb8, SymbolColor};
use order_atlas::{Dashboard, DashboardConfig, ManualClock};
use std::fs;
use tempfile::tempdir;

fn symbol(country: &str, city: &str, radius: f64) -> Symbol {
    Symbol {
        country: country.into(),
        city: Some(city.into()),
        value: radius,
        radius,
        color: SymbolColor::new(Rgb8::new(255, 100, 0), 0.6),
    }
}

fn fill(country: &str, value: f64) -> CountryFill {
    CountryFill {
        country: country.into(),
        value,
        color: Rgb8::new(8, 104, 172),
    }
}

#[test]
fn svg_sheet_has_one_circle_per_symbol() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sheet.svg");
    let symbols = vec![symbol("USA", "Seattle", 20.0), symbol("France", "Paris", 5.0)];
    render_symbol_sheet(&symbols, &[fill("USA", 2.0)], &path, 400, 300).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    // filled disc plus outline per symbol
    assert_eq!(svg.matches("<circle").count(), 4);
    assert!(svg.contains("<rect"));
}

#[test]
fn png_sheet_is_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sheet.png");
    render_symbol_sheet(&[symbol("USA", "Seattle", 10.0)], &[], &path, 200, 150).unwrap();
    assert!(fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn empty_sheet_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.svg");
    assert!(render_symbol_sheet(&[], &[], &path, 200, 150).is_err());
    assert!(!path.exists());
}

#[test]
fn renders_dashboard_encodings() {
    let orders = vec![
        Order {
            country: "United States".into(),
            city: "Seattle".into(),
            profit: Some(-4.0),
            ..Default::default()
        },
        Order {
            country: "France".into(),
            city: "Paris".into(),
            profit: Some(9.0),
            ..Default::default()
        },
    ];
    let mut dash = Dashboard::new(orders, DashboardConfig::default(), ManualClock::new());
    dash.set_granularity(Granularity::City);
    dash.set_metric(Metric::Profit);

    let dir = tempdir().unwrap();
    let path = dir.path().join("dash.svg");
    render_symbol_sheet(&dash.symbols(), &dash.country_fills(), &path, 600, 400).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert_eq!(svg.matches("<circle").count(), 4);
}
