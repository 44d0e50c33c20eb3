//! Order loading and aggregate export.
//!
//! Loading is lenient: rows that cannot be decoded at all are skipped and counted,
//! cells that are merely malformed become `None` on the order.

use crate::aggregate::AggregateMapping;
use crate::animation::BoundsProvider;
use crate::error::Result;
use crate::models::Order;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Orders loaded from one source, with the dataset bounds computed once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub orders: Vec<Order>,
    pub skipped: usize,
    bounds: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    pub fn new(orders: Vec<Order>) -> Self {
        let bounds = date_bounds(&orders);
        Self {
            orders,
            skipped: 0,
            bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl BoundsProvider for Dataset {
    fn dataset_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.bounds
    }
}

/// Earliest and latest order date, ignoring orders without a date.
pub fn date_bounds(orders: &[Order]) -> Option<(NaiveDate, NaiveDate)> {
    orders
        .iter()
        .filter_map(|o| o.order_date)
        .fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
}

/// Read orders from CSV with a header row.
pub fn read_orders<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut orders = Vec::new();
    let mut skipped = 0usize;
    for (idx, row) in rdr.deserialize::<Order>().enumerate() {
        match row {
            Ok(order) => orders.push(order),
            Err(e) => {
                skipped += 1;
                log::warn!("skipping order row {}: {e}", idx + 2);
            }
        }
    }
    let mut ds = Dataset::new(orders);
    ds.skipped = skipped;
    log::info!("loaded {} order(s), skipped {}", ds.len(), ds.skipped);
    Ok(ds)
}

/// Read orders from a CSV file.
pub fn load_orders_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = File::open(path)?;
    read_orders(file)
}

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn sanitize_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{s}"),
        _ => s.to_string(),
    }
}

/// Save an aggregate mapping as CSV, one row per bucket.
pub fn save_aggregates_csv<P: AsRef<Path>>(mapping: &AggregateMapping, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record([
        "country",
        "city",
        "orders",
        "sales",
        "profit",
        "quantity",
        "shipping",
        "discount",
        "avg_discount",
        "max_discount",
    ])?;
    for b in mapping.buckets() {
        let r = b.record;
        wtr.serialize((
            sanitize_cell(b.country),
            b.city.map(sanitize_cell).unwrap_or_default(),
            r.orders,
            r.sales,
            r.profit,
            r.quantity,
            r.shipping,
            r.discount,
            r.average_discount(),
            r.max_discount,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save an aggregate mapping as pretty JSON.
pub fn save_aggregates_json<P: AsRef<Path>>(mapping: &AggregateMapping, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(mapping)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
