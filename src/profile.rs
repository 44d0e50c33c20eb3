//! Per-country breakdowns behind the choropleth tooltips: categorical tallies plus
//! lowest / average / highest figures for the monetary fields.

use crate::models::{Order, TimeWindow};
use crate::normalize::normalize_country_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category labels always reported, even at zero, so tooltips have a stable layout.
pub const SHIP_MODES: [&str; 4] = ["Standard Class", "First Class", "Second Class", "Same Day"];
pub const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];
pub const CATEGORIES: [&str; 3] = ["Technology", "Office Supplies", "Furniture"];
pub const PRIORITIES: [&str; 4] = ["Medium", "High", "Low", "Critical"];

/// Count / sum / min / max of one numeric field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RunningStats {
    pub fn push(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Everything the country tooltip needs for one country.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub orders: u64,
    pub quantity: f64,
    pub sales: RunningStats,
    pub profit: RunningStats,
    pub discount: RunningStats,
    pub shipping: RunningStats,
    pub ship_mode: BTreeMap<String, u64>,
    pub segment: BTreeMap<String, u64>,
    pub category: BTreeMap<String, u64>,
    pub priority: BTreeMap<String, u64>,
}

fn seeded(labels: &[&str]) -> BTreeMap<String, u64> {
    labels.iter().map(|l| ((*l).to_string(), 0)).collect()
}

impl CountryProfile {
    fn new() -> Self {
        Self {
            ship_mode: seeded(&SHIP_MODES),
            segment: seeded(&SEGMENTS),
            category: seeded(&CATEGORIES),
            priority: seeded(&PRIORITIES),
            ..Default::default()
        }
    }

    fn add(&mut self, order: &Order) {
        self.orders += 1;
        self.quantity += order.quantity_or_zero();
        self.sales.push(order.sales_or_zero());
        self.profit.push(order.profit_or_zero());
        self.discount.push(order.discount_or_zero());
        self.shipping.push(order.shipping_or_zero());
        bump(&mut self.ship_mode, &order.ship_mode);
        bump(&mut self.segment, &order.segment);
        bump(&mut self.category, &order.category);
        bump(&mut self.priority, &order.order_priority);
    }

    /// Count for `label` within a tally, zero when never seen.
    pub fn tally(map: &BTreeMap<String, u64>, label: &str) -> u64 {
        map.get(label).copied().unwrap_or(0)
    }
}

fn bump(map: &mut BTreeMap<String, u64>, label: &str) {
    if label.is_empty() {
        return;
    }
    *map.entry(label.to_string()).or_default() += 1;
}

/// Build a profile per normalized country for the orders inside `window`.
pub fn country_profiles(orders: &[Order], window: &TimeWindow) -> BTreeMap<String, CountryProfile> {
    let mut out: BTreeMap<String, CountryProfile> = BTreeMap::new();
    if window.is_inverted() {
        return out;
    }
    for order in orders.iter().filter(|o| window.contains(o.order_date)) {
        out.entry(normalize_country_name(&order.country))
            .or_insert_with(CountryProfile::new)
            .add(order);
    }
    out
}
