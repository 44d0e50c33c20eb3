//! Windowed aggregation of orders into per-country or per-(country, city) buckets.

use crate::models::{Granularity, Metric, Order, TimeWindow};
use crate::normalize::normalize_country_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running totals for one bucket. Averages are derived on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub orders: u64,
    pub sales: f64,
    pub profit: f64,
    pub quantity: f64,
    pub shipping: f64,
    pub discount: f64,
    pub max_discount: f64,
}

impl AggregateRecord {
    fn add(&mut self, order: &Order) {
        let discount = order.discount_or_zero();
        self.orders += 1;
        self.sales += order.sales_or_zero();
        self.profit += order.profit_or_zero();
        self.quantity += order.quantity_or_zero();
        self.shipping += order.shipping_or_zero();
        self.discount += discount;
        self.max_discount = self.max_discount.max(discount);
    }

    /// Fold another bucket into this one (used when rolling cities up to countries).
    pub fn merge(&mut self, other: &AggregateRecord) {
        self.orders += other.orders;
        self.sales += other.sales;
        self.profit += other.profit;
        self.quantity += other.quantity;
        self.shipping += other.shipping;
        self.discount += other.discount;
        self.max_discount = self.max_discount.max(other.max_discount);
    }

    pub fn average_discount(&self) -> f64 {
        if self.orders == 0 {
            0.0
        } else {
            self.discount / self.orders as f64
        }
    }

    /// Value of `metric` for this bucket. `Discount` reads the average discount.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Orders => self.orders as f64,
            Metric::Sales => self.sales,
            Metric::Profit => self.profit,
            Metric::Quantity => self.quantity,
            Metric::Shipping => self.shipping,
            Metric::Discount => self.average_discount(),
        }
    }
}

pub type CountryBuckets = BTreeMap<String, AggregateRecord>;
pub type CityBuckets = BTreeMap<String, BTreeMap<String, AggregateRecord>>;

/// Output of [`aggregate`]: country keys are normalized boundary names.
///
/// Only buckets with at least one contributing order are present. The maps happen
/// to be ordered, but consumers should look buckets up by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "granularity", content = "buckets", rename_all = "lowercase")]
pub enum AggregateMapping {
    Country(CountryBuckets),
    City(CityBuckets),
}

/// A borrowed view of one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket<'a> {
    pub country: &'a str,
    pub city: Option<&'a str>,
    pub record: &'a AggregateRecord,
}

impl Bucket<'_> {
    /// City name for city buckets, country name otherwise.
    pub fn name(&self) -> &str {
        self.city.unwrap_or(self.country)
    }
}

impl AggregateMapping {
    pub fn empty(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Country => AggregateMapping::Country(BTreeMap::new()),
            Granularity::City => AggregateMapping::City(BTreeMap::new()),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            AggregateMapping::Country(_) => Granularity::Country,
            AggregateMapping::City(_) => Granularity::City,
        }
    }

    /// Number of buckets (cities for city mappings).
    pub fn len(&self) -> usize {
        match self {
            AggregateMapping::Country(m) => m.len(),
            AggregateMapping::City(m) => m.values().map(BTreeMap::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn buckets(&self) -> Box<dyn Iterator<Item = Bucket<'_>> + '_> {
        match self {
            AggregateMapping::Country(m) => Box::new(m.iter().map(|(country, record)| Bucket {
                country: country.as_str(),
                city: None,
                record,
            })),
            AggregateMapping::City(m) => Box::new(m.iter().flat_map(|(country, cities)| {
                cities.iter().map(move |(city, record)| Bucket {
                    country: country.as_str(),
                    city: Some(city.as_str()),
                    record,
                })
            })),
        }
    }

    /// Country totals; city mappings are rolled up.
    pub fn country(&self, country: &str) -> Option<AggregateRecord> {
        match self {
            AggregateMapping::Country(m) => m.get(country).copied(),
            AggregateMapping::City(m) => m.get(country).map(|cities| {
                cities.values().fold(AggregateRecord::default(), |mut acc, r| {
                    acc.merge(r);
                    acc
                })
            }),
        }
    }

    pub fn city(&self, country: &str, city: &str) -> Option<&AggregateRecord> {
        match self {
            AggregateMapping::Country(_) => None,
            AggregateMapping::City(m) => m.get(country).and_then(|cities| cities.get(city)),
        }
    }

    /// Country-level view regardless of granularity.
    pub fn by_country(&self) -> CountryBuckets {
        match self {
            AggregateMapping::Country(m) => m.clone(),
            AggregateMapping::City(m) => m
                .keys()
                .filter_map(|country| self.country(country).map(|r| (country.clone(), r)))
                .collect(),
        }
    }

    pub fn total_orders(&self) -> u64 {
        self.buckets().map(|b| b.record.orders).sum()
    }
}

/// Aggregate the orders that fall inside `window`, bucketed by `granularity`.
///
/// Single pass, no allocation for orders outside the window. An inverted window
/// (`start > end`) yields an empty mapping.
pub fn aggregate(orders: &[Order], window: &TimeWindow, granularity: Granularity) -> AggregateMapping {
    let mut out = AggregateMapping::empty(granularity);
    if window.is_inverted() {
        log::debug!("inverted window {window}; nothing to aggregate");
        return out;
    }

    for order in orders.iter().filter(|o| window.contains(o.order_date)) {
        let country = normalize_country_name(&order.country);
        match &mut out {
            AggregateMapping::Country(m) => m.entry(country).or_default().add(order),
            AggregateMapping::City(m) => m
                .entry(country)
                .or_default()
                .entry(order.city.clone())
                .or_default()
                .add(order),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    window: TimeWindow,
    granularity: Granularity,
    revision: u64,
}

/// Memoizes [`aggregate`] on (window, granularity, order-list revision).
///
/// `generation` increases every time the mapping is rebuilt and doubles as the
/// change signal for scale caches and renderers.
#[derive(Debug, Clone, Default)]
pub struct AggregateCache {
    key: Option<CacheKey>,
    mapping: Option<AggregateMapping>,
    generation: u64,
}

impl AggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the mapping if any input changed. Returns `true` when it was rebuilt.
    ///
    /// `revision` identifies the content of `orders`; bump it whenever the list is replaced.
    pub fn refresh(
        &mut self,
        orders: &[Order],
        revision: u64,
        window: &TimeWindow,
        granularity: Granularity,
    ) -> bool {
        let key = CacheKey {
            window: *window,
            granularity,
            revision,
        };
        if self.key == Some(key) && self.mapping.is_some() {
            return false;
        }
        let mapping = aggregate(orders, window, granularity);
        log::debug!(
            "aggregated {} order(s) into {} bucket(s) for {window}",
            mapping.total_orders(),
            mapping.len()
        );
        self.mapping = Some(mapping);
        self.key = Some(key);
        self.generation += 1;
        true
    }

    pub fn mapping(&self) -> Option<&AggregateMapping> {
        self.mapping.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
