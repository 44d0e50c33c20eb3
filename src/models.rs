use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date layouts accepted for order dates and window bounds, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Parse a calendar date from the layouts used by order exports and date pickers.
///
/// Returns `None` for empty or unparseable input; callers decide on the fallback.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Timestamps such as "2012-07-31 00:00:00" or "2012-07-31T00:00:00"
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// One retail order line (Global Superstore layout).
///
/// Numeric cells are optional: a blank or malformed cell is `None` and counts as zero
/// wherever the order is aggregated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Order {
    #[serde(rename = "Row ID")]
    pub row_id: String,
    #[serde(rename = "Order ID")]
    pub order_id: String,
    #[serde(rename = "Order Date", deserialize_with = "de_opt_date")]
    pub order_date: Option<NaiveDate>,
    #[serde(rename = "Ship Date", deserialize_with = "de_opt_date")]
    pub ship_date: Option<NaiveDate>,
    #[serde(rename = "Ship Mode")]
    pub ship_mode: String,
    #[serde(rename = "Customer ID")]
    pub customer_id: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Postal Code")]
    pub postal_code: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Market")]
    pub market: String,
    #[serde(rename = "Product ID")]
    pub product_id: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Sales", deserialize_with = "de_opt_f64")]
    pub sales: Option<f64>,
    #[serde(rename = "Quantity", deserialize_with = "de_opt_f64")]
    pub quantity: Option<f64>,
    #[serde(rename = "Discount", deserialize_with = "de_opt_f64")]
    pub discount: Option<f64>,
    #[serde(rename = "Profit", deserialize_with = "de_opt_f64")]
    pub profit: Option<f64>,
    #[serde(rename = "Shipping Cost", deserialize_with = "de_opt_f64")]
    pub shipping_cost: Option<f64>,
    #[serde(rename = "Order Priority")]
    pub order_priority: String,
}

impl Order {
    pub fn sales_or_zero(&self) -> f64 {
        finite_or_zero(self.sales)
    }

    pub fn quantity_or_zero(&self) -> f64 {
        finite_or_zero(self.quantity)
    }

    pub fn discount_or_zero(&self) -> f64 {
        finite_or_zero(self.discount)
    }

    pub fn profit_or_zero(&self) -> f64 {
        finite_or_zero(self.profit)
    }

    pub fn shipping_or_zero(&self) -> f64 {
        finite_or_zero(self.shipping_cost)
    }
}

#[inline]
fn finite_or_zero(v: Option<f64>) -> f64 {
    match v {
        Some(x) if x.is_finite() => x,
        _ => 0.0,
    }
}

/// Serde helper: lenient `Option<f64>` from a number, a numeric string (`"$1,234.50"`),
/// or anything else (which becomes `None` instead of failing the whole row).
fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct OptF64Visitor;

    impl<'de> Visitor<'de> for OptF64Visitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a number, a numeric string, or nothing")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.is_finite().then_some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| *c != '$' && *c != ',')
                .collect();
            Ok(cleaned.parse::<f64>().ok().filter(|v| v.is_finite()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, d: D2) -> Result<Self::Value, D2::Error>
        where
            D2: serde::Deserializer<'de>,
        {
            d.deserialize_any(OptF64Visitor)
        }
    }

    deserializer.deserialize_any(OptF64Visitor)
}

/// Serde helper: lenient `Option<NaiveDate>` via [`parse_date`].
fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

/// Date range used to filter orders. Both bounds are inclusive; an absent bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TimeWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a window from raw date-picker strings. Unparseable bounds become open.
    pub fn parse(start: &str, end: &str) -> Self {
        Self::new(parse_date(start), parse_date(end))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// True when both bounds are present and `start > end`; such a window matches nothing.
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    /// Whether an order dated `date` falls inside the window.
    ///
    /// An order without a usable date only matches a fully open window. This is
    /// deliberately stricter than treating an unknown date as "never out of range":
    /// once either bound is set, undated orders are excluded rather than counted in
    /// every window the animation visits.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if self.is_inverted() {
            return false;
        }
        let Some(d) = date else {
            return self.is_unbounded();
        };
        if let Some(s) = self.start {
            if d < s {
                return false;
            }
        }
        if let Some(e) = self.end {
            if d > e {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |d: Option<NaiveDate>| match d {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => "..".to_string(),
        };
        write!(f, "{} → {}", side(self.start), side(self.end))
    }
}

/// Aggregation key level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Country,
    City,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "country" => Ok(Granularity::Country),
            "city" => Ok(Granularity::City),
            other => Err(format!("unknown granularity: {other} (expected country or city)")),
        }
    }
}

/// Measure driving the proportional-symbol encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Orders,
    Sales,
    Profit,
    Quantity,
    Shipping,
    Discount,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Orders,
        Metric::Sales,
        Metric::Profit,
        Metric::Quantity,
        Metric::Shipping,
        Metric::Discount,
    ];

    /// Metrics whose values can be negative; scales size them by magnitude.
    pub fn is_signed(self) -> bool {
        matches!(self, Metric::Profit)
    }

    /// Selector label shown next to the metric picker.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Orders => "Total Number of Orders",
            Metric::Profit => "Seller's Profit",
            Metric::Sales => "Sales Cost",
            Metric::Quantity => "Quantity Bought",
            Metric::Shipping => "Shipping Cost",
            Metric::Discount => "Discounts",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Orders => "orders",
            Metric::Sales => "sales",
            Metric::Profit => "profit",
            Metric::Quantity => "quantity",
            Metric::Shipping => "shipping",
            Metric::Discount => "discount",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown metric: {s}"))
    }
}

/// Measure driving the country fill (choropleth) encoding and its tooltip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoroplethMetric {
    ShippingMode,
    Segment,
    #[default]
    Orders,
    Category,
    Sales,
    Discounts,
    Profit,
    ShippingCost,
    Priority,
    Quantity,
}

impl ChoroplethMetric {
    pub const ALL: [ChoroplethMetric; 10] = [
        ChoroplethMetric::ShippingMode,
        ChoroplethMetric::Segment,
        ChoroplethMetric::Orders,
        ChoroplethMetric::Category,
        ChoroplethMetric::Sales,
        ChoroplethMetric::Discounts,
        ChoroplethMetric::Profit,
        ChoroplethMetric::ShippingCost,
        ChoroplethMetric::Priority,
        ChoroplethMetric::Quantity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChoroplethMetric::ShippingMode => "Shipping Mode",
            ChoroplethMetric::Segment => "Segment",
            ChoroplethMetric::Orders => "Total Number of Orders",
            ChoroplethMetric::Category => "Order Category",
            ChoroplethMetric::Sales => "Sales",
            ChoroplethMetric::Discounts => "Discounts",
            ChoroplethMetric::Profit => "Seller's Profit",
            ChoroplethMetric::ShippingCost => "Shipping Cost",
            ChoroplethMetric::Priority => "Order Priority",
            ChoroplethMetric::Quantity => "Quantity Bought",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChoroplethMetric::ShippingMode => "shipping_mode",
            ChoroplethMetric::Segment => "segment",
            ChoroplethMetric::Orders => "orders",
            ChoroplethMetric::Category => "category",
            ChoroplethMetric::Sales => "sales",
            ChoroplethMetric::Discounts => "discounts",
            ChoroplethMetric::Profit => "profit",
            ChoroplethMetric::ShippingCost => "shipping_cost",
            ChoroplethMetric::Priority => "priority",
            ChoroplethMetric::Quantity => "quantity",
        }
    }
}

impl FromStr for ChoroplethMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        ChoroplethMetric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown choropleth metric: {s}"))
    }
}

/// Step unit used to advance the animation window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    #[default]
    Week,
    Month,
    /// Fifty equal steps across the window being animated.
    Proportional,
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Timeframe::Day),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "proportional" => Ok(Timeframe::Proportional),
            other => Err(format!(
                "unknown timeframe: {other} (expected day, week, month or proportional)"
            )),
        }
    }
}
