//! Plain-text tooltips for map symbols and countries.
//!
//! The first line is always the bucket name; metric lines follow. Markup is left to
//! the rendering layer.

use crate::aggregate::AggregateRecord;
use crate::models::{ChoroplethMetric, Metric};
use crate::profile::{CATEGORIES, CountryProfile, PRIORITIES, RunningStats, SEGMENTS, SHIP_MODES};
use num_format::{Locale, ToFormattedString};
use std::collections::BTreeMap;

/// `$1,234.56`, or `-$1,234.56` for negative amounts.
pub fn format_money(v: f64) -> String {
    let v = if v.is_finite() { v } else { 0.0 };
    let cents = (v.abs() * 100.0).round() as u64;
    let sign = if v < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// Whole number with thousands separators.
pub fn format_count(v: f64) -> String {
    let v = if v.is_finite() { v.round() } else { 0.0 };
    let n = v.abs() as u64;
    if v < 0.0 && n > 0 {
        format!("-{}", n.to_formatted_string(&Locale::en))
    } else {
        n.to_formatted_string(&Locale::en)
    }
}

/// A 0..1 fraction as a percentage with one decimal.
pub fn format_percent(fraction: f64) -> String {
    let f = if fraction.is_finite() { fraction } else { 0.0 };
    format!("{:.1}%", f * 100.0)
}

/// Format a bare metric value the way the legend shows it.
pub fn format_metric_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Discount => format_percent(value),
        Metric::Sales | Metric::Profit | Metric::Shipping => format_money(value),
        Metric::Quantity | Metric::Orders => format_count(value),
    }
}

/// Short legend label for a metric.
pub fn metric_short_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Orders => "Orders",
        Metric::Profit => "Profit",
        Metric::Sales => "Sales",
        Metric::Quantity => "Quantity",
        Metric::Shipping => "Shipping Cost",
        Metric::Discount => "Avg Discount",
    }
}

/// Tooltip for a proportional symbol. A missing record yields just the name.
pub fn city_tooltip(name: &str, record: Option<&AggregateRecord>, metric: Metric) -> String {
    let Some(r) = record else {
        return name.to_string();
    };
    let body = match metric {
        Metric::Profit => format!("Net: {}", format_money(r.profit)),
        Metric::Sales => format!("Total Sales: {}", format_money(r.sales)),
        Metric::Quantity => format!("Quantity: {}", format_count(r.quantity)),
        Metric::Shipping => format!("Shipping Cost: {}", format_money(r.shipping)),
        Metric::Discount => format!(
            "Highest Discount: {}\nAverage Discount: {}",
            format_percent(r.max_discount),
            format_percent(r.average_discount())
        ),
        Metric::Orders => format!("Orders: {}", format_count(r.orders as f64)),
    };
    format!("{name}\n{body}")
}

fn tally_lines(map: &BTreeMap<String, u64>, labels: &[&str]) -> Vec<String> {
    labels
        .iter()
        .map(|l| format!("{l}: {}", CountryProfile::tally(map, l)))
        .collect()
}

fn spread_lines(stats: &RunningStats) -> Vec<String> {
    vec![
        format!("Lowest: {}", format_money(stats.min.unwrap_or(0.0))),
        format!("Average: {}", format_money(stats.mean().unwrap_or(0.0))),
        format!("Highest: {}", format_money(stats.max.unwrap_or(0.0))),
    ]
}

/// Tooltip for a country under a choropleth metric. A missing profile yields just the name.
pub fn country_tooltip(name: &str, profile: Option<&CountryProfile>, metric: ChoroplethMetric) -> String {
    let Some(p) = profile else {
        return name.to_string();
    };
    let lines: Vec<String> = match metric {
        ChoroplethMetric::Orders => vec![format!("Total Orders: {}", format_count(p.orders as f64))],
        ChoroplethMetric::ShippingMode => tally_lines(&p.ship_mode, &SHIP_MODES),
        ChoroplethMetric::Segment => tally_lines(&p.segment, &SEGMENTS),
        ChoroplethMetric::Category => tally_lines(&p.category, &CATEGORIES),
        ChoroplethMetric::Sales => spread_lines(&p.sales),
        ChoroplethMetric::ShippingCost => spread_lines(&p.shipping),
        ChoroplethMetric::Discounts => vec![format!(
            "Average Discount: {}",
            format_percent(p.discount.mean().unwrap_or(0.0))
        )],
        ChoroplethMetric::Profit => {
            let mut lines = vec![format!("Total Profit: {}", format_money(p.profit.sum))];
            lines.extend(spread_lines(&p.profit));
            lines
        }
        ChoroplethMetric::Priority => {
            let total: u64 = PRIORITIES.iter().map(|l| CountryProfile::tally(&p.priority, l)).sum();
            PRIORITIES
                .iter()
                .map(|l| {
                    let n = CountryProfile::tally(&p.priority, l);
                    let share = if total == 0 { 0.0 } else { n as f64 / total as f64 };
                    format!("{l}: {n} ({})", format_percent(share))
                })
                .collect()
        }
        ChoroplethMetric::Quantity => vec![format!("Total Quantity: {}", format_count(p.quantity))],
    };
    format!("{name}\n{}", lines.join("\n"))
}
