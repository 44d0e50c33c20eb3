//! Scale derivation for the two map encodings.
//!
//! - Proportional symbols: square-root scale over `[0, max]`, so circle *area* grows
//!   linearly with the value. Signed metrics are sized by magnitude.
//! - Choropleth: logarithmic scale over `[1, max]` onto a two-color ramp.
//!
//! Both domains are floored at 1 so an empty or all-zero mapping still yields a
//! usable scale.

use crate::aggregate::AggregateMapping;
use crate::config::{CircleRanges, DashboardConfig};
use crate::models::Metric;
use crate::style::{ColorRamp, Rgb8};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Sqrt,
    Log,
}

impl Transform {
    fn apply(self, v: f64) -> f64 {
        match self {
            Transform::Sqrt => v.sqrt(),
            Transform::Log => v.ln(),
        }
    }
}

/// A monotonic map from a domain onto an output range through `transform`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub transform: Transform,
}

impl Scale {
    /// Position of `value` within the domain, 0..1. Out-of-domain input is clamped;
    /// a degenerate domain maps everything to the middle.
    pub fn normalize(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let v = if value.is_nan() { d0 } else { value.clamp(d0, d1) };
        let lo = self.transform.apply(d0);
        let hi = self.transform.apply(d1);
        let span = hi - lo;
        if span == 0.0 || !span.is_finite() {
            return 0.5;
        }
        (self.transform.apply(v) - lo) / span
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        r0 + self.normalize(value) * (r1 - r0)
    }

    /// Apply to `|value|`; the sign never influences the output.
    pub fn apply_magnitude(&self, value: f64) -> f64 {
        self.apply(value.abs())
    }

    pub fn domain_max(&self) -> f64 {
        self.domain.1
    }
}

/// Log scale onto a color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub scale: Scale,
    pub ramp: ColorRamp,
}

impl ColorScale {
    pub fn color(&self, value: f64) -> Rgb8 {
        self.ramp.at(self.scale.normalize(value))
    }
}

/// Largest value `metric` takes across the buckets, by magnitude for signed metrics.
fn max_value<I>(values: I, metric: Metric) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .map(|v| if metric.is_signed() { v.abs() } else { v })
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Radius scale for the proportional symbols of `metric`.
pub fn derive_circle_scale(mapping: &AggregateMapping, metric: Metric, ranges: &CircleRanges) -> Scale {
    let max = max_value(mapping.buckets().map(|b| b.record.value(metric)), metric).max(1.0);
    let r = ranges.for_metric(metric);
    Scale {
        domain: (0.0, max),
        range: (r.min, r.max),
        transform: Transform::Sqrt,
    }
}

/// Fill scale for countries, from the country roll-up of `mapping`.
///
/// With `Metric::Orders` this is the order-count choropleth.
pub fn derive_choropleth_scale(mapping: &AggregateMapping, metric: Metric, ramp: ColorRamp) -> ColorScale {
    let countries = mapping.by_country();
    let max = max_value(countries.values().map(|r| r.value(metric)), metric).max(1.0);
    ColorScale {
        scale: Scale {
            domain: (1.0, max),
            range: (0.0, 1.0),
            transform: Transform::Log,
        },
        ramp,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScaleKey {
    metric: Metric,
    generation: u64,
}

/// Holds the current scales and rebuilds them only when the metric or the
/// aggregate generation changes, so unchanged frames keep identical scales.
#[derive(Debug, Clone, Default)]
pub struct ScaleCache {
    key: Option<ScaleKey>,
    circle: Option<Scale>,
    choropleth: Option<ColorScale>,
    dirty: bool,
}

impl ScaleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild if `(metric, generation)` changed. Returns `true` when rebuilt.
    pub fn refresh(
        &mut self,
        mapping: &AggregateMapping,
        generation: u64,
        metric: Metric,
        config: &DashboardConfig,
    ) -> bool {
        let key = ScaleKey { metric, generation };
        if self.key == Some(key) {
            return false;
        }
        let circle = derive_circle_scale(mapping, metric, &config.circle_ranges);
        let choropleth = derive_choropleth_scale(mapping, Metric::Orders, config.choropleth);
        log::debug!(
            "rebuilt scales for {metric}: circle domain max {}, fill domain max {}",
            circle.domain_max(),
            choropleth.scale.domain_max()
        );
        self.circle = Some(circle);
        self.choropleth = Some(choropleth);
        self.key = Some(key);
        self.dirty = true;
        true
    }

    pub fn circle(&self) -> Option<&Scale> {
        self.circle.as_ref()
    }

    pub fn choropleth(&self) -> Option<&ColorScale> {
        self.choropleth.as_ref()
    }

    /// Whether the scales changed since the consumer last called [`ScaleCache::mark_clean`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_scale_hits_range_endpoints() {
        let s = Scale {
            domain: (0.0, 100.0),
            range: (3.0, 35.0),
            transform: Transform::Sqrt,
        };
        assert_eq!(s.apply(0.0), 3.0);
        assert_eq!(s.apply(100.0), 35.0);
        // sqrt(25)/sqrt(100) = 0.5
        assert!((s.apply(25.0) - 19.0).abs() < 1e-9);
        assert_eq!(s.apply(1000.0), 35.0);
    }

    #[test]
    fn log_scale_is_monotonic() {
        let s = Scale {
            domain: (1.0, 1000.0),
            range: (0.0, 1.0),
            transform: Transform::Log,
        };
        assert_eq!(s.normalize(0.0), 0.0);
        assert!((s.normalize(10.0) - 1.0 / 3.0).abs() < 1e-9);
        assert!(s.normalize(100.0) < s.normalize(101.0));
    }

    #[test]
    fn degenerate_log_domain_maps_to_middle() {
        let s = Scale {
            domain: (1.0, 1.0),
            range: (0.0, 1.0),
            transform: Transform::Log,
        };
        assert_eq!(s.normalize(1.0), 0.5);
    }
}
