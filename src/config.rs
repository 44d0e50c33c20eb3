//! Dashboard configuration, loaded from JSON. Every field has a default, so an empty
//! object (or no file at all) yields the stock dashboard.

use crate::error::{Error, Result};
use crate::models::{Metric, Timeframe};
use crate::style::{ColorRamp, Rgb8, SymbolColor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default delay between animation ticks.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 100;

/// Output radius range (pixels) of one proportional-symbol metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusRange {
    pub min: f64,
    pub max: f64,
}

impl RadiusRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Radius ranges per metric, wider for the metrics with larger spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleRanges {
    pub orders: RadiusRange,
    pub sales: RadiusRange,
    pub profit: RadiusRange,
    pub quantity: RadiusRange,
    pub shipping: RadiusRange,
    pub discount: RadiusRange,
}

impl Default for CircleRanges {
    fn default() -> Self {
        Self {
            orders: RadiusRange::new(3.0, 35.0),
            sales: RadiusRange::new(3.0, 30.0),
            profit: RadiusRange::new(3.0, 28.0),
            quantity: RadiusRange::new(3.0, 30.0),
            shipping: RadiusRange::new(3.0, 25.0),
            discount: RadiusRange::new(3.0, 22.0),
        }
    }
}

impl CircleRanges {
    pub fn for_metric(&self, metric: Metric) -> RadiusRange {
        match metric {
            Metric::Orders => self.orders,
            Metric::Sales => self.sales,
            Metric::Profit => self.profit,
            Metric::Quantity => self.quantity,
            Metric::Shipping => self.shipping,
            Metric::Discount => self.discount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub tick_period_ms: u64,
    pub timeframe: Timeframe,
    pub circle_ranges: CircleRanges,
    pub choropleth: ColorRamp,
    pub positive_fill: SymbolColor,
    pub negative_fill: SymbolColor,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            timeframe: Timeframe::default(),
            circle_ranges: CircleRanges::default(),
            choropleth: ColorRamp::default(),
            positive_fill: SymbolColor::new(Rgb8::new(255, 100, 0), 0.6),
            negative_fill: SymbolColor::new(Rgb8::new(255, 0, 0), 0.6),
        }
    }
}

impl DashboardConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Reject settings that would stall the player or invert a scale.
    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(Error::InvalidConfig("tick_period_ms must be greater than 0".into()));
        }
        for metric in Metric::ALL {
            let r = self.circle_ranges.for_metric(metric);
            if !(r.min.is_finite() && r.max.is_finite()) || r.min < 0.0 || r.min > r.max {
                return Err(Error::InvalidConfig(format!(
                    "circle range for {metric} must satisfy 0 <= min <= max (got {}..{})",
                    r.min, r.max
                )));
            }
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: DashboardConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = DashboardConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.tick_period(), Duration::from_millis(100));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = DashboardConfig::from_json_str(
            r##"{"timeframe":"day","circle_ranges":{"sales":{"min":1,"max":50}},"choropleth":{"low":"#ffffff","high":"#000000"}}"##,
        )
        .unwrap();
        assert_eq!(cfg.timeframe, Timeframe::Day);
        assert_eq!(cfg.circle_ranges.sales, RadiusRange::new(1.0, 50.0));
        assert_eq!(cfg.circle_ranges.orders, RadiusRange::new(3.0, 35.0));
        assert_eq!(cfg.choropleth.high, Rgb8::new(0, 0, 0));
    }

    #[test]
    fn zero_tick_period_is_rejected() {
        let err = DashboardConfig::from_json_str(r#"{"tick_period_ms":0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn bad_color_is_a_json_error() {
        assert!(DashboardConfig::from_json_str(r##"{"choropleth":{"low":"blue","high":"#000"}}"##).is_err());
    }
}
