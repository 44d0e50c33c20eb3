//! Color primitives for the map encodings.
//!
//! - Choropleth fills interpolate between two ramp endpoints in RGB space.
//! - Proportional symbols pick a fill from the sign of the value; the scales
//!   themselves only ever see magnitudes.

use crate::error::{Error, Result};
use crate::models::Metric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear RGB interpolation, `t` clamped to 0..1.
    pub fn lerp(self, other: Rgb8, t: f64) -> Rgb8 {
        let t = clamp01(t);
        let mix = |a: u8, b: u8| -> u8 { (a as f64 + (b as f64 - a as f64) * t).round() as u8 };
        Rgb8 {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb8 {
    type Err = Error;

    /// Accepts `#rrggbb`, `rrggbb` and the `#rgb` short form.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || Error::InvalidColor(s.to_string());
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
        if !hex.is_ascii() {
            return Err(bad());
        }
        match hex.len() {
            6 => Ok(Rgb8 {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgb8 {
                    r: short(0)?,
                    g: short(1)?,
                    b: short(2)?,
                })
            }
            _ => Err(bad()),
        }
    }
}

impl Serialize for Rgb8 {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Two-color gradient used for country fills.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    pub low: Rgb8,
    pub high: Rgb8,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self {
            low: Rgb8::new(0xf0, 0xf9, 0xe8),
            high: Rgb8::new(0x08, 0x68, 0xac),
        }
    }
}

impl ColorRamp {
    pub fn at(&self, t: f64) -> Rgb8 {
        self.low.lerp(self.high, t)
    }
}

/// Symbol color with opacity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolColor {
    pub rgb: Rgb8,
    pub alpha: f64,
}

impl SymbolColor {
    pub const fn new(rgb: Rgb8, alpha: f64) -> Self {
        Self { rgb, alpha }
    }

    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.rgb.r,
            self.rgb.g,
            self.rgb.b,
            clamp01(self.alpha)
        )
    }
}

/// Which symbol fill a bucket gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolFill {
    Positive,
    Negative,
}

impl SymbolFill {
    /// Only signed metrics (profit) ever pick the negative fill.
    pub fn for_value(metric: Metric, value: f64) -> Self {
        if metric.is_signed() && value < 0.0 {
            SymbolFill::Negative
        } else {
            SymbolFill::Positive
        }
    }
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing_accepts_long_and_short_forms() {
        assert_eq!("#0868ac".parse::<Rgb8>().unwrap(), Rgb8::new(8, 104, 172));
        assert_eq!("fff".parse::<Rgb8>().unwrap(), Rgb8::new(255, 255, 255));
        assert!("#12345".parse::<Rgb8>().is_err());
        assert!("#gg0000".parse::<Rgb8>().is_err());
    }

    #[test]
    fn ramp_endpoints_and_midpoint() {
        let ramp = ColorRamp {
            low: Rgb8::new(0, 0, 0),
            high: Rgb8::new(200, 100, 50),
        };
        assert_eq!(ramp.at(0.0), ramp.low);
        assert_eq!(ramp.at(1.0), ramp.high);
        assert_eq!(ramp.at(0.5), Rgb8::new(100, 50, 25));
        assert_eq!(ramp.at(7.0), ramp.high);
    }

    #[test]
    fn negative_fill_only_for_signed_metrics() {
        assert_eq!(SymbolFill::for_value(Metric::Profit, -1.0), SymbolFill::Negative);
        assert_eq!(SymbolFill::for_value(Metric::Profit, 0.0), SymbolFill::Positive);
        assert_eq!(SymbolFill::for_value(Metric::Sales, -1.0), SymbolFill::Positive);
    }
}
