//! Symbol sheets: a quick look at the current encodings without a map.
//!
//! The top band shows one swatch per country in its choropleth fill (largest first);
//! below it, one circle per bucket at its proportional-symbol radius and fill.
//! Output is SVG or PNG depending on the file extension. No text is drawn, so no
//! fonts are needed.

use crate::dashboard::{CountryFill, Symbol};
use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;

const MARGIN: i32 = 10;
const MAX_SWATCHES: usize = 60;

/// Render `symbols` and `fills` to `out_path` (`.svg`, otherwise PNG).
pub fn render_symbol_sheet<P: AsRef<Path>>(
    symbols: &[Symbol],
    fills: &[CountryFill],
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    if symbols.is_empty() && fills.is_empty() {
        return Err(anyhow!("nothing to render"));
    }
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_sheet(root, symbols, fills)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_sheet(root, symbols, fills)?;
    }
    log::info!("wrote symbol sheet to {}", out_path.display());
    Ok(())
}

/// Draws to any Plotters backend.
fn draw_sheet<DB>(root: DrawingArea<DB, Shift>, symbols: &[Symbol], fills: &[CountryFill]) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = root.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);

    let band = if fills.is_empty() { 0 } else { (h / 6).max(12) };
    if !fills.is_empty() {
        let mut sorted: Vec<&CountryFill> = fills.iter().collect();
        sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
        sorted.truncate(MAX_SWATCHES);
        let n = sorted.len() as i32;
        let swatch_w = ((w - 2 * MARGIN) / n).max(1);
        for (i, fill) in sorted.iter().enumerate() {
            let x0 = MARGIN + i as i32 * swatch_w;
            let c = fill.color;
            root.draw(&Rectangle::new(
                [(x0, MARGIN), (x0 + swatch_w - 1, MARGIN + band)],
                RGBColor(c.r, c.g, c.b).filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    if symbols.is_empty() {
        root.present().map_err(|e| anyhow!("{:?}", e))?;
        return Ok(());
    }

    let max_r = symbols
        .iter()
        .map(|s| s.radius)
        .fold(1.0_f64, f64::max)
        .ceil() as i32;
    let cell = 2 * max_r + 4;
    let top = MARGIN + band + MARGIN;
    let cols = ((w - 2 * MARGIN) / cell).max(1);
    let rows = ((h - top - MARGIN) / cell).max(1);
    let capacity = (cols * rows) as usize;
    if symbols.len() > capacity {
        log::warn!("symbol sheet fits {capacity} of {} symbols", symbols.len());
    }

    let mut sorted: Vec<&Symbol> = symbols.iter().collect();
    sorted.sort_by(|a, b| b.radius.total_cmp(&a.radius));
    for (i, s) in sorted.into_iter().take(capacity).enumerate() {
        let i = i as i32;
        let cx = MARGIN + (i % cols) * cell + cell / 2;
        let cy = top + (i / cols) * cell + cell / 2;
        let c = s.color;
        root.draw(&Circle::new(
            (cx, cy),
            s.radius.round().max(1.0) as i32,
            RGBAColor(c.rgb.r, c.rgb.g, c.rgb.b, c.alpha).filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        root.draw(&Circle::new(
            (cx, cy),
            s.radius.round().max(1.0) as i32,
            ShapeStyle {
                color: WHITE.to_rgba(),
                filled: false,
                stroke_width: 1,
            },
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
