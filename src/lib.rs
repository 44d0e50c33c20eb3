//! order_atlas
//!
//! The data core of a geographic retail-order dashboard: aggregate orders per
//! country or city over a date window, derive the circle and fill scales, animate
//! the window through time, and format tooltips. Pairs with the `order-atlas` CLI.
//!
//! ### Features
//! - Load Global Superstore style order exports from CSV
//! - Windowed aggregation (orders, sales, profit, quantity, shipping, discount)
//! - Square-root circle scales and logarithmic choropleth scales
//! - A clock-driven animation player with pause, resume and stop
//! - Plain-text tooltips and SVG/PNG symbol sheets
//!
//! ### Example
//! ```no_run
//! use order_atlas::{Dashboard, DashboardConfig, Metric, TimeWindow};
//!
//! let dataset = order_atlas::storage::load_orders_csv("superstore.csv")?;
//! let mut dash = Dashboard::from_dataset(dataset, DashboardConfig::default());
//! dash.set_metric(Metric::Profit);
//! dash.set_window(TimeWindow::parse("2014-01-01", "2014-12-31"));
//! for symbol in dash.symbols() {
//!     println!("{} {:?} r={:.1}", symbol.country, symbol.city, symbol.radius);
//! }
//! order_atlas::render::render_symbol_sheet(&dash.symbols(), &dash.country_fills(), "sheet.svg", 1000, 600)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod animation;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod normalize;
pub mod profile;
pub mod render;
pub mod scale;
pub mod storage;
pub mod style;
pub mod tooltip;

pub use aggregate::{AggregateMapping, AggregateRecord, aggregate};
pub use animation::{AnimationController, AnimationState, Clock, ManualClock, SystemClock};
pub use config::DashboardConfig;
pub use dashboard::{Change, Dashboard, Selection};
pub use error::{Error, Result};
pub use models::{ChoroplethMetric, Granularity, Metric, Order, Timeframe, TimeWindow};
pub use normalize::normalize_country_name;
