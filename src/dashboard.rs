//! Application state: the order list, the user's selections, the animation player
//! and the memoized mapping and scales, with change notifications for a renderer.
//!
//! Everything runs on the caller's thread. A host drives it by calling the setters
//! and, while an animation plays, [`Dashboard::poll`] from its event loop.

use crate::aggregate::{AggregateCache, AggregateMapping};
use crate::animation::{AnimationController, AnimationEvent, AnimationState, Clock, SystemClock};
use crate::config::DashboardConfig;
use crate::models::{ChoroplethMetric, Granularity, Metric, Order, Timeframe, TimeWindow};
use crate::normalize::normalize_country_name;
use crate::profile::{CountryProfile, country_profiles};
use crate::scale::{ColorScale, Scale, ScaleCache};
use crate::storage::{Dataset, date_bounds};
use crate::style::{Rgb8, SymbolColor, SymbolFill};
use crate::tooltip;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// The explicit selector inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub metric: Metric,
    pub granularity: Granularity,
    /// Restricts the symbols to one (normalized) country.
    pub country: Option<String>,
    /// Which breakdown the country tooltip shows.
    pub heatmap: ChoroplethMetric,
}

/// What changed, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Window(TimeWindow),
    Animation(AnimationState),
    Selection(Selection),
    Aggregates { generation: u64 },
    Scales { metric: Metric },
}

/// One proportional symbol, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub country: String,
    pub city: Option<String>,
    pub value: f64,
    pub radius: f64,
    pub color: SymbolColor,
}

/// One country fill, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryFill {
    pub country: String,
    pub value: f64,
    pub color: Rgb8,
}

struct ProfileCache {
    window: TimeWindow,
    revision: u64,
    profiles: BTreeMap<String, CountryProfile>,
}

type Listener = Box<dyn FnMut(&Change)>;

fn notify(listeners: &mut [Listener], change: Change) {
    for listener in listeners.iter_mut() {
        listener(&change);
    }
}

pub struct Dashboard<C: Clock = SystemClock> {
    orders: Vec<Order>,
    revision: u64,
    bounds: Option<(NaiveDate, NaiveDate)>,
    config: DashboardConfig,
    selection: Selection,
    animation: AnimationController<C>,
    aggregates: AggregateCache,
    scales: ScaleCache,
    profiles: Option<ProfileCache>,
    listeners: Vec<Listener>,
}

impl Dashboard<SystemClock> {
    /// Dashboard over a loaded dataset, on the wall clock.
    pub fn from_dataset(dataset: Dataset, config: DashboardConfig) -> Self {
        Self::new(dataset.orders, config, SystemClock::default())
    }
}

impl<C: Clock> Dashboard<C> {
    /// Build the dashboard with an unbounded window and compute the initial
    /// mapping and scales.
    pub fn new(orders: Vec<Order>, config: DashboardConfig, clock: C) -> Self {
        let animation = AnimationController::new(
            clock,
            config.tick_period(),
            config.timeframe,
            TimeWindow::unbounded(),
        );
        let mut dashboard = Self {
            bounds: date_bounds(&orders),
            orders,
            revision: 0,
            config,
            selection: Selection::default(),
            animation,
            aggregates: AggregateCache::new(),
            scales: ScaleCache::new(),
            profiles: None,
            listeners: Vec::new(),
        };
        dashboard.refresh();
        dashboard
    }

    /// Register a change callback. Callbacks run synchronously, in registration order.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Change) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Bumped every time the order list is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn dataset_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.bounds
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn animation(&self) -> &AnimationController<C> {
        &self.animation
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animation.state()
    }

    pub fn window(&self) -> TimeWindow {
        self.animation.window()
    }

    /// Replace the order list. Caches keyed on the old list are invalidated.
    pub fn set_orders(&mut self, orders: Vec<Order>) {
        self.bounds = date_bounds(&orders);
        self.orders = orders;
        self.revision += 1;
        self.profiles = None;
        log::info!("order list replaced ({} orders, revision {})", self.orders.len(), self.revision);
        self.refresh();
    }

    pub fn set_metric(&mut self, metric: Metric) {
        if self.selection.metric == metric {
            return;
        }
        self.selection.metric = metric;
        self.selection_changed();
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        if self.selection.granularity == granularity {
            return;
        }
        self.selection.granularity = granularity;
        self.selection_changed();
    }

    /// Restrict symbols to one country, given by its dataset or boundary name.
    pub fn select_country(&mut self, country: Option<&str>) {
        let country = country.map(normalize_country_name);
        if self.selection.country == country {
            return;
        }
        self.selection.country = country;
        self.selection_changed();
    }

    pub fn set_heatmap_metric(&mut self, metric: ChoroplethMetric) {
        if self.selection.heatmap == metric {
            return;
        }
        self.selection.heatmap = metric;
        self.selection_changed();
    }

    fn selection_changed(&mut self) {
        notify(&mut self.listeners, Change::Selection(self.selection.clone()));
        self.refresh();
    }

    /// Set the window from the date pickers. A playing or paused animation is
    /// stopped first.
    pub fn set_window(&mut self, window: TimeWindow) {
        let before = self.animation.state();
        self.animation.set_window(window);
        if before != AnimationState::Stopped {
            notify(&mut self.listeners, Change::Animation(AnimationState::Stopped));
        }
        notify(&mut self.listeners, Change::Window(window));
        self.refresh();
    }

    /// Applies from the next fresh start.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.animation.set_timeframe(timeframe);
    }

    pub fn set_tick_period(&mut self, period: Duration) {
        self.animation.set_tick_period(period);
    }

    /// Start or resume the animation. Returns the first window, or `None` when
    /// there is nothing to play.
    pub fn play(&mut self) -> Option<TimeWindow> {
        let before = self.animation.state();
        let window = self.animation.start(&self.bounds)?;
        if before != AnimationState::Playing {
            notify(&mut self.listeners, Change::Animation(AnimationState::Playing));
        }
        notify(&mut self.listeners, Change::Window(window));
        self.refresh();
        Some(window)
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.animation.pause();
        if paused {
            notify(&mut self.listeners, Change::Animation(AnimationState::Paused));
        }
        paused
    }

    /// Stop and restore the window captured at play time.
    pub fn stop(&mut self) -> Option<TimeWindow> {
        let restored = self.animation.stop()?;
        notify(&mut self.listeners, Change::Animation(AnimationState::Stopped));
        notify(&mut self.listeners, Change::Window(restored));
        self.refresh();
        Some(restored)
    }

    /// Run the next due animation tick and re-aggregate for its window before
    /// returning.
    pub fn poll_one(&mut self) -> Option<AnimationEvent> {
        let event = self.animation.poll_one()?;
        match event {
            AnimationEvent::Advanced(window) => {
                notify(&mut self.listeners, Change::Window(window));
            }
            AnimationEvent::Finished(window) => {
                notify(&mut self.listeners, Change::Animation(AnimationState::Stopped));
                notify(&mut self.listeners, Change::Window(window));
            }
        }
        self.refresh();
        Some(event)
    }

    /// Run every animation tick due at the current clock time, one at a time. Each
    /// tick re-aggregates before the next one is processed.
    pub fn poll(&mut self) -> Vec<AnimationEvent> {
        std::iter::from_fn(|| self.poll_one()).collect()
    }

    /// Bring the mapping and scales in line with the current inputs. Returns
    /// `true` when anything was rebuilt.
    pub fn refresh(&mut self) -> bool {
        let window = self.animation.window();
        let rebuilt = self
            .aggregates
            .refresh(&self.orders, self.revision, &window, self.selection.granularity);
        if rebuilt {
            notify(
                &mut self.listeners,
                Change::Aggregates {
                    generation: self.aggregates.generation(),
                },
            );
        }
        let Some(mapping) = self.aggregates.mapping() else {
            return rebuilt;
        };
        let metric = self.selection.metric;
        let rescaled = self
            .scales
            .refresh(mapping, self.aggregates.generation(), metric, &self.config);
        if rescaled {
            notify(&mut self.listeners, Change::Scales { metric });
        }
        rebuilt || rescaled
    }

    pub fn mapping(&self) -> Option<&AggregateMapping> {
        self.aggregates.mapping()
    }

    /// Increases every time the mapping is rebuilt.
    pub fn generation(&self) -> u64 {
        self.aggregates.generation()
    }

    pub fn circle_scale(&self) -> Option<&Scale> {
        self.scales.circle()
    }

    pub fn choropleth_scale(&self) -> Option<&ColorScale> {
        self.scales.choropleth()
    }

    /// Whether the scales changed since the last [`Dashboard::mark_rendered`].
    pub fn scales_dirty(&self) -> bool {
        self.scales.is_dirty()
    }

    pub fn mark_rendered(&mut self) {
        self.scales.mark_clean();
    }

    /// Proportional symbols for the current mapping and metric, limited to the
    /// selected country if there is one.
    pub fn symbols(&self) -> Vec<Symbol> {
        let (Some(mapping), Some(scale)) = (self.aggregates.mapping(), self.scales.circle()) else {
            return Vec::new();
        };
        let metric = self.selection.metric;
        let selected = self.selection.country.as_deref();
        mapping
            .buckets()
            .filter(|b| selected.is_none_or(|c| c == b.country))
            .map(|b| {
                let value = b.record.value(metric);
                let color = match SymbolFill::for_value(metric, value) {
                    SymbolFill::Positive => self.config.positive_fill,
                    SymbolFill::Negative => self.config.negative_fill,
                };
                Symbol {
                    country: b.country.to_string(),
                    city: b.city.map(str::to_string),
                    value,
                    radius: scale.apply_magnitude(value),
                    color,
                }
            })
            .collect()
    }

    /// Order-count fill per country.
    pub fn country_fills(&self) -> Vec<CountryFill> {
        let (Some(mapping), Some(scale)) = (self.aggregates.mapping(), self.scales.choropleth()) else {
            return Vec::new();
        };
        mapping
            .by_country()
            .into_iter()
            .map(|(country, record)| {
                let value = record.orders as f64;
                CountryFill {
                    color: scale.color(value),
                    country,
                    value,
                }
            })
            .collect()
    }

    /// Tooltip for a symbol: pass `city` for city buckets, `None` for a country bucket.
    pub fn symbol_tooltip(&self, country: &str, city: Option<&str>) -> String {
        let record = match (self.aggregates.mapping(), city) {
            (Some(m), Some(city)) => m.city(country, city).copied(),
            (Some(m), None) => m.country(country),
            (None, _) => None,
        };
        tooltip::city_tooltip(city.unwrap_or(country), record.as_ref(), self.selection.metric)
    }

    /// Tooltip for a country under the selected heatmap metric. Profiles are built
    /// lazily and reused until the window or the order list changes.
    pub fn country_tooltip(&mut self, country: &str) -> String {
        let window = self.animation.window();
        let fresh = matches!(
            &self.profiles,
            Some(cache) if cache.window == window && cache.revision == self.revision
        );
        if !fresh {
            log::debug!("building country profiles for {window}");
            self.profiles = Some(ProfileCache {
                window,
                revision: self.revision,
                profiles: country_profiles(&self.orders, &window),
            });
        }
        let profile = self.profiles.as_ref().and_then(|cache| cache.profiles.get(country));
        tooltip::country_tooltip(country, profile, self.selection.heatmap)
    }
}
