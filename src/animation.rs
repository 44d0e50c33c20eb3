//! Time-window player.
//!
//! The controller owns the moving window and at most one repeating timer. It never
//! sleeps: the host calls [`AnimationController::poll`] and the controller reads the
//! injected [`Clock`] to decide how many ticks are due. Dropping the timer (pause,
//! stop, auto-stop) therefore prevents every further tick, including one that was
//! already due but not yet polled.

use crate::models::{Timeframe, TimeWindow};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Target number of steps for a proportional animation.
///
/// Steps are whole days (`ceil(span / 50)`), so the window is crossed in at most
/// 50 ticks; spans that do not divide evenly finish in fewer (365 days: 46 ticks).
pub const PROPORTIONAL_STEPS: u64 = 50;

/// Monotonic time source, relative to an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one handle
/// while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Supplies the earliest and latest order date of the loaded dataset.
pub trait BoundsProvider {
    fn dataset_bounds(&self) -> Option<(NaiveDate, NaiveDate)>;
}

impl BoundsProvider for (NaiveDate, NaiveDate) {
    fn dataset_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some(*self)
    }
}

impl<T: BoundsProvider> BoundsProvider for Option<T> {
    fn dataset_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.as_ref().and_then(BoundsProvider::dataset_bounds)
    }
}

/// Provider for hosts that have no dataset bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBounds;

impl BoundsProvider for NoBounds {
    fn dataset_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// How far one tick moves both window bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Days(u64),
    Months(u32),
}

impl Step {
    /// Resolve `timeframe` against the window it will animate.
    ///
    /// `Proportional` splits `start..=end` into [`PROPORTIONAL_STEPS`] whole-day steps
    /// (rounded up, at least one day).
    pub fn for_timeframe(timeframe: Timeframe, start: NaiveDate, end: NaiveDate) -> Step {
        match timeframe {
            Timeframe::Day => Step::Days(1),
            Timeframe::Week => Step::Days(7),
            Timeframe::Month => Step::Months(1),
            Timeframe::Proportional => {
                let span = (end - start).num_days().max(0) as u64;
                Step::Days(span.div_ceil(PROPORTIONAL_STEPS).max(1))
            }
        }
    }

    /// `date` moved forward by one step; `None` past the representable calendar.
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Step::Days(n) => date.checked_add_days(Days::new(n)),
            Step::Months(n) => date.checked_add_months(Months::new(n)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    period: Duration,
    next_due: Duration,
}

impl Timer {
    fn start(now: Duration, period: Duration) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    /// Consume one due tick, if any.
    fn fire(&mut self, now: Duration) -> bool {
        if now >= self.next_due {
            self.next_due += self.period;
            true
        } else {
            false
        }
    }
}

/// State kept for one play session, from `stopped -> playing` until `-> stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Session {
    original: TimeWindow,
    end_limit: NaiveDate,
    step: Step,
}

/// What a poll produced, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// The window moved one step.
    Advanced(TimeWindow),
    /// The window ran past the original end; the original window is back in place.
    Finished(TimeWindow),
}

#[derive(Debug)]
pub struct AnimationController<C: Clock = SystemClock> {
    clock: C,
    tick_period: Duration,
    timeframe: Timeframe,
    state: AnimationState,
    window: TimeWindow,
    session: Option<Session>,
    timer: Option<Timer>,
}

impl<C: Clock> AnimationController<C> {
    pub fn new(clock: C, tick_period: Duration, timeframe: Timeframe, window: TimeWindow) -> Self {
        Self {
            clock,
            tick_period: tick_period.max(Duration::from_millis(1)),
            timeframe,
            state: AnimationState::Stopped,
            window,
            session: None,
            timer: None,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// The currently published window.
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// The window captured when the current session started, if one is active.
    pub fn original(&self) -> Option<TimeWindow> {
        self.session.map(|s| s.original)
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Whether a timer is live. Never more than one exists.
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Takes effect at the next fresh start; a paused session keeps its step.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
    }

    pub fn set_tick_period(&mut self, period: Duration) {
        self.tick_period = period.max(Duration::from_millis(1));
    }

    /// Replace the window. An active session is stopped first, so the new window
    /// becomes the baseline for the next start.
    pub fn set_window(&mut self, window: TimeWindow) {
        if self.session.is_some() {
            self.stop();
        }
        self.window = window;
    }

    /// Start or resume playing. Returns the first published window, or `None` when
    /// there is nothing to animate (no usable dates, even from `bounds`).
    ///
    /// Any live timer is replaced. The original window is captured only when no
    /// session exists, so resuming after a pause keeps the true original.
    pub fn start(&mut self, bounds: &dyn BoundsProvider) -> Option<TimeWindow> {
        let fallback = bounds.dataset_bounds();
        let start = self.window.start.or(fallback.map(|(s, _)| s));
        let end = self.window.end.or(fallback.map(|(_, e)| e));
        let (Some(start), Some(end)) = (start, end) else {
            log::warn!("animation not started: window {} has no usable dates", self.window);
            return None;
        };

        let session = match self.session {
            Some(session) => session,
            None => {
                if start > end {
                    log::warn!("animation not started: window {} is inverted", self.window);
                    return None;
                }
                Session {
                    original: self.window,
                    end_limit: end,
                    step: Step::for_timeframe(self.timeframe, start, end),
                }
            }
        };
        let Some(first_end) = session.step.advance(start) else {
            log::warn!("animation not started: {start} cannot be advanced");
            return None;
        };

        if self.timer.is_some() {
            log::debug!("replacing live animation timer");
        }
        self.timer = Some(Timer::start(self.clock.now(), self.tick_period));
        self.session = Some(session);
        self.window = TimeWindow::between(start, first_end);
        self.state = AnimationState::Playing;
        log::info!(
            "animation playing from {} (step {:?}, until {})",
            self.window,
            session.step,
            session.end_limit
        );
        Some(self.window)
    }

    /// Cancel the timer and keep the window exactly as last published.
    pub fn pause(&mut self) -> bool {
        if self.state != AnimationState::Playing {
            return false;
        }
        self.timer = None;
        self.state = AnimationState::Paused;
        log::info!("animation paused at {}", self.window);
        true
    }

    /// Cancel the timer and restore the original window. Returns the restored window
    /// when a session was active.
    pub fn stop(&mut self) -> Option<TimeWindow> {
        if self.session.is_none() && self.timer.is_none() {
            self.state = AnimationState::Stopped;
            return None;
        }
        let restored = self.reset();
        log::info!("animation stopped; window restored to {restored}");
        Some(restored)
    }

    /// Process the next due tick, if any. Callers that react to each window should
    /// loop on this rather than [`AnimationController::poll`].
    pub fn poll_one(&mut self) -> Option<AnimationEvent> {
        if self.state != AnimationState::Playing {
            return None;
        }
        let now = self.clock.now();
        if !self.timer.as_mut()?.fire(now) {
            return None;
        }
        Some(self.advance())
    }

    /// Process every tick that is due at the current clock time.
    pub fn poll(&mut self) -> Vec<AnimationEvent> {
        std::iter::from_fn(|| self.poll_one()).collect()
    }

    fn advance(&mut self) -> AnimationEvent {
        let Some(session) = self.session else {
            return AnimationEvent::Finished(self.reset());
        };
        let next_start = self.window.start.and_then(|s| session.step.advance(s));
        let next_end = self.window.end.and_then(|e| session.step.advance(e));
        match (next_start, next_end) {
            (Some(s), Some(e)) if s <= session.end_limit => {
                self.window = TimeWindow::between(s, e);
                log::trace!("animation tick: {}", self.window);
                AnimationEvent::Advanced(self.window)
            }
            _ => {
                let restored = self.reset();
                log::info!("animation finished; window restored to {restored}");
                AnimationEvent::Finished(restored)
            }
        }
    }

    fn reset(&mut self) -> TimeWindow {
        self.timer = None;
        if let Some(session) = self.session.take() {
            self.window = session.original;
        }
        self.state = AnimationState::Stopped;
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_step_rolls_into_next_year() {
        assert_eq!(Step::Months(1).advance(d(2024, 12, 15)), Some(d(2025, 1, 15)));
        assert_eq!(Step::Months(1).advance(d(2024, 1, 31)), Some(d(2024, 2, 29)));
    }

    #[test]
    fn proportional_step_covers_span_in_fifty_steps() {
        let step = Step::for_timeframe(Timeframe::Proportional, d(2024, 1, 1), d(2024, 12, 31));
        // 365 days / 50 rounded up
        assert_eq!(step, Step::Days(8));
        let tiny = Step::for_timeframe(Timeframe::Proportional, d(2024, 1, 1), d(2024, 1, 3));
        assert_eq!(tiny, Step::Days(1));
    }

    #[test]
    fn timer_fires_once_per_period() {
        let mut t = Timer::start(Duration::ZERO, Duration::from_millis(100));
        assert!(!t.fire(Duration::from_millis(99)));
        assert!(t.fire(Duration::from_millis(100)));
        assert!(!t.fire(Duration::from_millis(150)));
        assert!(t.fire(Duration::from_millis(250)));
    }
}
