#![forbid(unsafe_code)]

//! Press-and-hold gesture detection for the floating logo.
//!
//! [`PressHoldDetector`] turns raw press/release edges into a tri-state
//! gesture: `Idle`, `Charging`, `Completed`. A hold only completes after the
//! configured threshold of uninterrupted pressing; any earlier release
//! cancels it without a trace.
//!
//! # Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use altezza_core::press_hold::{PressEvent, PressHoldDetector, PressState};
//! use altezza_core::timer::Timed;
//!
//! let t0 = Instant::now();
//! let mut logo = PressHoldDetector::default();
//! logo.press_start(t0);
//! logo.advance(t0 + Duration::from_millis(2000));
//! assert_eq!(logo.state(), PressState::Completed);
//! assert!(logo.drain_events().contains(&PressEvent::Completed));
//! ```
//!
//! # Invariants
//!
//! 1. `Completed` is emitted iff a `press_start` was followed by at least the
//!    hold threshold with no intervening `press_end`.
//! 2. At most one hold timer is pending at any time.
//! 3. `press_start` while `Charging` is a no-op (touch and mouse edges often
//!    arrive together).
//! 4. `Completed` is emitted at most once per hold.
//!
//! # Failure Modes
//!
//! - A `press_end` without a prior start is ignored.
//! - Releasing during the feedback window returns to `Idle` at once and drops
//!   the pending feedback timer.

use std::time::{Duration, Instant};

use crate::timer::{Timed, TimerHandle, TimerRegistry};

/// Default hold threshold.
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(2000);

/// Default success feedback window after a completed hold.
pub const FEEDBACK_WINDOW: Duration = Duration::from_millis(300);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing for the hold gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressHoldConfig {
    /// Continuous press needed to complete the gesture.
    /// Default: 2000 ms
    pub hold: Duration,

    /// How long `Completed` is shown before returning to `Idle`.
    /// Default: 300 ms
    pub feedback: Duration,
}

impl Default for PressHoldConfig {
    fn default() -> Self {
        Self {
            hold: HOLD_THRESHOLD,
            feedback: FEEDBACK_WINDOW,
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Gesture state of one pressable widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PressState {
    /// Not pressed.
    #[default]
    Idle,
    /// Pressed, waiting for the hold threshold.
    Charging,
    /// Threshold reached; showing success feedback.
    Completed,
}

/// Events queued by the detector. Drain with
/// [`drain_events`](PressHoldDetector::drain_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressEvent {
    /// A new hold began.
    ChargeStarted,
    /// The press ended before the threshold; nothing was triggered.
    Released {
        /// How long the press lasted.
        held: Duration,
    },
    /// The hold threshold was reached. This is the completion callback.
    Completed,
    /// The feedback window ended.
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressTimer {
    Hold,
    Feedback,
}

// ---------------------------------------------------------------------------
// PressHoldDetector
// ---------------------------------------------------------------------------

/// Long-press detector with a single hold timer.
#[derive(Debug, Clone)]
pub struct PressHoldDetector {
    config: PressHoldConfig,
    state: PressState,
    charge_started: Option<Instant>,
    timers: TimerRegistry<PressTimer>,
    hold_timer: Option<TimerHandle>,
    feedback_timer: Option<TimerHandle>,
    events: Vec<PressEvent>,
    completions: u64,
}

impl Default for PressHoldDetector {
    fn default() -> Self {
        Self::new(PressHoldConfig::default())
    }
}

impl PressHoldDetector {
    /// Create a detector with the given timing.
    #[must_use]
    pub fn new(config: PressHoldConfig) -> Self {
        Self {
            config,
            state: PressState::Idle,
            charge_started: None,
            timers: TimerRegistry::new(),
            hold_timer: None,
            feedback_timer: None,
            events: Vec::new(),
            completions: 0,
        }
    }

    /// Begin a hold.
    ///
    /// Returns `false` (and does nothing) when already charging.
    pub fn press_start(&mut self, now: Instant) -> bool {
        if self.state == PressState::Charging {
            return false;
        }
        self.cancel_timers();

        self.state = PressState::Charging;
        self.charge_started = Some(now);
        self.hold_timer = Some(self.timers.schedule(now, self.config.hold, PressTimer::Hold));
        self.events.push(PressEvent::ChargeStarted);
        crate::debug!("logo hold charging");
        true
    }

    /// End a hold: release, touch end, or pointer leaving the widget.
    ///
    /// Returns `true` if a charging hold was cancelled early.
    pub fn press_end(&mut self, now: Instant) -> bool {
        match self.state {
            PressState::Idle => false,
            PressState::Charging => {
                self.cancel_timers();
                let held = self
                    .charge_started
                    .take()
                    .map_or(Duration::ZERO, |start| now.saturating_duration_since(start));
                self.state = PressState::Idle;
                self.events.push(PressEvent::Released { held });
                crate::debug!(held_ms = held.as_millis() as u64, "logo hold released early");
                true
            }
            PressState::Completed => {
                self.cancel_timers();
                self.state = PressState::Idle;
                self.events.push(PressEvent::Settled);
                false
            }
        }
    }

    /// Current gesture state.
    #[must_use]
    pub fn state(&self) -> PressState {
        self.state
    }

    /// Whether a hold is in progress.
    #[must_use]
    pub fn is_charging(&self) -> bool {
        self.state == PressState::Charging
    }

    /// Fraction of the hold threshold reached, in [0.0, 1.0].
    ///
    /// `Completed` reports 1.0 and `Idle` reports 0.0.
    #[must_use]
    pub fn charge_progress(&self, now: Instant) -> f32 {
        match (self.state, self.charge_started) {
            (PressState::Completed, _) => 1.0,
            (PressState::Charging, Some(start)) => {
                let held = now.saturating_duration_since(start).as_secs_f64();
                let t = held / self.config.hold.as_secs_f64().max(f64::EPSILON);
                (t as f32).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Number of completed holds so far.
    #[must_use]
    pub fn completions(&self) -> u64 {
        self.completions
    }

    /// Number of timers currently armed (0 or 1).
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Drain all pending events. Clears the event queue.
    pub fn drain_events(&mut self) -> Vec<PressEvent> {
        std::mem::take(&mut self.events)
    }

    /// Timing configuration.
    #[must_use]
    pub fn config(&self) -> &PressHoldConfig {
        &self.config
    }

    fn cancel_timers(&mut self) {
        self.timers.cancel_many(self.hold_timer.take());
        self.timers.cancel_many(self.feedback_timer.take());
    }

    fn on_timer(&mut self, handle: TimerHandle, timer: PressTimer, now: Instant) {
        match timer {
            PressTimer::Hold => {
                if self.hold_timer != Some(handle) || self.state != PressState::Charging {
                    return;
                }
                self.hold_timer = None;
                self.charge_started = None;
                self.state = PressState::Completed;
                self.completions += 1;
                self.events.push(PressEvent::Completed);
                self.feedback_timer =
                    Some(self.timers.schedule(now, self.config.feedback, PressTimer::Feedback));
                crate::info!(completions = self.completions, "logo hold completed");
            }
            PressTimer::Feedback => {
                if self.feedback_timer != Some(handle) {
                    return;
                }
                self.feedback_timer = None;
                self.state = PressState::Idle;
                self.events.push(PressEvent::Settled);
            }
        }
    }
}

impl Timed for PressHoldDetector {
    fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn advance(&mut self, now: Instant) {
        while let Some((handle, timer)) = self.timers.poll_due(now) {
            self.on_timer(handle, timer, now);
        }
    }

    fn teardown(&mut self) {
        self.cancel_timers();
        self.timers.cancel_all();
        self.state = PressState::Idle;
        self.charge_started = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn completed(events: &[PressEvent]) -> usize {
        events.iter().filter(|e| **e == PressEvent::Completed).count()
    }

    #[test]
    fn initial_state_is_idle() {
        let logo = PressHoldDetector::default();
        assert_eq!(logo.state(), PressState::Idle);
        assert!(logo.next_deadline().is_none());
    }

    #[test]
    fn hold_for_threshold_completes() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        assert!(logo.press_start(t0));
        assert_eq!(logo.next_deadline(), Some(t0 + ms(2000)));

        logo.advance(t0 + ms(2000));
        assert_eq!(logo.state(), PressState::Completed);
        assert_eq!(
            logo.drain_events(),
            vec![PressEvent::ChargeStarted, PressEvent::Completed]
        );
        assert_eq!(logo.completions(), 1);
    }

    #[test]
    fn release_at_1999_never_completes() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        logo.press_start(t0);
        logo.advance(t0 + ms(1999));
        assert!(logo.press_end(t0 + ms(1999)));

        logo.advance(t0 + ms(10_000));
        let events = logo.drain_events();
        assert_eq!(completed(&events), 0);
        assert!(events.contains(&PressEvent::Released { held: ms(1999) }));
        assert_eq!(logo.state(), PressState::Idle);
        assert_eq!(logo.pending_timers(), 0);
    }

    #[test]
    fn feedback_window_returns_to_idle() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        logo.press_start(t0);
        logo.advance(t0 + ms(2000));
        logo.advance(t0 + ms(2299));
        assert_eq!(logo.state(), PressState::Completed);
        logo.advance(t0 + ms(2300));
        assert_eq!(logo.state(), PressState::Idle);
        assert_eq!(logo.drain_events().last(), Some(&PressEvent::Settled));
    }

    #[test]
    fn duplicate_start_is_noop() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        assert!(logo.press_start(t0));
        assert!(!logo.press_start(t0 + ms(500)));
        assert_eq!(logo.pending_timers(), 1);

        // The first start instant still governs completion.
        logo.advance(t0 + ms(2000));
        assert_eq!(logo.state(), PressState::Completed);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        assert!(!logo.press_end(t0));
        assert!(logo.drain_events().is_empty());
    }

    #[test]
    fn release_during_feedback_settles_immediately() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        logo.press_start(t0);
        logo.advance(t0 + ms(2000));
        assert!(!logo.press_end(t0 + ms(2100)));
        assert_eq!(logo.state(), PressState::Idle);
        assert_eq!(logo.pending_timers(), 0);
    }

    #[test]
    fn press_during_feedback_restarts_charge() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        logo.press_start(t0);
        logo.advance(t0 + ms(2000));
        logo.press_end(t0 + ms(2050));
        assert!(logo.press_start(t0 + ms(2100)));
        assert_eq!(logo.pending_timers(), 1);
        logo.advance(t0 + ms(4100));
        assert_eq!(logo.completions(), 2);
    }

    #[test]
    fn charge_progress_tracks_hold() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        assert_eq!(logo.charge_progress(t0), 0.0);
        logo.press_start(t0);
        assert!((logo.charge_progress(t0 + ms(1000)) - 0.5).abs() < 0.01);
        logo.advance(t0 + ms(2000));
        assert_eq!(logo.charge_progress(t0 + ms(2000)), 1.0);
    }

    #[test]
    fn teardown_cancels_everything() {
        let t0 = Instant::now();
        let mut logo = PressHoldDetector::default();
        logo.press_start(t0);
        logo.teardown();
        logo.advance(t0 + ms(5000));
        assert_eq!(logo.completions(), 0);
        assert!(logo.next_deadline().is_none());
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Start(u64),
        End(u64),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0u64..3000).prop_map(Step::Start),
            (0u64..3000).prop_map(Step::End),
        ]
    }

    proptest! {
        /// Completion fires iff some start was followed by the full threshold
        /// with no intervening end.
        #[test]
        fn completion_iff_uninterrupted_hold(steps in proptest::collection::vec(step(), 0..24)) {
            let t0 = Instant::now();
            let mut logo = PressHoldDetector::default();
            let mut now = t0;
            let mut model_start: Option<Instant> = None;
            let mut expected = 0u64;

            for s in steps {
                let (gap, is_start) = match s {
                    Step::Start(g) => (g, true),
                    Step::End(g) => (g, false),
                };
                let next = now + ms(gap);
                if let Some(start) = model_start
                    && next >= start + HOLD_THRESHOLD
                {
                    expected += 1;
                    model_start = None;
                }
                logo.advance(next);
                now = next;
                if is_start {
                    if logo.press_start(now) {
                        model_start = Some(now);
                    }
                } else {
                    logo.press_end(now);
                    model_start = None;
                }
                prop_assert!(logo.pending_timers() <= 1);
            }
            let end = now + ms(10_000);
            if model_start.is_some() {
                expected += 1;
            }
            logo.advance(end);
            prop_assert_eq!(logo.completions(), expected);
        }
    }
}
