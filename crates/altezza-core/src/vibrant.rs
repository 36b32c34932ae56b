#![forbid(unsafe_code)]

//! Vibrant mode: a temporary alternate theme that reverts on its own.
//!
//! [`VibrantController`] is the single owner of the process-wide
//! [`VisualMode`]. Renderers only see it through [`ModeSource`]. Two input
//! paths call [`activate`](VibrantController::activate): the keyboard chord
//! (see [`is_vibrant_chord`]) and a completed long-press on the logo. Both
//! are idempotent: activating while already vibrant restarts the window.
//!
//! # Invariants
//!
//! 1. At most one revert timer is pending at any time.
//! 2. `activate` cancels the previous revert timer before arming a new one.
//! 3. After N activations, exactly one revert fires, `duration` after the
//!    last activation.

use std::time::{Duration, Instant};

use crate::event::{KeyCode, KeyEvent};
use crate::timer::{Timed, TimerHandle, TimerRegistry};

/// Default time vibrant mode stays on after the last activation.
pub const VIBRANT_DURATION: Duration = Duration::from_millis(10_000);

/// Configuration for the vibrant-mode controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibrantConfig {
    /// Time until the mode reverts to default.
    /// Default: 10 s
    pub duration: Duration,
}

impl Default for VibrantConfig {
    fn default() -> Self {
        Self {
            duration: VIBRANT_DURATION,
        }
    }
}

/// Visual theme of the whole splash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualMode {
    /// Warm orange ambient theme.
    #[default]
    Default,
    /// Cyan/fuchsia grid theme.
    Vibrant,
}

impl VisualMode {
    /// Whether this is the vibrant theme.
    #[must_use]
    pub const fn is_vibrant(self) -> bool {
        matches!(self, Self::Vibrant)
    }
}

/// Read-only view of the current visual mode.
pub trait ModeSource {
    /// Mode to render with right now.
    fn mode(&self) -> VisualMode;
}

/// Mode transitions. Drain with
/// [`drain_events`](VibrantController::drain_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    /// Vibrant mode was switched on, or its window restarted.
    Activated {
        /// `true` when the mode was already vibrant.
        restarted: bool,
    },
    /// The revert timer fired; the mode is default again.
    Reverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Revert;

/// Owner of the visual mode and its single revert timer.
#[derive(Debug, Clone)]
pub struct VibrantController {
    config: VibrantConfig,
    mode: VisualMode,
    timers: TimerRegistry<Revert>,
    revert: Option<TimerHandle>,
    events: Vec<ModeEvent>,
    activations: u64,
    reverts: u64,
}

impl Default for VibrantController {
    fn default() -> Self {
        Self::new(VibrantConfig::default())
    }
}

impl VibrantController {
    /// Create a controller in [`VisualMode::Default`].
    #[must_use]
    pub fn new(config: VibrantConfig) -> Self {
        Self {
            config,
            mode: VisualMode::Default,
            timers: TimerRegistry::new(),
            revert: None,
            events: Vec::new(),
            activations: 0,
            reverts: 0,
        }
    }

    /// Switch to vibrant now and (re)arm the revert timer.
    pub fn activate(&mut self, now: Instant) {
        let restarted = self.mode.is_vibrant();
        if let Some(previous) = self.revert.take() {
            self.timers.cancel(previous);
        }
        self.mode = VisualMode::Vibrant;
        self.revert = Some(self.timers.schedule(now, self.config.duration, Revert));
        self.activations += 1;
        self.events.push(ModeEvent::Activated { restarted });
        crate::info!(restarted, activations = self.activations, "vibrant mode on");
    }

    /// When the pending revert will fire.
    #[must_use]
    pub fn revert_deadline(&self) -> Option<Instant> {
        self.revert.and_then(|h| self.timers.deadline_of(h))
    }

    /// Total `activate` calls.
    #[must_use]
    pub fn activations(&self) -> u64 {
        self.activations
    }

    /// Total reverts that actually fired.
    #[must_use]
    pub fn reverts(&self) -> u64 {
        self.reverts
    }

    /// Number of pending revert timers (0 or 1).
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Drain all pending events. Clears the event queue.
    pub fn drain_events(&mut self) -> Vec<ModeEvent> {
        std::mem::take(&mut self.events)
    }

    fn deactivate(&mut self) {
        self.revert = None;
        self.mode = VisualMode::Default;
        self.reverts += 1;
        self.events.push(ModeEvent::Reverted);
        crate::info!("vibrant mode reverted");
    }
}

impl ModeSource for VibrantController {
    fn mode(&self) -> VisualMode {
        self.mode
    }
}

impl Timed for VibrantController {
    fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn advance(&mut self, now: Instant) {
        while let Some((handle, Revert)) = self.timers.poll_due(now) {
            if self.revert == Some(handle) {
                self.deactivate();
            }
        }
    }

    fn teardown(&mut self) {
        self.timers.cancel_all();
        self.revert = None;
    }
}

/// Ctrl + Shift + R (either case).
///
/// Terminals frequently drop the SHIFT flag for letters and report an
/// uppercase char instead, so Ctrl + `R` counts as shifted.
#[must_use]
pub fn is_vibrant_chord(key: &KeyEvent) -> bool {
    if !key.is_press() || !key.ctrl() {
        return false;
    }
    match key.code {
        KeyCode::Char('R') => true,
        KeyCode::Char('r') => key.shift(),
        _ => false,
    }
}
