#![forbid(unsafe_code)]

//! Ambient background: light field, pointer spotlight, and mode tracking.
//!
//! The background never decides the visual mode. It is told the current
//! [`VisualMode`] through [`sync_mode`](AmbientBackground::sync_mode) (any
//! [`ModeSource`] will do) and reacts: while vibrant, the grid light field is
//! regenerated on a fixed interval; in default mode the interval is cancelled.
//!
//! # Invariants
//!
//! 1. The shuffle interval is pending iff the last synced mode is vibrant.
//! 2. Every light position is a percentage in `0..100`.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::timer::{Timed, TimerHandle, TimerRegistry};
use crate::vibrant::{ModeSource, VisualMode};

/// Configuration for [`AmbientBackground`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundConfig {
    /// Number of grid lights.
    /// Default: 12
    pub lights: usize,

    /// Light field regeneration period while vibrant.
    /// Default: 3000 ms
    pub shuffle_every: Duration,

    /// RNG seed. `None` seeds from the OS.
    /// Default: None
    pub seed: Option<u64>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            lights: 12,
            shuffle_every: Duration::from_millis(3000),
            seed: None,
        }
    }
}

/// One pulsing light on the vibrant grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLight {
    /// Index within the field.
    pub id: usize,
    /// Horizontal position, percent of the width.
    pub left_pct: u8,
    /// Vertical position, percent of the height.
    pub top_pct: u8,
    /// Pause between pulses.
    pub delay: Duration,
    /// Length of one pulse.
    pub duration: Duration,
}

impl GridLight {
    /// Brightness in `[0.0, 0.8]` at `elapsed` since the field was generated.
    ///
    /// Each cycle is one pulse (ramp up then down) followed by `delay` dark.
    #[must_use]
    pub fn intensity(&self, elapsed: Duration) -> f32 {
        let pulse = self.duration.as_secs_f32();
        let cycle = pulse + self.delay.as_secs_f32();
        if pulse <= 0.0 || cycle <= 0.0 {
            return 0.0;
        }
        let t = elapsed.as_secs_f32() % cycle;
        if t >= pulse {
            return 0.0;
        }
        let phase = t / pulse;
        0.8 * (1.0 - (2.0 * phase - 1.0).abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shuffle;

/// Background state shared by every frame.
#[derive(Debug, Clone)]
pub struct AmbientBackground {
    config: BackgroundConfig,
    rng: StdRng,
    lights: Vec<GridLight>,
    generated_at: Instant,
    mode: VisualMode,
    pointer: Option<(u16, u16)>,
    timers: TimerRegistry<Shuffle>,
    shuffle: Option<TimerHandle>,
    shuffles: u64,
}

impl AmbientBackground {
    /// Create the background with a freshly generated light field.
    #[must_use]
    pub fn new(now: Instant, config: BackgroundConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let lights = generate_lights(&mut rng, config.lights);
        Self {
            config,
            rng,
            lights,
            generated_at: now,
            mode: VisualMode::Default,
            pointer: None,
            timers: TimerRegistry::new(),
            shuffle: None,
            shuffles: 0,
        }
    }

    /// Follow the mode published by `source`.
    pub fn sync(&mut self, source: &impl ModeSource, now: Instant) {
        self.sync_mode(source.mode(), now);
    }

    /// Start or stop the shuffle interval to match `mode`.
    pub fn sync_mode(&mut self, mode: VisualMode, now: Instant) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        match mode {
            VisualMode::Vibrant => {
                self.shuffle = Some(self.timers.schedule_every(now, self.config.shuffle_every, Shuffle));
                crate::debug!("light shuffle started");
            }
            VisualMode::Default => {
                if let Some(handle) = self.shuffle.take() {
                    self.timers.cancel(handle);
                    crate::debug!(shuffles = self.shuffles, "light shuffle stopped");
                }
            }
        }
    }

    /// Record the last pointer cell for the spotlight.
    pub fn set_pointer(&mut self, x: u16, y: u16) {
        self.pointer = Some((x, y));
    }

    /// Last known pointer cell.
    #[must_use]
    pub fn pointer(&self) -> Option<(u16, u16)> {
        self.pointer
    }

    /// Mode the background is currently drawn in.
    #[must_use]
    pub fn mode(&self) -> VisualMode {
        self.mode
    }

    /// Whether the grid overlay is drawn.
    #[must_use]
    pub fn grid_visible(&self) -> bool {
        self.mode.is_vibrant()
    }

    /// Current light field.
    #[must_use]
    pub fn lights(&self) -> &[GridLight] {
        &self.lights
    }

    /// Time since the current light field was generated.
    #[must_use]
    pub fn field_age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.generated_at)
    }

    /// Number of light field regenerations so far.
    #[must_use]
    pub fn shuffles(&self) -> u64 {
        self.shuffles
    }

    /// Whether the shuffle interval is armed.
    #[must_use]
    pub fn is_shuffling(&self) -> bool {
        self.shuffle.is_some_and(|h| self.timers.is_pending(h))
    }

    fn reshuffle(&mut self, now: Instant) {
        self.lights = generate_lights(&mut self.rng, self.config.lights);
        self.generated_at = now;
        self.shuffles += 1;
        crate::trace!(shuffles = self.shuffles, "lights shuffled");
    }
}

impl Timed for AmbientBackground {
    fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn advance(&mut self, now: Instant) {
        while let Some((handle, Shuffle)) = self.timers.poll_due(now) {
            if self.shuffle == Some(handle) {
                self.reshuffle(now);
            }
        }
    }

    fn teardown(&mut self) {
        self.timers.cancel_all();
        self.shuffle = None;
    }
}

fn generate_lights(rng: &mut impl Rng, count: usize) -> Vec<GridLight> {
    (0..count)
        .map(|id| GridLight {
            id,
            left_pct: rng.random_range(0..100),
            top_pct: rng.random_range(0..100),
            delay: Duration::from_secs_f32(rng.random_range(0.0..2.0)),
            duration: Duration::from_secs_f32(rng.random_range(0.5..2.0)),
        })
        .collect()
}
