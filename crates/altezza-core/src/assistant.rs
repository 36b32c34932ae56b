#![forbid(unsafe_code)]

//! Chat assistant: launcher, first-contact tooltip, and the chat panel.
//!
//! [`Assistant`] is a three-state machine:
//!
//! ```text
//!   ClosedNoTooltip --(tooltip delay, still closed)--> ClosedTooltip
//!   ClosedNoTooltip --toggle--> Open
//!   ClosedTooltip   --toggle / click tooltip--> Open
//!   Open            --toggle / close--> ClosedNoTooltip
//! ```
//!
//! Opening the panel starts a fresh [`MessageSequencer`] session; closing it
//! stops the session.
//!
//! # Invariants
//!
//! 1. The tooltip timer is one-shot and armed once, at construction.
//! 2. Opening the panel cancels the tooltip timer, so a session that opened
//!    the panel before the delay never shows the tooltip.
//! 3. `Open` always implies the tooltip is hidden.

use std::time::{Duration, Instant};

use crate::sequencer::{ChatMessage, MessageSequencer, SequenceEvent};
use crate::timer::{Timed, TimerHandle, TimerRegistry, earliest};

/// Default delay before the first-contact tooltip appears.
pub const TOOLTIP_DELAY: Duration = Duration::from_millis(5000);

/// Configuration for [`Assistant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Delay from start until the tooltip appears, if the panel is still
    /// closed.
    /// Default: 5000 ms
    pub tooltip_delay: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            tooltip_delay: TOOLTIP_DELAY,
        }
    }
}

/// Whether the chat panel is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    /// Only the launcher button is shown.
    #[default]
    Closed,
    /// The chat panel is shown.
    Open,
}

/// Combined panel and tooltip visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Panel closed, no tooltip.
    ClosedNoTooltip,
    /// Panel closed, tooltip nudging the user.
    ClosedTooltip,
    /// Panel open.
    Open,
}

/// Events queued by the assistant. Drain with
/// [`drain_events`](Assistant::drain_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantEvent {
    /// The first-contact tooltip appeared.
    TooltipShown,
    /// The panel opened and a new script session started.
    PanelOpened {
        /// Sequencer session number.
        session: u64,
    },
    /// The panel closed.
    PanelClosed,
    /// A chat message became visible.
    MessageRevealed(ChatMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Nudge;

/// Panel, tooltip, and script state of the chat assistant.
#[derive(Debug, Clone)]
pub struct Assistant {
    config: AssistantConfig,
    panel: PanelState,
    tooltip: bool,
    timers: TimerRegistry<Nudge>,
    nudge: Option<TimerHandle>,
    sequencer: MessageSequencer,
    events: Vec<AssistantEvent>,
}

impl Assistant {
    /// Create the assistant at process start and arm the tooltip timer.
    #[must_use]
    pub fn new(now: Instant, config: AssistantConfig) -> Self {
        Self::with_sequencer(now, config, MessageSequencer::default())
    }

    /// Like [`new`](Self::new) with a custom sequencer.
    #[must_use]
    pub fn with_sequencer(now: Instant, config: AssistantConfig, sequencer: MessageSequencer) -> Self {
        let mut timers = TimerRegistry::new();
        let nudge = Some(timers.schedule(now, config.tooltip_delay, Nudge));
        Self {
            config,
            panel: PanelState::Closed,
            tooltip: false,
            timers,
            nudge,
            sequencer,
            events: Vec::new(),
        }
    }

    /// Launcher button: open when closed, close when open.
    pub fn toggle(&mut self, now: Instant) {
        match self.panel {
            PanelState::Closed => self.open(now),
            PanelState::Open => self.close(),
        }
    }

    /// Click on the tooltip bubble. Opens the panel if the tooltip is shown.
    ///
    /// Returns `false` when there was no tooltip to click.
    pub fn click_tooltip(&mut self, now: Instant) -> bool {
        if self.visibility() != Visibility::ClosedTooltip {
            return false;
        }
        self.open(now);
        true
    }

    /// Close the panel. No-op when already closed.
    pub fn close(&mut self) {
        if self.panel == PanelState::Closed {
            return;
        }
        self.panel = PanelState::Closed;
        self.sequencer.stop();
        self.events.push(AssistantEvent::PanelClosed);
        crate::info!("assistant panel closed");
    }

    /// Current visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        match (self.panel, self.tooltip) {
            (PanelState::Open, _) => Visibility::Open,
            (PanelState::Closed, true) => Visibility::ClosedTooltip,
            (PanelState::Closed, false) => Visibility::ClosedNoTooltip,
        }
    }

    /// Panel state.
    #[must_use]
    pub fn panel(&self) -> PanelState {
        self.panel
    }

    /// Whether the tooltip is shown.
    #[must_use]
    pub fn tooltip_visible(&self) -> bool {
        self.tooltip
    }

    /// The launcher shows an unread dot while the panel is closed.
    #[must_use]
    pub fn show_notification_dot(&self) -> bool {
        self.panel == PanelState::Closed
    }

    /// Messages revealed in the current session.
    #[must_use]
    pub fn visible_messages(&self) -> &[ChatMessage] {
        self.sequencer.visible()
    }

    /// The message sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &MessageSequencer {
        &self.sequencer
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Drain all pending events. Clears the event queue.
    pub fn drain_events(&mut self) -> Vec<AssistantEvent> {
        std::mem::take(&mut self.events)
    }

    fn open(&mut self, now: Instant) {
        if let Some(nudge) = self.nudge.take() {
            self.timers.cancel(nudge);
            crate::debug!("tooltip timer cancelled by open");
        }
        self.tooltip = false;
        self.panel = PanelState::Open;
        self.sequencer.start(now);
        let session = self.sequencer.session();
        self.events.push(AssistantEvent::PanelOpened { session });
        crate::info!(session, "assistant panel opened");
        // Zero-offset entries belong to the open itself.
        self.forward_reveals(now);
    }

    fn forward_reveals(&mut self, now: Instant) {
        self.sequencer.advance(now);
        self.events.extend(
            self.sequencer
                .drain_events()
                .into_iter()
                .map(|SequenceEvent::Revealed { message, .. }| AssistantEvent::MessageRevealed(message)),
        );
    }
}

impl Timed for Assistant {
    fn next_deadline(&self) -> Option<Instant> {
        earliest([self.timers.next_deadline(), self.sequencer.next_deadline()])
    }

    fn advance(&mut self, now: Instant) {
        while let Some((handle, Nudge)) = self.timers.poll_due(now) {
            if self.nudge != Some(handle) {
                continue;
            }
            self.nudge = None;
            if self.panel == PanelState::Closed {
                self.tooltip = true;
                self.events.push(AssistantEvent::TooltipShown);
                crate::info!("assistant tooltip shown");
            }
        }
        self.forward_reveals(now);
    }

    fn teardown(&mut self) {
        self.timers.cancel_all();
        self.nudge = None;
        self.sequencer.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn ids(assistant: &Assistant) -> Vec<u32> {
        assistant.visible_messages().iter().map(|m| m.id).collect()
    }

    #[test]
    fn tooltip_appears_after_delay() {
        let t0 = Instant::now();
        let mut a = Assistant::new(t0, AssistantConfig::default());
        assert_eq!(a.visibility(), Visibility::ClosedNoTooltip);
        a.advance(t0 + ms(4999));
        assert_eq!(a.visibility(), Visibility::ClosedNoTooltip);
        a.advance(t0 + ms(5000));
        assert_eq!(a.visibility(), Visibility::ClosedTooltip);
        assert_eq!(a.drain_events(), vec![AssistantEvent::TooltipShown]);
        assert!(a.next_deadline().is_none());
    }

    #[test]
    fn opening_early_suppresses_tooltip_forever() {
        let t0 = Instant::now();
        let mut a = Assistant::new(t0, AssistantConfig::default());
        a.toggle(t0 + ms(3000));
        a.toggle(t0 + ms(4000));
        a.advance(t0 + ms(60_000));
        assert_eq!(a.visibility(), Visibility::ClosedNoTooltip);
        assert!(!a.drain_events().contains(&AssistantEvent::TooltipShown));
    }

    #[test]
    fn open_reveals_first_message_immediately() {
        let t0 = Instant::now();
        let mut a = Assistant::new(t0, AssistantConfig::default());
        a.toggle(t0 + ms(100));
        assert_eq!(a.visibility(), Visibility::Open);
        assert_eq!(ids(&a), vec![1]);
        assert_eq!(
            a.drain_events(),
            vec![
                AssistantEvent::PanelOpened { session: 1 },
                AssistantEvent::MessageRevealed(crate::sequencer::SCRIPT[0]),
            ]
        );
    }

    #[test]
    fn click_tooltip_opens_and_hides_tooltip() {
        let t0 = Instant::now();
        let mut a = Assistant::new(t0, AssistantConfig::default());
        assert!(!a.click_tooltip(t0), "nothing to click yet");
        a.advance(t0 + ms(5000));
        assert!(a.click_tooltip(t0 + ms(6000)));
        assert_eq!(a.visibility(), Visibility::Open);
        assert!(!a.tooltip_visible());
        a.close();
        assert_eq!(a.visibility(), Visibility::ClosedNoTooltip);
    }

    #[test]
    fn close_mid_script_keeps_two_then_reopen_replays() {
        let t0 = Instant::now();
        let mut a = Assistant::new(t0, AssistantConfig::default());
        a.toggle(t0);
        a.advance(t0 + ms(4000));
        assert_eq!(ids(&a), vec![1, 2]);
        a.close();
        assert!(a.visible_messages().is_empty());

        a.advance(t0 + ms(7500));
        let reveals = a
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, AssistantEvent::MessageRevealed(_)))
            .count();
        assert_eq!(reveals, 2);

        let reopen = t0 + ms(9000);
        a.toggle(reopen);
        a.advance(reopen + ms(7500));
        assert_eq!(ids(&a), vec![1, 2, 3]);
    }

    #[test]
    fn notification_dot_follows_panel() {
        let t0 = Instant::now();
        let mut a = Assistant::new(t0, AssistantConfig::default());
        assert!(a.show_notification_dot());
        a.toggle(t0);
        assert!(!a.show_notification_dot());
    }

    #[test]
    fn close_when_closed_is_silent() {
        let t0 = Instant::now();
        let mut a = Assistant::new(t0, AssistantConfig::default());
        a.close();
        assert!(a.drain_events().is_empty());
    }

    #[test]
    fn teardown_cancels_tooltip_and_script() {
        let t0 = Instant::now();
        let mut a = Assistant::new(t0, AssistantConfig::default());
        a.toggle(t0 + ms(10));
        a.teardown();
        assert!(a.next_deadline().is_none());
        a.advance(t0 + ms(60_000));
        assert!(!a.tooltip_visible());
    }
}
