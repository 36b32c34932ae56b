#![forbid(unsafe_code)]

//! Scripted chat reveal.
//!
//! The assistant panel "types" a fixed script: each [`ChatMessage`] appears
//! at its offset from the instant the panel opened. Every open is a fresh
//! session that replays the whole script from the first entry; closing the
//! panel drops whatever was shown and cancels whatever was still pending.
//!
//! # Invariants
//!
//! 1. Visible messages are always a prefix of the script, in script order.
//! 2. Each session arms exactly one timer per script entry, relative to the
//!    session's own start instant.
//! 3. After `stop`, no timer of that session can reveal anything.

use std::time::{Duration, Instant};

use crate::timer::{Timed, TimerHandle, TimerRegistry};

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// How a run of message text should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Regular body text.
    Plain,
    /// Bright, heavier text.
    Strong,
    /// Brand accent color, italic where supported.
    Accent,
    /// Rendered like a keyboard key cap.
    KeyCap,
}

/// A run of text with a single tone. `\n` starts a new line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Text of the run.
    pub text: &'static str,
    /// Rendering tone.
    pub tone: Tone,
}

impl Span {
    /// Plain text run.
    #[must_use]
    pub const fn plain(text: &'static str) -> Self {
        Self {
            text,
            tone: Tone::Plain,
        }
    }

    /// Run with an explicit tone.
    #[must_use]
    pub const fn toned(text: &'static str, tone: Tone) -> Self {
        Self { text, tone }
    }
}

/// One scripted chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatMessage {
    /// Unique id; ids increase in script order.
    pub id: u32,
    /// Display payload.
    pub content: &'static [Span],
    /// Delay from panel open until the message appears.
    pub offset: Duration,
}

impl ChatMessage {
    /// Content with tones stripped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.content.iter().map(|span| span.text).collect()
    }
}

/// The assistant's script.
pub static SCRIPT: [ChatMessage; 3] = [
    ChatMessage {
        id: 1,
        content: &[
            Span::toned("¡Hola!", Tone::Strong),
            Span::plain(
                " Gracias por tu visita. Estamos reconstruyendo nuestro espacio digital \
                 para ofrecerte algo extraordinario.",
            ),
        ],
        offset: Duration::from_millis(0),
    },
    ChatMessage {
        id: 2,
        content: &[
            Span::plain("🤫 "),
            Span::toned("Pssst...", Tone::Accent),
            Span::plain(" ¿Quieres ver un secreto?\n\nPresiona "),
            Span::toned("Ctrl + Shift + R", Tone::KeyCap),
            Span::plain("\no "),
            Span::toned("mantén presionado el logo central", Tone::Accent),
            Span::plain(" por 2 segundos."),
        ],
        offset: Duration::from_millis(3500),
    },
    ChatMessage {
        id: 3,
        content: &[Span::plain(
            "Mientras tú exploras eso, yo seguiré aquí construyendo el futuro. 🚀",
        )],
        offset: Duration::from_millis(7500),
    },
];

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Events queued by the sequencer. Drain with
/// [`drain_events`](MessageSequencer::drain_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    /// A script entry became visible. This is the `onReveal` hook.
    Revealed {
        /// Session the message belongs to.
        session: u64,
        /// The revealed message.
        message: ChatMessage,
    },
}

/// Plays a fixed script of timed messages, one session per panel open.
#[derive(Debug, Clone)]
pub struct MessageSequencer {
    script: &'static [ChatMessage],
    timers: TimerRegistry<usize>,
    run: Vec<TimerHandle>,
    visible: Vec<ChatMessage>,
    running: bool,
    session: u64,
    events: Vec<SequenceEvent>,
}

impl Default for MessageSequencer {
    fn default() -> Self {
        Self::new(&SCRIPT)
    }
}

impl MessageSequencer {
    /// Create a sequencer for `script`. Offsets should be non-decreasing;
    /// equal offsets reveal in script order.
    #[must_use]
    pub fn new(script: &'static [ChatMessage]) -> Self {
        Self {
            script,
            timers: TimerRegistry::new(),
            run: Vec::with_capacity(script.len()),
            visible: Vec::with_capacity(script.len()),
            running: false,
            session: 0,
            events: Vec::new(),
        }
    }

    /// Start a fresh session at `now`.
    ///
    /// Any previous session, finished or not, is stopped first, so the
    /// script always replays from its first entry.
    pub fn start(&mut self, now: Instant) {
        self.stop();
        self.session += 1;
        self.running = true;
        for (index, message) in self.script.iter().enumerate() {
            let handle = self.timers.schedule(now, message.offset, index);
            self.run.push(handle);
        }
        crate::debug!(session = self.session, entries = self.script.len(), "chat script started");
    }

    /// Stop the current session: cancel pending reveals, clear the chat.
    pub fn stop(&mut self) {
        let cancelled = self.timers.cancel_many(self.run.drain(..));
        if self.running {
            crate::debug!(session = self.session, cancelled, "chat script stopped");
        }
        self.visible.clear();
        self.running = false;
    }

    /// Messages revealed in the current session, in script order.
    #[must_use]
    pub fn visible(&self) -> &[ChatMessage] {
        &self.visible
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether more messages are still on their way.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.running && self.visible.len() < self.script.len()
    }

    /// Number of sessions started so far.
    #[must_use]
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Reveal timers still pending.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// The script being played.
    #[must_use]
    pub fn script(&self) -> &'static [ChatMessage] {
        self.script
    }

    /// Drain all pending events. Clears the event queue.
    pub fn drain_events(&mut self) -> Vec<SequenceEvent> {
        std::mem::take(&mut self.events)
    }

    fn reveal(&mut self, handle: TimerHandle, index: usize) {
        let Some(pos) = self.run.iter().position(|&h| h == handle) else {
            return;
        };
        self.run.swap_remove(pos);
        let Some(&message) = self.script.get(index) else {
            return;
        };
        self.visible.push(message);
        self.events.push(SequenceEvent::Revealed {
            session: self.session,
            message,
        });
        crate::debug!(session = self.session, id = message.id, "chat message revealed");
    }
}

impl Timed for MessageSequencer {
    fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn advance(&mut self, now: Instant) {
        while let Some((handle, index)) = self.timers.poll_due(now) {
            self.reveal(handle, index);
        }
    }

    fn teardown(&mut self) {
        self.stop();
        self.timers.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn ids(seq: &MessageSequencer) -> Vec<u32> {
        seq.visible().iter().map(|m| m.id).collect()
    }

    #[test]
    fn script_offsets_strictly_increase() {
        assert!(SCRIPT.windows(2).all(|w| w[0].offset < w[1].offset));
        assert!(SCRIPT.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(SCRIPT[0].offset, Duration::ZERO);
    }

    #[test]
    fn first_message_is_due_at_open() {
        let t0 = Instant::now();
        let mut seq = MessageSequencer::default();
        seq.start(t0);
        seq.advance(t0);
        assert_eq!(ids(&seq), vec![1]);
        assert!(seq.is_typing());
    }

    #[test]
    fn full_script_in_order() {
        let t0 = Instant::now();
        let mut seq = MessageSequencer::default();
        seq.start(t0);
        seq.advance(t0 + ms(3499));
        assert_eq!(ids(&seq), vec![1]);
        seq.advance(t0 + ms(3500));
        assert_eq!(ids(&seq), vec![1, 2]);
        seq.advance(t0 + ms(7500));
        assert_eq!(ids(&seq), vec![1, 2, 3]);
        assert!(!seq.is_typing());
        assert_eq!(seq.pending_timers(), 0);
    }

    #[test]
    fn late_advance_keeps_script_order() {
        let t0 = Instant::now();
        let mut seq = MessageSequencer::default();
        seq.start(t0);
        seq.advance(t0 + ms(60_000));
        assert_eq!(ids(&seq), vec![1, 2, 3]);
        let revealed: Vec<u32> = seq
            .drain_events()
            .into_iter()
            .map(|SequenceEvent::Revealed { message, .. }| message.id)
            .collect();
        assert_eq!(revealed, vec![1, 2, 3]);
    }

    #[test]
    fn stop_at_4000_cancels_third() {
        let t0 = Instant::now();
        let mut seq = MessageSequencer::default();
        seq.start(t0);
        seq.advance(t0 + ms(4000));
        assert_eq!(ids(&seq), vec![1, 2]);
        seq.stop();
        assert!(seq.visible().is_empty());
        assert_eq!(seq.pending_timers(), 0);

        seq.advance(t0 + ms(7500));
        assert!(seq.visible().is_empty());
        let revealed = seq.drain_events().len();
        assert_eq!(revealed, 2, "nothing revealed after stop");
    }

    #[test]
    fn restart_replays_from_start_relative_to_reopen() {
        let t0 = Instant::now();
        let mut seq = MessageSequencer::default();
        seq.start(t0);
        seq.advance(t0 + ms(5000));
        seq.stop();

        let reopen = t0 + ms(6000);
        seq.start(reopen);
        assert_eq!(seq.session(), 2);
        seq.advance(reopen);
        assert_eq!(ids(&seq), vec![1]);
        // The first session's third offset (t0 + 7500) must not matter.
        seq.advance(t0 + ms(7500));
        assert_eq!(ids(&seq), vec![1]);
        seq.advance(reopen + ms(7500));
        assert_eq!(ids(&seq), vec![1, 2, 3]);
    }

    #[test]
    fn start_while_running_resets() {
        let t0 = Instant::now();
        let mut seq = MessageSequencer::default();
        seq.start(t0);
        seq.advance(t0 + ms(3500));
        seq.start(t0 + ms(3600));
        assert!(seq.visible().is_empty());
        assert_eq!(seq.pending_timers(), SCRIPT.len());
    }

    #[test]
    fn teardown_leaves_nothing_pending() {
        let t0 = Instant::now();
        let mut seq = MessageSequencer::default();
        seq.start(t0);
        seq.teardown();
        assert!(seq.next_deadline().is_none());
        assert!(!seq.is_running());
    }

    #[test]
    fn plain_text_joins_spans() {
        assert!(SCRIPT[1].plain_text().contains("Ctrl + Shift + R"));
        assert!(SCRIPT[0].plain_text().starts_with("¡Hola!"));
    }
}
