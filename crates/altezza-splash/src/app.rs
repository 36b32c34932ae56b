#![forbid(unsafe_code)]

//! Splash application model.
//!
//! [`SplashModel`] owns one instance of every coordination component and
//! routes terminal input to them. It follows the Elm architecture: all
//! state lives here, [`SplashMsg`] drives transitions, and
//! [`view`](altezza_runtime::Model::view) is a pure function of state and
//! the frame instant.
//!
//! # Update order
//!
//! Every update first advances all timers to `now` and only then handles
//! the message. A hold released at the very instant its threshold elapses
//! therefore still counts as completed, and a panel closed at a message's
//! offset has already shown it.
//!
//! Component events are drained after both phases and turned into
//! [`Cmd`]s: a completed hold activates vibrant mode, the tooltip and every
//! message reveal play the notification cue.

use std::time::Instant;

use altezza_core::assistant::{Assistant, AssistantConfig, AssistantEvent, PanelState};
use altezza_core::background::{AmbientBackground, BackgroundConfig};
use altezza_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use altezza_core::press_hold::{PressEvent, PressHoldConfig, PressHoldDetector};
use altezza_core::timer::{Timed, earliest};
use altezza_core::vibrant::{ModeEvent, ModeSource, VibrantConfig, VibrantController, VisualMode, is_vibrant_chord};
use altezza_runtime::{Cmd, Frame, Model};
use tracing::{debug, info};

use crate::layout::{Layout, bob_rows};
use crate::view;

/// Social profile opened from the assistant panel.
pub const SOCIAL_URL: &str = "https://www.instagram.com/altezzagroup/";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for every component of the splash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplashConfig {
    /// Logo long-press timing.
    pub press: PressHoldConfig,
    /// Vibrant-mode window.
    pub vibrant: VibrantConfig,
    /// Tooltip nudge delay.
    pub assistant: AssistantConfig,
    /// Background light field.
    pub background: BackgroundConfig,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Splash message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplashMsg {
    /// Raw key or mouse input to route.
    Input(Event),
    /// A component deadline is due.
    Tick,
    /// Terminal resize.
    Resize {
        /// New width.
        width: u16,
        /// New height.
        height: u16,
    },
    /// Focus gained (`true`) or lost.
    Focus(bool),
    /// Switch on vibrant mode (or restart its window).
    ActivateVibrant,
    /// Open or close the assistant panel.
    TogglePanel,
    /// Close the assistant panel if open.
    ClosePanel,
    /// Open the social profile.
    OpenLink,
    /// Quit the application.
    Quit,
}

impl From<Event> for SplashMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Resize { width, height } => Self::Resize { width, height },
            Event::Tick => Self::Tick,
            Event::Focus(gained) => Self::Focus(gained),
            other => Self::Input(other),
        }
    }
}

// ---------------------------------------------------------------------------
// SplashModel
// ---------------------------------------------------------------------------

/// Top-level splash state.
pub struct SplashModel {
    config: SplashConfig,
    started: Instant,
    width: u16,
    height: u16,
    press: PressHoldDetector,
    vibrant: VibrantController,
    assistant: Assistant,
    background: AmbientBackground,
}

impl SplashModel {
    /// Build every component at `now`. The tooltip nudge starts counting
    /// from here.
    #[must_use]
    pub fn new(now: Instant, config: SplashConfig) -> Self {
        Self {
            config,
            started: now,
            width: 80,
            height: 24,
            press: PressHoldDetector::new(config.press),
            vibrant: VibrantController::new(config.vibrant),
            assistant: Assistant::new(now, config.assistant),
            background: AmbientBackground::new(now, config.background),
        }
    }

    /// Regions at `now` for the current terminal size.
    #[must_use]
    pub fn layout(&self, now: Instant) -> Layout {
        Layout::compute(self.width, self.height, bob_rows(now.saturating_duration_since(self.started)))
    }

    /// Current terminal size.
    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Instant the splash was built.
    #[must_use]
    pub const fn started(&self) -> Instant {
        self.started
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &SplashConfig {
        &self.config
    }

    /// Visual mode to render with.
    #[must_use]
    pub fn mode(&self) -> VisualMode {
        self.vibrant.mode()
    }

    /// Logo gesture detector.
    #[must_use]
    pub const fn press(&self) -> &PressHoldDetector {
        &self.press
    }

    /// Vibrant-mode controller.
    #[must_use]
    pub const fn vibrant(&self) -> &VibrantController {
        &self.vibrant
    }

    /// Panel, tooltip and message state.
    #[must_use]
    pub const fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    /// Ambient background state.
    #[must_use]
    pub const fn background(&self) -> &AmbientBackground {
        &self.background
    }

    fn advance_timers(&mut self, now: Instant) {
        self.press.advance(now);
        self.vibrant.advance(now);
        self.background.advance(now);
        self.assistant.advance(now);
    }

    /// Drain component events into commands and keep the background in
    /// step with the mode.
    fn settle(&mut self, now: Instant) -> Vec<Cmd<SplashMsg>> {
        let mut cmds = Vec::new();

        for event in self.press.drain_events() {
            if event == PressEvent::Completed {
                self.vibrant.activate(now);
                cmds.push(Cmd::log("vibrant mode via long press"));
            }
        }
        for event in self.vibrant.drain_events() {
            match event {
                ModeEvent::Activated { restarted } => debug!(restarted, "mode: vibrant"),
                ModeEvent::Reverted => debug!("mode: default"),
            }
        }
        self.background.sync(&self.vibrant, now);

        for event in self.assistant.drain_events() {
            match event {
                AssistantEvent::TooltipShown | AssistantEvent::MessageRevealed(_) => cmds.push(Cmd::PlayCue),
                AssistantEvent::PanelOpened { session } => debug!(session, "assistant opened"),
                AssistantEvent::PanelClosed => debug!("assistant closed"),
            }
        }
        cmds
    }

    fn handle(&mut self, msg: SplashMsg, now: Instant) -> Cmd<SplashMsg> {
        match msg {
            SplashMsg::Input(Event::Key(key)) => self.handle_key(key),
            SplashMsg::Input(Event::Mouse(mouse)) => self.handle_mouse(mouse, now),
            SplashMsg::Input(_) | SplashMsg::Tick => Cmd::none(),
            SplashMsg::Resize { width, height } => {
                self.width = width;
                self.height = height;
                Cmd::none()
            }
            SplashMsg::Focus(gained) => {
                if !gained {
                    self.press.press_end(now);
                }
                Cmd::none()
            }
            SplashMsg::ActivateVibrant => {
                self.vibrant.activate(now);
                Cmd::log("vibrant mode via shortcut")
            }
            SplashMsg::TogglePanel => {
                self.assistant.toggle(now);
                Cmd::none()
            }
            SplashMsg::ClosePanel => {
                self.assistant.close();
                Cmd::none()
            }
            SplashMsg::OpenLink => Cmd::open_link(SOCIAL_URL),
            SplashMsg::Quit => {
                info!("quit");
                Cmd::quit()
            }
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Cmd<SplashMsg> {
        if is_vibrant_chord(&key) {
            return Cmd::msg(SplashMsg::ActivateVibrant);
        }
        if !key.is_press() {
            return Cmd::none();
        }
        let open = self.assistant.panel() == PanelState::Open;
        match key.code {
            KeyCode::Char('c') if key.ctrl() => Cmd::msg(SplashMsg::Quit),
            _ if key.ctrl() => Cmd::none(),
            KeyCode::Char('q') => Cmd::msg(SplashMsg::Quit),
            KeyCode::Enter => Cmd::msg(SplashMsg::TogglePanel),
            KeyCode::Escape if open => Cmd::msg(SplashMsg::ClosePanel),
            KeyCode::Char('l') if open => Cmd::msg(SplashMsg::OpenLink),
            _ => Cmd::none(),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> Cmd<SplashMsg> {
        let (x, y) = mouse.position();
        self.background.set_pointer(x, y);
        let layout = self.layout(now);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click(&layout, x, y, now),
            MouseEventKind::Up(_) => {
                self.press.press_end(now);
                Cmd::none()
            }
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if self.press.is_charging() && !layout.logo_hit.contains(x, y) {
                    self.press.press_end(now);
                }
                Cmd::none()
            }
            _ => Cmd::none(),
        }
    }

    fn click(&mut self, layout: &Layout, x: u16, y: u16, now: Instant) -> Cmd<SplashMsg> {
        if self.assistant.panel() == PanelState::Open && layout.panel.contains(x, y) {
            if layout.panel_close.contains(x, y) {
                return Cmd::msg(SplashMsg::ClosePanel);
            }
            if layout.panel_link.contains(x, y) {
                return Cmd::msg(SplashMsg::OpenLink);
            }
            return Cmd::none();
        }
        if layout.launcher.contains(x, y) {
            return Cmd::msg(SplashMsg::TogglePanel);
        }
        if self.assistant.tooltip_visible() && layout.tooltip.contains(x, y) {
            self.assistant.click_tooltip(now);
            return Cmd::none();
        }
        if layout.logo_hit.contains(x, y) {
            self.press.press_start(now);
        }
        Cmd::none()
    }
}

impl Model for SplashModel {
    type Message = SplashMsg;

    fn init(&mut self, now: Instant) -> Cmd<SplashMsg> {
        info!(seed = ?self.config.background.seed, "splash started");
        Cmd::batch(self.settle(now))
    }

    fn update(&mut self, msg: SplashMsg, now: Instant) -> Cmd<SplashMsg> {
        self.advance_timers(now);
        let cmd = self.handle(msg, now);
        let mut cmds = self.settle(now);
        cmds.push(cmd);
        Cmd::batch(cmds)
    }

    fn view(&self, frame: &mut Frame, now: Instant) {
        view::render(self, frame, now);
    }

    fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.press.next_deadline(),
            self.vibrant.next_deadline(),
            self.background.next_deadline(),
            self.assistant.next_deadline(),
        ])
    }

    fn teardown(&mut self) {
        self.press.teardown();
        self.vibrant.teardown();
        self.background.teardown();
        self.assistant.teardown();
        debug!("timers cancelled");
    }
}
