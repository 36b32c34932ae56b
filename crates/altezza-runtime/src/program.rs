#![forbid(unsafe_code)]

//! Elm-style program runtime with deadline-driven ticks.
//!
//! A [`Model`] owns all state. The runtime feeds it messages (converted from
//! terminal events), executes the [`Cmd`]s it returns, and asks it to draw.
//! There are no free-running tick subscriptions: the runtime sleeps until
//! whichever comes first of the next input, the model's
//! [`next_deadline`](Model::next_deadline), or the next animation frame, and
//! delivers [`Event::Tick`] when a deadline is due.
//!
//! # Invariants
//!
//! 1. `update` and `view` always receive the instant the runtime acted on.
//! 2. [`Model::teardown`] runs before the terminal is restored, on every
//!    non-panicking exit path.
//!
//! # Example
//!
//! ```ignore
//! use altezza_runtime::program::{Cmd, Model, Program, ProgramConfig};
//!
//! let model = SplashModel::new(Instant::now(), SplashConfig::default());
//! Program::new(model, ProgramConfig::default()).run()?;
//! ```

use std::io;
use std::time::{Duration, Instant};

use altezza_core::audio::{AudioCue, Muted, TerminalBell, play_best_effort};
use altezza_core::event::Event;
use altezza_core::terminal_session::{SessionOptions, TerminalSession};
use tracing::{debug, info, info_span, warn};

use crate::error::Result;
use crate::frame::Frame;
use crate::presenter::Presenter;

/// Application state and behavior.
pub trait Model {
    /// Messages the model reacts to. Terminal events convert into them.
    type Message: From<Event>;

    /// Called once before the first event.
    fn init(&mut self, _now: Instant) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Handle one message at `now`.
    fn update(&mut self, msg: Self::Message, now: Instant) -> Cmd<Self::Message>;

    /// Draw the current state. The model paints every cell it cares about.
    fn view(&self, frame: &mut Frame, now: Instant);

    /// Earliest pending timer deadline across the model's components.
    fn next_deadline(&self) -> Option<Instant> {
        None
    }

    /// Cancel every pending timer. Called once when the program ends.
    fn teardown(&mut self) {}
}

/// Side effects requested by the model.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Stop the program.
    Quit,
    /// Execute several commands in order.
    Batch(Vec<Cmd<M>>),
    /// Feed a message back into `update`.
    Msg(M),
    /// Record a line in the log.
    Log(String),
    /// Play the notification cue (best-effort).
    PlayCue,
    /// Open a URL with the platform opener (best-effort, detached).
    OpenLink(String),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::PlayCue => write!(f, "PlayCue"),
            Self::OpenLink(url) => f.debug_tuple("OpenLink").field(url).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// No-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Log command.
    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Link command.
    #[inline]
    pub fn open_link(url: impl Into<String>) -> Self {
        Self::OpenLink(url.into())
    }

    /// Batch of commands; `None`s are dropped and singletons unwrapped.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    /// Whether this is [`Cmd::None`].
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
            Self::PlayCue => "PlayCue",
            Self::OpenLink(_) => "OpenLink",
        }
    }
}

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

/// Runtime settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Terminal modes to enable.
    /// Default: [`SessionOptions::fullscreen`]
    pub session: SessionOptions,

    /// Redraw period while nothing else happens (drives animations).
    /// Default: 50 ms
    pub frame_interval: Duration,

    /// Quit on its own after this long.
    /// Default: None
    pub exit_after: Option<Duration>,

    /// Silence the notification cue.
    /// Default: false
    pub mute: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            session: SessionOptions::fullscreen(),
            frame_interval: Duration::from_millis(50),
            exit_after: None,
            mute: false,
        }
    }
}

/// Runs a [`Model`] against the real terminal.
pub struct Program<M: Model> {
    model: M,
    config: ProgramConfig,
    cue: Box<dyn AudioCue>,
    running: bool,
}

impl<M: Model> Program<M> {
    /// Create a program. The cue is the terminal bell unless muted.
    pub fn new(model: M, config: ProgramConfig) -> Self {
        let cue: Box<dyn AudioCue> = if config.mute {
            Box::new(Muted)
        } else {
            Box::new(TerminalBell::stdout())
        };
        Self::with_cue(model, config, cue)
    }

    /// Create a program with a custom notification cue.
    pub fn with_cue(model: M, config: ProgramConfig, cue: Box<dyn AudioCue>) -> Self {
        Self {
            model,
            config,
            cue,
            running: true,
        }
    }

    /// Run until the model quits (or `exit_after` elapses); returns the
    /// final model.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Terminal`](crate::error::RuntimeError::Terminal)
    /// if the terminal cannot be set up, read, or written.
    pub fn run(mut self) -> Result<M> {
        let span = info_span!("program");
        let _guard = span.enter();

        let session = TerminalSession::new(self.config.session)?;
        let outcome = self.event_loop(&session);
        self.model.teardown();
        drop(session);
        info!(clean = outcome.is_ok(), "program finished");
        outcome.map(|()| self.model)
    }

    fn event_loop(&mut self, session: &TerminalSession) -> Result<()> {
        let started = Instant::now();
        let deadline = self.config.exit_after.map(|limit| started + limit);
        let mut presenter = Presenter::new(io::stdout());

        let (width, height) = session.size()?;
        let mut frame = Frame::new(width, height);
        let cmd = self.model.init(started);
        self.execute(cmd, started);
        self.dispatch(Event::Resize { width, height }, started);
        let mut next_frame = started;

        while self.running {
            let now = Instant::now();
            if deadline.is_some_and(|limit| now >= limit) {
                info!("exit-after limit reached");
                break;
            }
            if self.model.next_deadline().is_some_and(|due| due <= now) {
                self.dispatch(Event::Tick, now);
                continue;
            }
            if now >= next_frame {
                self.model.view(&mut frame, now);
                presenter.present(&frame)?;
                next_frame = now + self.config.frame_interval;
            }

            let wake = [Some(next_frame), self.model.next_deadline(), deadline]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(next_frame);
            let timeout = wake.saturating_duration_since(Instant::now());
            if !session.poll_event(timeout)? {
                continue;
            }
            let Some(event) = session.read_event()? else {
                continue;
            };
            if let Event::Resize { width, height } = event {
                frame = Frame::new(width, height);
                presenter.invalidate();
            }
            self.dispatch(event, Instant::now());
            next_frame = Instant::now();
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event, now: Instant) {
        let msg = M::Message::from(event);
        let cmd = self.model.update(msg, now);
        self.execute(cmd, now);
    }

    fn execute(&mut self, cmd: Cmd<M::Message>, now: Instant) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                debug!("quit requested");
                self.running = false;
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd, now);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Msg(m) => {
                let cmd = self.model.update(m, now);
                self.execute(cmd, now);
            }
            Cmd::Log(text) => info!(target: "altezza::log", "{text}"),
            Cmd::PlayCue => {
                play_best_effort(self.cue.as_mut());
            }
            Cmd::OpenLink(url) => {
                open_link(&url);
            }
        }
    }
}

/// Open `url` in the platform's default handler without waiting for it.
///
/// Failures are logged and reported as `false`; they never end the program.
pub fn open_link(url: &str) -> bool {
    match open::that_detached(url) {
        Ok(()) => {
            info!(url, "link opened");
            true
        }
        Err(err) => {
            warn!(url, error = %err, "could not open link");
            false
        }
    }
}
