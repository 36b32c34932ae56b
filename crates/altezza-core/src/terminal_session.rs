#![forbid(unsafe_code)]

//! Terminal session guard for the full-screen splash.
//!
//! [`TerminalSession`] enters raw mode, and optionally the alternate screen,
//! mouse capture, focus reporting, and enhanced keyboard reporting. Whatever
//! it enabled is disabled again in reverse order when it is dropped.
//!
//! # Lifecycle Guarantees
//!
//! 1. Every mode switched on has a flag; drop switches off exactly those.
//! 2. A panic hook restores the terminal before the panic message prints.
//! 3. On unix, SIGINT/SIGTERM restore the terminal and exit with `128 + sig`.
//!
//! # Usage
//!
//! ```no_run
//! use altezza_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let session = TerminalSession::new(SessionOptions::fullscreen())?;
//! let (width, height) = session.size()?;
//! # let _ = (width, height);
//! // Terminal restored when `session` drops.
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};

use crate::event::Event;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Which terminal modes a session turns on. All default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Switch to the alternate screen buffer.
    pub alternate_screen: bool,

    /// Report mouse presses, releases, drags, and motion.
    pub mouse_capture: bool,

    /// Report focus gained/lost.
    pub focus_events: bool,

    /// Ask for disambiguated key reporting, so Ctrl+Shift+letter arrives
    /// with both modifiers on terminals that support it.
    pub keyboard_enhancement: bool,
}

impl SessionOptions {
    /// Alternate screen, mouse, focus, and keyboard enhancement.
    #[must_use]
    pub const fn fullscreen() -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: true,
            focus_events: true,
            keyboard_enhancement: true,
        }
    }

    /// Same options without mouse capture.
    #[must_use]
    pub const fn without_mouse(self) -> Self {
        Self {
            mouse_capture: false,
            ..self
        }
    }
}

/// RAII guard over the terminal modes of one run.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
    focus_events_enabled: bool,
    keyboard_enhancement_enabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and the requested modes.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or a requested mode cannot be enabled.
    /// Modes enabled before the failure are restored by the dropped guard.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        crate::info!("terminal raw mode enabled");

        let mut session = Self {
            options,
            alternate_screen_enabled: false,
            mouse_enabled: false,
            focus_events_enabled: false,
            keyboard_enhancement_enabled: false,
            #[cfg(unix)]
            signal_guard: None,
        };
        #[cfg(unix)]
        {
            session.signal_guard = Some(SignalGuard::new()?);
        }

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
        }

        if options.mouse_capture {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
            session.mouse_enabled = true;
        }

        if options.focus_events {
            crossterm::execute!(stdout, crossterm::event::EnableFocusChange)?;
            session.focus_events_enabled = true;
        }

        if options.keyboard_enhancement
            && crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false)
        {
            crossterm::execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
            session.keyboard_enhancement_enabled = true;
        }

        crossterm::execute!(stdout, crossterm::cursor::Hide)?;
        crate::info!(
            alternate_screen = session.alternate_screen_enabled,
            mouse = session.mouse_enabled,
            keyboard_enhancement = session.keyboard_enhancement_enabled,
            "terminal session started"
        );
        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input. `Ok(true)` means an event is ready.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read the next input event (blocking).
    ///
    /// Returns `Ok(None)` for input the splash ignores.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        let event = crossterm::event::read()?;
        Ok(Event::from_crossterm(event))
    }

    /// Options the session was created with.
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();

        if self.keyboard_enhancement_enabled {
            let _ = crossterm::execute!(stdout, PopKeyboardEnhancementFlags);
            self.keyboard_enhancement_enabled = false;
        }

        if self.focus_events_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableFocusChange);
            self.focus_events_enabled = false;
        }

        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
        }

        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }

        let _ = crossterm::terminal::disable_raw_mode();
        let _ = stdout.flush();
        crate::info!("terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, PopKeyboardEnhancementFlags);
    let _ = crossterm::execute!(stdout, crossterm::event::DisableFocusChange);
    let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                crate::warn!(signal, "termination signal received, restoring terminal");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
