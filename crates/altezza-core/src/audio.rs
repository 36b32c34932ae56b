#![forbid(unsafe_code)]

//! Notification sound.
//!
//! A cue is played on every chat reveal and when the tooltip first shows.
//! Playback is best-effort: failures never reach UI state.

use std::io::{self, Write};

/// Something that can make the notification sound.
pub trait AudioCue {
    /// Play the cue once.
    fn play(&mut self) -> io::Result<()>;
}

/// Rings the terminal bell (BEL) on a writer.
#[derive(Debug)]
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    /// Bell on `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the bell and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalBell<io::Stdout> {
    /// Bell on the process stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AudioCue for TerminalBell<W> {
    fn play(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }
}

/// Silent cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Muted;

impl AudioCue for Muted {
    fn play(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Play `cue`, swallowing any failure.
///
/// Returns whether playback succeeded, for diagnostics only.
pub fn play_best_effort(cue: &mut dyn AudioCue) -> bool {
    match cue.play() {
        Ok(()) => true,
        Err(err) => {
            crate::debug!(error = %err, "audio cue failed; ignored");
            let _ = err;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl AudioCue for Broken {
        fn play(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "no speaker"))
        }
    }

    #[test]
    fn bell_writes_bel() {
        let mut bell = TerminalBell::new(Vec::new());
        assert!(play_best_effort(&mut bell));
        assert!(play_best_effort(&mut bell));
        assert_eq!(bell.into_inner(), b"\x07\x07");
    }

    #[test]
    fn failures_are_swallowed() {
        assert!(!play_best_effort(&mut Broken));
    }

    #[test]
    fn muted_is_silent() {
        assert!(play_best_effort(&mut Muted));
    }
}
