#![forbid(unsafe_code)]

//! Presenter: writes frames to the terminal.
//!
//! Only rows that differ from the previously presented frame are emitted.
//! Style changes are tracked so runs of equally styled cells share one set
//! of SGR sequences, and the whole frame is wrapped in a synchronized
//! update to avoid tearing on terminals that support it.

use std::io::{self, BufWriter, Write};

use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use crate::cell::{Cell, Rgb, StyleFlags};
use crate::frame::Frame;

const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: Rgb,
    bg: Rgb,
    flags: StyleFlags,
}

impl CellStyle {
    fn of(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            flags: cell.flags,
        }
    }
}

/// Frame writer with a one-frame memory.
#[derive(Debug)]
pub struct Presenter<W: Write> {
    out: BufWriter<W>,
    previous: Option<Frame>,
}

impl<W: Write> Presenter<W> {
    /// Presenter over `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::with_capacity(BUFFER_CAPACITY, out),
            previous: None,
        }
    }

    /// Forget the last frame so the next present redraws everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Emit `frame`, redrawing only changed rows. Returns the rows written.
    pub fn present(&mut self, frame: &Frame) -> io::Result<usize> {
        let full = self
            .previous
            .as_ref()
            .is_none_or(|prev| prev.width() != frame.width() || prev.height() != frame.height());

        queue!(self.out, terminal::BeginSynchronizedUpdate)?;
        if full {
            queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        }

        let mut written = 0;
        for y in 0..frame.height() {
            let changed = full
                || self
                    .previous
                    .as_ref()
                    .is_some_and(|prev| prev.row(y) != frame.row(y));
            if changed {
                self.write_row(frame, y)?;
                written += 1;
            }
        }

        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            terminal::EndSynchronizedUpdate
        )?;
        self.out.flush()?;
        self.previous = Some(frame.clone());
        Ok(written)
    }

    /// Consume the presenter and return the writer.
    pub fn into_inner(self) -> Result<W, io::IntoInnerError<BufWriter<W>>> {
        self.out.into_inner()
    }

    fn write_row(&mut self, frame: &Frame, y: u16) -> io::Result<()> {
        queue!(self.out, cursor::MoveTo(0, y))?;
        let mut current: Option<CellStyle> = None;
        for cell in frame.row(y) {
            if cell.is_continuation() {
                continue;
            }
            let style = CellStyle::of(cell);
            if current != Some(style) {
                self.apply(style)?;
                current = Some(style);
            }
            queue!(self.out, Print(cell.ch))?;
        }
        Ok(())
    }

    fn apply(&mut self, style: CellStyle) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(color(style.fg)),
            SetBackgroundColor(color(style.bg))
        )?;
        if style.flags.contains(StyleFlags::BOLD) {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.flags.contains(StyleFlags::DIM) {
            queue!(self.out, SetAttribute(Attribute::Dim))?;
        }
        if style.flags.contains(StyleFlags::ITALIC) {
            queue!(self.out, SetAttribute(Attribute::Italic))?;
        }
        if style.flags.contains(StyleFlags::UNDERLINE) {
            queue!(self.out, SetAttribute(Attribute::Underlined))?;
        }
        Ok(())
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r(),
        g: rgb.g(),
        b: rgb.b(),
    }
}
