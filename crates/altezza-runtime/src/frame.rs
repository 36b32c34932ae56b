#![forbid(unsafe_code)]

//! Frame: the cell grid `Model::view` draws into.
//!
//! Cells are stored row-major. Every write is clipped to the frame, and a
//! double-width glyph is written atomically (both cells or neither), with
//! [`CONTINUATION`] in its trailing cell.
//!
//! # Usage
//!
//! ```
//! use altezza_runtime::cell::{Rgb, Style};
//! use altezza_runtime::frame::Frame;
//!
//! let mut frame = Frame::new(20, 2);
//! let end = frame.put_str(1, 0, "Hola", Style::fg(Rgb::WHITE));
//! assert_eq!(end, 5);
//! assert_eq!(frame.row_text(0).trim_end(), " Hola");
//! ```

use altezza_core::geometry::Rect;
use unicode_width::UnicodeWidthChar;

use crate::cell::{CONTINUATION, Cell, Rgb, Style};

/// Render target for one pass of `Model::view`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    /// Create a frame of blank cells. Zero sizes are bumped to 1.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    /// Width in cells.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole frame as a rectangle.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells of row `y`; empty when out of bounds.
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = usize::from(y) * usize::from(self.width);
        &self.cells[start..start + usize::from(self.width)]
    }

    /// Cell at `(x, y)`.
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell at `(x, y)`.
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Overwrite one cell. Out-of-bounds writes are dropped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(slot) = self.get_mut(x, y) {
            *slot = cell;
        }
    }

    /// Reset every cell to a blank with background `bg`.
    pub fn clear(&mut self, bg: Rgb) {
        self.cells.fill(Cell::blank(bg));
    }

    /// Fill `rect` (clipped) with `cell`.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let rect = rect.intersection(&self.area());
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Paint the background of `rect` (clipped), keeping glyphs.
    pub fn paint_bg(&mut self, rect: Rect, bg: Rgb) {
        let rect = rect.intersection(&self.area());
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if let Some(cell) = self.get_mut(x, y) {
                    cell.bg = bg;
                }
            }
        }
    }

    /// Write `text` starting at `(x, y)`; returns the column after the last
    /// glyph written.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        self.put_str_clipped(x, y, text, style, self.width)
    }

    /// Like [`put_str`](Self::put_str) but never writes at or past `max_x`.
    ///
    /// Control characters and zero-width characters are skipped.
    pub fn put_str_clipped(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let max_x = max_x.min(self.width);
        let mut col = x;
        if y >= self.height {
            return col;
        }
        for ch in text.chars() {
            let w = match ch.width() {
                Some(w) if w > 0 => w as u16,
                _ => continue,
            };
            if col.saturating_add(w) > max_x {
                break;
            }
            self.put_glyph(col, y, ch, w, style);
            col += w;
        }
        col
    }

    /// Plain text of row `y`, one char per glyph (continuations dropped).
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .iter()
            .filter(|cell| !cell.is_continuation())
            .map(|cell| cell.ch)
            .collect()
    }

    /// Position of the first occurrence of `needle` within a single row.
    pub fn find_text(&self, needle: &str) -> Option<(u16, u16)> {
        if needle.is_empty() {
            return None;
        }
        for y in 0..self.height {
            let mut text = String::new();
            let mut columns = Vec::new();
            for (x, cell) in self.row(y).iter().enumerate() {
                if cell.is_continuation() {
                    continue;
                }
                columns.push((text.len(), x as u16));
                text.push(cell.ch);
            }
            if let Some(byte) = text.find(needle) {
                let x = columns
                    .iter()
                    .find(|(offset, _)| *offset == byte)
                    .map_or(0, |&(_, x)| x);
                return Some((x, y));
            }
        }
        None
    }

    /// Whether any row contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.find_text(needle).is_some()
    }

    /// Every row joined with newlines, trailing spaces trimmed.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y).trim_end().to_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn put_glyph(&mut self, x: u16, y: u16, ch: char, width: u16, style: Style) {
        for dx in 0..width {
            if let Some(cell) = self.get_mut(x + dx, y) {
                cell.ch = if dx == 0 { ch } else { CONTINUATION };
                cell.fg = style.fg;
                cell.flags = style.flags;
                if let Some(bg) = style.bg {
                    cell.bg = bg;
                }
            }
        }
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }
}
