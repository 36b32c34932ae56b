#![forbid(unsafe_code)]

//! Cell types: color, style flags, and the cell itself.

/// Opaque RGB color packed as `0xRRGGBB00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a color from channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8))
    }

    /// Create a color from a `0xRRGGBB` literal.
    #[inline]
    pub const fn hex(rgb: u32) -> Self {
        Self((rgb & 0x00FF_FFFF) << 8)
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Linear blend toward `other`; `t` is clamped to `[0.0, 1.0]`.
    #[must_use]
    pub fn mix(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| -> u8 {
            let v = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Self::new(
            lerp(self.r(), other.r()),
            lerp(self.g(), other.g()),
            lerp(self.b(), other.b()),
        )
    }
}

bitflags::bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD      = 0b0000_0001;
        /// Dim / decreased intensity.
        const DIM       = 0b0000_0010;
        /// Italic text.
        const ITALIC    = 0b0000_0100;
        /// Underlined text.
        const UNDERLINE = 0b0000_1000;
    }
}

/// Foreground, background, and attributes applied to written text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    /// Text color.
    pub fg: Rgb,
    /// Background color; `None` keeps the cell's current background.
    pub bg: Option<Rgb>,
    /// Attributes.
    pub flags: StyleFlags,
}

impl Style {
    /// Style with a foreground color only.
    #[must_use]
    pub const fn fg(fg: Rgb) -> Self {
        Self {
            fg,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    /// Replace the background.
    #[must_use]
    pub const fn on(mut self, bg: Rgb) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Add attributes.
    #[must_use]
    pub fn with(mut self, flags: StyleFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// Marker stored in the trailing cell of a double-width glyph.
pub const CONTINUATION: char = '\0';

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Glyph, or [`CONTINUATION`] after a wide glyph.
    pub ch: char,
    /// Foreground color.
    pub fg: Rgb,
    /// Background color.
    pub bg: Rgb,
    /// Attributes.
    pub flags: StyleFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgb::WHITE,
            bg: Rgb::BLACK,
            flags: StyleFlags::empty(),
        }
    }
}

impl Cell {
    /// Blank cell with the given background.
    #[must_use]
    pub const fn blank(bg: Rgb) -> Self {
        Self {
            ch: ' ',
            fg: Rgb::WHITE,
            bg,
            flags: StyleFlags::empty(),
        }
    }

    /// Whether this cell is the tail of a wide glyph.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.ch == CONTINUATION
    }
}
