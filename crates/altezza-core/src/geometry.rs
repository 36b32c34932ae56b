#![forbid(unsafe_code)]

//! Geometric primitives for layout and hit testing.

/// A rectangle in terminal cells (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Rect::default();
        }
        Rect::new(x, y, right - x, bottom - y)
    }

    /// A `width` x `height` rectangle centered inside `self`, clamped to fit.
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }

    /// Shrink by `margin` cells on every side.
    pub fn inset(&self, margin: u16) -> Rect {
        let doubled = margin.saturating_mul(2);
        Rect::new(
            self.x.saturating_add(margin),
            self.y.saturating_add(margin),
            self.width.saturating_sub(doubled),
            self.height.saturating_sub(doubled),
        )
    }

    /// Translate vertically, saturating at row 0.
    pub fn offset_y(&self, dy: i16) -> Rect {
        let y = if dy.is_negative() {
            self.y.saturating_sub(dy.unsigned_abs())
        } else {
            self.y.saturating_add(dy.unsigned_abs())
        };
        Rect { y, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(2, 3, 4, 2);
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 4));
        assert!(!r.contains(6, 4));
        assert!(!r.contains(5, 5));
        assert!(!r.contains(1, 3));
    }

    #[test]
    fn intersection_disjoint_is_empty() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(10, 10, 2, 2);
        assert!(a.intersection(&b).is_empty());
        assert_eq!(a.intersection(&Rect::new(2, 2, 4, 4)), Rect::new(2, 2, 2, 2));
    }

    #[test]
    fn centered_fits_and_clamps() {
        let area = Rect::from_size(80, 24);
        assert_eq!(area.centered(20, 10), Rect::new(30, 7, 20, 10));
        assert_eq!(area.centered(100, 30), area);
    }

    #[test]
    fn inset_saturates() {
        assert_eq!(Rect::new(1, 1, 10, 4).inset(1), Rect::new(2, 2, 8, 2));
        assert!(Rect::new(0, 0, 2, 2).inset(3).is_empty());
    }

    #[test]
    fn offset_y_saturates_at_zero() {
        assert_eq!(Rect::new(0, 1, 3, 3).offset_y(-2).y, 0);
        assert_eq!(Rect::new(0, 1, 3, 3).offset_y(2).y, 3);
    }
}
