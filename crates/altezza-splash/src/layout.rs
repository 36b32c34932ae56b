#![forbid(unsafe_code)]

//! Screen regions and hit-testing.
//!
//! Everything is derived from the terminal size and the logo's current bob
//! offset, so the view and the input router always agree on where things
//! are.
//!
//! # Invariants
//!
//! 1. Every rect is clipped to the terminal area (possibly empty).
//! 2. `logo_hit` covers the logo in both bob positions, so a press does not
//!    depend on the animation phase.

use std::f32::consts::PI;
use std::time::Duration;

use altezza_core::geometry::Rect;

/// Logo box width in cells.
pub const LOGO_WIDTH: u16 = 16;
/// Logo box height in cells.
pub const LOGO_HEIGHT: u16 = 7;
/// One full up-and-down cycle of the floating logo.
pub const BOB_PERIOD: Duration = Duration::from_secs(6);

const LAUNCHER_WIDTH: u16 = 7;
const LAUNCHER_HEIGHT: u16 = 3;
const TOOLTIP_WIDTH: u16 = 19;
const PANEL_WIDTH: u16 = 44;
const PANEL_HEIGHT: u16 = 20;
/// Bob headroom + logo + gap + headline + gap + brand.
const BLOCK_HEIGHT: u16 = 1 + LOGO_HEIGHT + 1 + 1 + 1 + 1;

/// Named screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Whole terminal.
    pub area: Rect,
    /// Logo box as drawn (bob applied).
    pub logo: Rect,
    /// Pressable region of the logo.
    pub logo_hit: Rect,
    /// Headline row.
    pub headline: Rect,
    /// Brand line row.
    pub brand: Rect,
    /// Assistant launcher button.
    pub launcher: Rect,
    /// "Don't go" bubble left of the launcher.
    pub tooltip: Rect,
    /// Chat panel above the launcher.
    pub panel: Rect,
    /// Close button in the panel header.
    pub panel_close: Rect,
    /// Message area.
    pub panel_body: Rect,
    /// Social link row at the bottom of the panel.
    pub panel_link: Rect,
}

impl Layout {
    /// Regions for a `width` x `height` terminal with the logo lifted by
    /// `bob` rows (0 or 1).
    #[must_use]
    pub fn compute(width: u16, height: u16, bob: u16) -> Self {
        let area = Rect::from_size(width, height);

        let top = height.saturating_sub(BLOCK_HEIGHT) / 2;
        let logo_w = LOGO_WIDTH.min(width);
        let logo_rest = Rect::new((width - logo_w) / 2, top + 1, logo_w, LOGO_HEIGHT).intersection(&area);
        let logo = logo_rest.offset_y(-(bob.min(1) as i16));
        let logo_hit = Rect::new(
            logo_rest.x,
            logo_rest.y.saturating_sub(1),
            logo_rest.width,
            logo_rest.height + 1,
        )
        .intersection(&area);

        let below = top + 1 + LOGO_HEIGHT;
        let headline = Rect::new(0, below + 1, width, 1).intersection(&area);
        let brand = Rect::new(0, below + 3, width, 1).intersection(&area);

        let launcher = Rect::new(
            width.saturating_sub(LAUNCHER_WIDTH + 2),
            height.saturating_sub(LAUNCHER_HEIGHT + 1),
            LAUNCHER_WIDTH,
            LAUNCHER_HEIGHT,
        )
        .intersection(&area);
        let tooltip = Rect::new(
            launcher.x.saturating_sub(TOOLTIP_WIDTH + 1),
            launcher.y,
            TOOLTIP_WIDTH.min(launcher.x.saturating_sub(1)),
            LAUNCHER_HEIGHT,
        )
        .intersection(&area);

        let panel_w = PANEL_WIDTH.min(width.saturating_sub(4));
        let panel_h = PANEL_HEIGHT.min(launcher.y.saturating_sub(2));
        let panel = Rect::new(
            width.saturating_sub(panel_w + 2),
            launcher.y.saturating_sub(panel_h + 1),
            panel_w,
            panel_h,
        )
        .intersection(&area);
        let panel_close = Rect::new(panel.right().saturating_sub(4), panel.y + 1, 3, 1).intersection(&panel);
        let panel_link = Rect::new(
            panel.x + 2,
            panel.bottom().saturating_sub(4),
            panel.width.saturating_sub(4),
            3,
        )
        .intersection(&panel);
        let body_top = panel.y + 4;
        let panel_body = Rect::new(
            panel.x + 2,
            body_top,
            panel.width.saturating_sub(4),
            panel_link.y.saturating_sub(body_top + 1),
        )
        .intersection(&panel);

        Self {
            area,
            logo,
            logo_hit,
            headline,
            brand,
            launcher,
            tooltip,
            panel,
            panel_close,
            panel_body,
            panel_link,
        }
    }
}

/// Rows the logo is lifted at `elapsed` since start: 1 around the top of
/// each [`BOB_PERIOD`] cycle, 0 otherwise.
#[must_use]
pub fn bob_rows(elapsed: Duration) -> u16 {
    let period = BOB_PERIOD.as_secs_f32();
    let phase = (elapsed.as_secs_f32() % period) / period;
    u16::from((PI * phase).sin() >= 0.5)
}
