#![forbid(unsafe_code)]

//! Color palettes for the two visual modes.

use altezza_core::vibrant::VisualMode;
use altezza_runtime::cell::Rgb;

/// Every color the view uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Page background.
    pub bg: Rgb,
    /// Spotlight color blended into the background near the pointer.
    pub spotlight: Rgb,
    /// Large slow-moving glow.
    pub glow: Rgb,
    /// Second glow (bottom right).
    pub glow_alt: Rgb,
    /// Brand accent.
    pub accent: Rgb,
    /// Softer accent for emphasis inside messages.
    pub accent_soft: Rgb,
    /// Headline text.
    pub text: Rgb,
    /// Secondary text.
    pub text_dim: Rgb,
    /// Tertiary text.
    pub text_faint: Rgb,
    /// Assistant panel background.
    pub panel_bg: Rgb,
    /// Panel and bubble borders.
    pub border: Rgb,
    /// Chat bubble background.
    pub bubble_bg: Rgb,
    /// Key cap background inside messages.
    pub keycap_bg: Rgb,
    /// "Online" indicator.
    pub online: Rgb,
    /// Grid overlay lines.
    pub grid: Rgb,
    /// Grid light color at full intensity.
    pub light: Rgb,
}

/// Warm default theme.
pub const DEFAULT: Palette = Palette {
    bg: Rgb::hex(0x050505),
    spotlight: Rgb::hex(0x2a1204),
    glow: Rgb::hex(0x1c0d05),
    glow_alt: Rgb::hex(0x0e0e0e),
    accent: Rgb::hex(0xeb5a14),
    accent_soft: Rgb::hex(0xfdba74),
    text: Rgb::hex(0xe5e5e5),
    text_dim: Rgb::hex(0x737373),
    text_faint: Rgb::hex(0x404040),
    panel_bg: Rgb::hex(0x161617),
    border: Rgb::hex(0x2e2e30),
    bubble_bg: Rgb::hex(0x1f1f21),
    keycap_bg: Rgb::hex(0x333336),
    online: Rgb::hex(0x4ade80),
    grid: Rgb::hex(0x050505),
    light: Rgb::hex(0x050505),
};

/// Cyan/fuchsia vibrant theme.
pub const VIBRANT: Palette = Palette {
    bg: Rgb::hex(0x050a10),
    spotlight: Rgb::hex(0x003a3f),
    glow: Rgb::hex(0x06323d),
    glow_alt: Rgb::hex(0x2e0a33),
    accent: Rgb::hex(0x22d3ee),
    accent_soft: Rgb::hex(0xa5f3fc),
    text: Rgb::hex(0xf0fdff),
    text_dim: Rgb::hex(0x7dd3fc),
    text_faint: Rgb::hex(0x1e4a5a),
    panel_bg: Rgb::hex(0x0b1620),
    border: Rgb::hex(0x164e63),
    bubble_bg: Rgb::hex(0x0f2230),
    keycap_bg: Rgb::hex(0x134e5e),
    online: Rgb::hex(0x4ade80),
    grid: Rgb::hex(0x0a2a33),
    light: Rgb::hex(0x67e8f9),
};

/// Palette for `mode`.
#[must_use]
pub const fn palette(mode: VisualMode) -> &'static Palette {
    match mode {
        VisualMode::Default => &DEFAULT,
        VisualMode::Vibrant => &VIBRANT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_have_distinct_backgrounds_and_accents() {
        assert_ne!(palette(VisualMode::Default).bg, palette(VisualMode::Vibrant).bg);
        assert_ne!(palette(VisualMode::Default).accent, palette(VisualMode::Vibrant).accent);
        assert_eq!(palette(VisualMode::Default).accent, Rgb::hex(0xeb5a14));
    }
}
