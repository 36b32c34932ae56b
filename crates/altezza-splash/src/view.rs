#![forbid(unsafe_code)]

//! Rendering of the splash into a cell frame.
//!
//! Pure functions of the model and the frame instant. Draw order is back to
//! front: background, logo, copy, launcher, tooltip, panel.

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use altezza_core::assistant::{Assistant, PanelState};
use altezza_core::background::AmbientBackground;
use altezza_core::geometry::Rect;
use altezza_core::press_hold::{PressHoldDetector, PressState};
use altezza_core::sequencer::{Span, Tone};
use altezza_runtime::{Cell, Frame, Rgb, Style, StyleFlags};
use unicode_width::UnicodeWidthStr;

use crate::app::SplashModel;
use crate::layout::Layout;
use crate::theme::{Palette, palette};

/// Main headline under the logo.
pub const HEADLINE: &str = "Reconstruyendo la experiencia";
/// Brand line under the headline.
pub const BRAND: &str = "ALTEZZA PICTURES";
/// Tooltip copy.
pub const TOOLTIP: &str = "¡No te vayas!";

const MARK: [&str; 3] = ["██▀   ▄██", "▀  ▄██▀ ▄", "██▀▀   ██"];
const SHINE_CYCLE: Duration = Duration::from_secs(8);
const SHINE_SWEEP: Duration = Duration::from_secs(3);

/// Draw the whole splash at `now`.
pub fn render(model: &SplashModel, frame: &mut Frame, now: Instant) {
    let palette = palette(model.mode());
    let layout = model.layout(now);
    let elapsed = now.saturating_duration_since(model.started());

    draw_background(frame, model.background(), palette, now, elapsed);
    draw_logo(frame, &layout, model.press(), palette, now, elapsed);
    put_centered(frame, layout.headline, HEADLINE, Style::fg(palette.text).with(StyleFlags::BOLD));
    put_centered(frame, layout.brand, BRAND, Style::fg(palette.text_dim));

    let assistant = model.assistant();
    draw_launcher(frame, &layout, assistant, palette, elapsed);
    if assistant.tooltip_visible() {
        draw_tooltip(frame, layout.tooltip, palette, elapsed);
    }
    if assistant.panel() == PanelState::Open {
        let hover = model.background().pointer().is_some_and(|(x, y)| layout.panel_link.contains(x, y));
        draw_panel(frame, &layout, assistant, palette, elapsed, hover);
    }
}

// ---------------------------------------------------------------------------
// Background
// ---------------------------------------------------------------------------

fn draw_background(frame: &mut Frame, background: &AmbientBackground, palette: &Palette, now: Instant, elapsed: Duration) {
    let (w, h) = (f32::from(frame.width()), f32::from(frame.height()));
    let drift = (elapsed.as_secs_f32() * TAU / 20.0).sin();
    let glow_a = (w * (0.25 + 0.05 * drift), h * 0.3);
    let glow_b = (w * (0.8 - 0.05 * drift), h * 0.75);
    let pointer = background.pointer().map(|(x, y)| (f32::from(x), f32::from(y)));
    let grid = background.grid_visible();

    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let mut bg = palette.bg;
            bg = bg.mix(palette.glow, 0.7 * falloff(x, y, glow_a, h * 0.6));
            bg = bg.mix(palette.glow_alt, 0.6 * falloff(x, y, glow_b, h * 0.5));
            if let Some(center) = pointer {
                bg = bg.mix(palette.spotlight, 0.8 * falloff(x, y, center, 8.0));
            }
            let mut cell = Cell::blank(bg);
            if grid && let Some(ch) = grid_glyph(x, y) {
                cell.ch = ch;
                cell.fg = palette.grid;
            }
            frame.set(x, y, cell);
        }
    }

    if !grid {
        return;
    }
    let age = background.field_age(now);
    for light in background.lights() {
        let level = light.intensity(age);
        if level <= 0.05 {
            continue;
        }
        let x = (u32::from(light.left_pct) * u32::from(frame.width()) / 100) as u16;
        let y = (u32::from(light.top_pct) * u32::from(frame.height()) / 100) as u16;
        for (dx, weight) in [(-1i32, 0.3), (1, 0.3)] {
            if let Ok(nx) = u16::try_from(i32::from(x) + dx)
                && let Some(cell) = frame.get_mut(nx, y)
            {
                cell.bg = cell.bg.mix(palette.light, level * weight);
            }
        }
        if let Some(cell) = frame.get_mut(x, y) {
            cell.ch = '●';
            cell.fg = cell.bg.mix(palette.light, level / 0.8);
        }
    }
}

/// Quadratic falloff in `[0, 1]` around `center`; columns count half since
/// cells are about twice as tall as wide.
fn falloff(x: u16, y: u16, center: (f32, f32), radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    let dx = (f32::from(x) - center.0) / 2.0;
    let dy = f32::from(y) - center.1;
    let d = (dx * dx + dy * dy).sqrt() / radius;
    (1.0 - d).clamp(0.0, 1.0).powi(2)
}

fn grid_glyph(x: u16, y: u16) -> Option<char> {
    match (x % 8 == 0, y % 4 == 0) {
        (true, true) => Some('┼'),
        (true, false) => Some('│'),
        (false, true) => Some('─'),
        (false, false) => None,
    }
}

// ---------------------------------------------------------------------------
// Logo and copy
// ---------------------------------------------------------------------------

fn draw_logo(frame: &mut Frame, layout: &Layout, press: &PressHoldDetector, palette: &Palette, now: Instant, elapsed: Duration) {
    let rect = layout.logo;
    if rect.is_empty() {
        return;
    }
    let state = press.state();
    let progress = press.charge_progress(now);
    let (bg, border, mark) = match state {
        PressState::Idle => (palette.bg.mix(Rgb::WHITE, 0.06), palette.border, palette.accent),
        PressState::Charging => (
            palette.bg.mix(Rgb::WHITE, 0.06 + 0.12 * progress),
            palette.border,
            palette.accent.mix(Rgb::WHITE, 0.3 * progress),
        ),
        PressState::Completed => (palette.bg.mix(palette.accent, 0.35), palette.accent_soft, palette.accent_soft),
    };

    draw_box(frame, rect, bg, border);
    let inner = rect.inset(1);
    if state == PressState::Idle {
        draw_shine(frame, inner, bg, elapsed);
    }

    let mark_w = MARK[0].width() as u16;
    let x0 = inner.x + inner.width.saturating_sub(mark_w) / 2;
    let y0 = inner.y + inner.height.saturating_sub(MARK.len() as u16) / 2;
    let style = Style::fg(mark).with(StyleFlags::BOLD);
    for (row, line) in MARK.iter().enumerate() {
        let y = y0 + row as u16;
        if y < inner.bottom() {
            frame.put_str_clipped(x0, y, line, style, inner.right());
        }
    }

    if state == PressState::Charging {
        draw_ring(frame, rect, progress, palette.accent);
    }
}

/// Diagonal-ish highlight sweeping across the logo every few seconds.
fn draw_shine(frame: &mut Frame, inner: Rect, bg: Rgb, elapsed: Duration) {
    let t = elapsed.as_secs_f32() % SHINE_CYCLE.as_secs_f32();
    let sweep = SHINE_SWEEP.as_secs_f32();
    if t >= sweep || inner.is_empty() {
        return;
    }
    let travel = f32::from(inner.width) + 4.0;
    let col = i32::from(inner.x) + (t / sweep * travel) as i32 - 2;
    for y in inner.y..inner.bottom() {
        let x = col + i32::from(y - inner.y) / 2;
        for dx in 0..2 {
            if let Ok(x) = u16::try_from(x + dx)
                && inner.contains(x, y)
                && let Some(cell) = frame.get_mut(x, y)
            {
                cell.bg = bg.mix(Rgb::WHITE, 0.1);
            }
        }
    }
}

fn put_centered(frame: &mut Frame, row: Rect, text: &str, style: Style) {
    if row.is_empty() {
        return;
    }
    let width = text.width() as u16;
    let x = row.x + row.width.saturating_sub(width) / 2;
    frame.put_str_clipped(x, row.y, text, style, row.right());
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

fn draw_launcher(frame: &mut Frame, layout: &Layout, assistant: &Assistant, palette: &Palette, elapsed: Duration) {
    let rect = layout.launcher;
    if rect.is_empty() {
        return;
    }
    let open = assistant.panel() == PanelState::Open;
    if open {
        draw_box(frame, rect, palette.panel_bg, palette.border);
    } else {
        draw_box(frame, rect, palette.accent, palette.accent_soft);
    }
    let glyph = if open { "×" } else { "✦" };
    let style = if open {
        Style::fg(palette.text)
    } else {
        Style::fg(Rgb::WHITE).with(StyleFlags::BOLD)
    };
    put_centered(frame, Rect::new(rect.x, rect.y + rect.height / 2, rect.width, 1), glyph, style);

    if assistant.show_notification_dot() {
        let dot = palette.online.mix(palette.bg, 0.4 * pulse(elapsed, 2.0));
        frame.put_str(rect.right().saturating_sub(1), rect.y, "●", Style::fg(dot));
    }
}

fn draw_tooltip(frame: &mut Frame, rect: Rect, palette: &Palette, elapsed: Duration) {
    if rect.is_empty() {
        return;
    }
    draw_box(frame, rect, palette.bubble_bg, palette.border);
    let y = rect.y + rect.height / 2;
    let dot = palette.accent.mix(palette.bubble_bg, 0.5 * pulse(elapsed, 1.5));
    let x = frame.put_str_clipped(rect.x + 2, y, "● ", Style::fg(dot), rect.right().saturating_sub(1));
    frame.put_str_clipped(x, y, TOOLTIP, Style::fg(palette.text), rect.right().saturating_sub(1));
}

fn draw_panel(frame: &mut Frame, layout: &Layout, assistant: &Assistant, palette: &Palette, elapsed: Duration, hover: bool) {
    let panel = layout.panel;
    if panel.height < 3 || panel.width < 6 {
        return;
    }
    draw_box(frame, panel, palette.panel_bg, palette.border);
    frame.paint_bg(
        Rect::new(panel.right().saturating_sub(10), panel.y + 1, 8, 2).intersection(&panel.inset(1)),
        palette.panel_bg.mix(palette.accent, 0.08),
    );

    let max_x = panel.right().saturating_sub(1);
    let header = panel.y + 1;
    let x = frame.put_str_clipped(panel.x + 2, header, "◉ ", Style::fg(palette.accent), max_x);
    frame.put_str_clipped(x, header, "Asistente", Style::fg(palette.text).with(StyleFlags::BOLD), max_x);
    let online = palette.online.mix(palette.panel_bg, 0.4 * pulse(elapsed, 2.0));
    let x = frame.put_str_clipped(panel.x + 4, header + 1, "● ", Style::fg(online), max_x);
    frame.put_str_clipped(x, header + 1, "ONLINE", Style::fg(palette.online), max_x);
    if !layout.panel_close.is_empty() {
        frame.put_str(layout.panel_close.x + 1, layout.panel_close.y, "×", Style::fg(palette.text_dim));
    }

    draw_messages(frame, layout.panel_body, assistant, palette, elapsed);
    draw_link(frame, layout.panel_link, palette, hover);
}

enum BodyRow {
    Line(Vec<Run>),
    Gap,
    Typing,
}

fn draw_messages(frame: &mut Frame, body: Rect, assistant: &Assistant, palette: &Palette, elapsed: Duration) {
    if body.is_empty() {
        return;
    }
    let inner_width = body.width.saturating_sub(2);
    let mut rows = Vec::new();
    for message in assistant.visible_messages() {
        if !rows.is_empty() {
            rows.push(BodyRow::Gap);
        }
        rows.extend(wrap_spans(message.content, inner_width).into_iter().map(BodyRow::Line));
    }
    if assistant.sequencer().is_typing() {
        if !rows.is_empty() {
            rows.push(BodyRow::Gap);
        }
        rows.push(BodyRow::Typing);
    }

    // Newest content stays in view.
    let skip = rows.len().saturating_sub(usize::from(body.height));
    for (offset, row) in rows.iter().skip(skip).enumerate() {
        let y = body.y + offset as u16;
        match row {
            BodyRow::Line(runs) => {
                frame.paint_bg(Rect::new(body.x, y, body.width, 1), palette.bubble_bg);
                let mut x = body.x + 1;
                for run in runs {
                    x = frame.put_str_clipped(x, y, &run.text, tone_style(run.tone, palette), body.right().saturating_sub(1));
                }
            }
            BodyRow::Gap => {}
            BodyRow::Typing => {
                let lit = (elapsed.as_millis() / 200 % 3) as usize;
                for i in 0..3 {
                    let fg = if i == lit { palette.text_dim } else { palette.text_faint };
                    frame.put_str(body.x + 1 + 2 * i as u16, y, "•", Style::fg(fg));
                }
            }
        }
    }
}

fn draw_link(frame: &mut Frame, rect: Rect, palette: &Palette, hover: bool) {
    if rect.is_empty() {
        return;
    }
    let bg = if hover {
        palette.bubble_bg.mix(Rgb::WHITE, 0.08)
    } else {
        palette.bubble_bg
    };
    frame.fill(rect, Cell::blank(bg));
    let y = rect.y + rect.height / 2;
    let max_x = rect.right().saturating_sub(1);
    let x = frame.put_str_clipped(rect.x + 1, y, "◎ ", Style::fg(palette.accent), max_x);
    let x = frame.put_str_clipped(x, y, "Síguenos ", Style::fg(palette.text).with(StyleFlags::BOLD), max_x);
    frame.put_str_clipped(x, y, "@altezzagroup", Style::fg(palette.text_dim), max_x);
    let hint = if hover { "l →" } else { "l ›" };
    let hint_x = rect.right().saturating_sub(hint.width() as u16 + 1);
    if hint_x > x {
        frame.put_str_clipped(hint_x, y, hint, Style::fg(palette.text_faint), rect.right());
    }
}

fn tone_style(tone: Tone, palette: &Palette) -> Style {
    match tone {
        Tone::Plain => Style::fg(palette.text),
        Tone::Strong => Style::fg(Rgb::WHITE).with(StyleFlags::BOLD),
        Tone::Accent => Style::fg(palette.accent_soft),
        Tone::KeyCap => Style::fg(Rgb::WHITE).on(palette.keycap_bg).with(StyleFlags::BOLD),
    }
}

// ---------------------------------------------------------------------------
// Text wrapping
// ---------------------------------------------------------------------------

/// A styled run inside one wrapped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Text of the run.
    pub text: String,
    /// Tone it was written in.
    pub tone: Tone,
}

/// Greedy word wrap of styled spans to `width` columns.
///
/// `\n` forces a break, whitespace at the start of a wrapped line is
/// dropped, key caps never break, and words wider than a line are split by
/// character.
#[must_use]
pub fn wrap_spans(spans: &[Span], width: u16) -> Vec<Vec<Run>> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    let mut line: Vec<Run> = Vec::new();
    let mut col = 0usize;

    for span in spans {
        for (i, segment) in span.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(std::mem::take(&mut line));
                col = 0;
            }
            let tokens = if span.tone == Tone::KeyCap {
                vec![segment]
            } else {
                split_words(segment)
            };
            for token in tokens {
                let w = token.width();
                if w == 0 {
                    continue;
                }
                let blank = token.trim().is_empty();
                if col > 0 && col + w > width {
                    lines.push(std::mem::take(&mut line));
                    col = 0;
                }
                if blank && col == 0 && !lines.is_empty() {
                    continue;
                }
                if w <= width {
                    push_run(&mut line, token, span.tone);
                    col += w;
                    continue;
                }
                for ch in token.chars() {
                    let cw = ch.to_string().width();
                    if col > 0 && col + cw > width {
                        lines.push(std::mem::take(&mut line));
                        col = 0;
                    }
                    push_run(&mut line, &ch.to_string(), span.tone);
                    col += cw;
                }
            }
        }
    }
    lines.push(line);
    lines
}

/// Alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev: Option<bool> = None;
    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if prev.is_some_and(|p| p != space) {
            tokens.push(&text[start..i]);
            start = i;
        }
        prev = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

fn push_run(line: &mut Vec<Run>, text: &str, tone: Tone) {
    if let Some(last) = line.last_mut()
        && last.tone == tone
    {
        last.text.push_str(text);
        return;
    }
    line.push(Run {
        text: text.to_owned(),
        tone,
    });
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Fill `rect` with `bg` and draw a rounded border in `border`.
fn draw_box(frame: &mut Frame, rect: Rect, bg: Rgb, border: Rgb) {
    frame.fill(rect, Cell::blank(bg));
    for (x, y) in perimeter(rect) {
        frame.set(
            x,
            y,
            Cell {
                ch: border_glyph(rect, x, y),
                fg: border,
                bg,
                flags: StyleFlags::empty(),
            },
        );
    }
}

/// Recolor the first `progress` fraction of the border, clockwise from the
/// top-left corner.
fn draw_ring(frame: &mut Frame, rect: Rect, progress: f32, lit: Rgb) {
    let cells = perimeter(rect);
    let count = (progress.clamp(0.0, 1.0) * cells.len() as f32).round() as usize;
    for &(x, y) in cells.iter().take(count) {
        if let Some(cell) = frame.get_mut(x, y) {
            cell.fg = lit;
            cell.flags |= StyleFlags::BOLD;
        }
    }
}

/// Border cells of `rect`, clockwise from the top-left corner.
fn perimeter(rect: Rect) -> Vec<(u16, u16)> {
    if rect.is_empty() {
        return Vec::new();
    }
    let right = rect.right() - 1;
    let bottom = rect.bottom() - 1;
    let mut cells = Vec::new();
    cells.extend((rect.x..=right).map(|x| (x, rect.y)));
    cells.extend((rect.y + 1..=bottom).map(|y| (right, y)));
    if bottom > rect.y {
        cells.extend((rect.x..right).rev().map(|x| (x, bottom)));
    }
    if right > rect.x {
        cells.extend((rect.y + 1..bottom).rev().map(|y| (rect.x, y)));
    }
    cells
}

fn border_glyph(rect: Rect, x: u16, y: u16) -> char {
    let left = x == rect.x;
    let right = x + 1 == rect.right();
    let top = y == rect.y;
    let bottom = y + 1 == rect.bottom();
    match (left, right, top, bottom) {
        (true, _, true, _) => '╭',
        (_, true, true, _) => '╮',
        (true, _, _, true) => '╰',
        (_, true, _, true) => '╯',
        (_, _, true, _) | (_, _, _, true) => '─',
        _ => '│',
    }
}

/// Smooth 0..1..0 pulse with the given period in seconds.
fn pulse(elapsed: Duration, period: f32) -> f32 {
    0.5 - 0.5 * (elapsed.as_secs_f32() * TAU / period).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use altezza_core::sequencer::SCRIPT;

    fn text(line: &[Run]) -> String {
        line.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn wrap_respects_width_and_hard_breaks() {
        for width in [8u16, 20, 36] {
            for message in &SCRIPT {
                for line in wrap_spans(message.content, width) {
                    assert!(text(&line).width() <= usize::from(width), "{width}: {:?}", text(&line));
                }
            }
        }
        let lines = wrap_spans(&[Span::plain("uno\n\ndos")], 20);
        let texts: Vec<_> = lines.iter().map(|l| text(l)).collect();
        assert_eq!(texts, vec!["uno", "", "dos"]);
    }

    #[test]
    fn wrap_keeps_key_caps_whole_and_merges_runs() {
        let spans = [
            Span::plain("Presiona "),
            Span::toned("Ctrl + Shift + R", Tone::KeyCap),
            Span::plain(" ya"),
        ];
        let lines = wrap_spans(&spans, 20);
        assert_eq!(text(&lines[0]), "Presiona ");
        assert_eq!(
            lines[1][0],
            Run {
                text: "Ctrl + Shift + R".to_owned(),
                tone: Tone::KeyCap
            }
        );
        assert_eq!(text(&lines[1]), "Ctrl + Shift + R ya");

        let merged = wrap_spans(&[Span::plain("a b c")], 20);
        assert_eq!(merged[0].len(), 1);
    }

    #[test]
    fn wrap_drops_leading_space_and_splits_long_words() {
        let lines = wrap_spans(&[Span::plain("abcd efgh")], 4);
        let texts: Vec<_> = lines.iter().map(|l| text(l)).collect();
        assert_eq!(texts, vec!["abcd", "efgh"]);

        let lines = wrap_spans(&[Span::plain("abcdefghij")], 4);
        let texts: Vec<_> = lines.iter().map(|l| text(l)).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn perimeter_is_clockwise_without_duplicates() {
        let rect = Rect::new(2, 1, 4, 3);
        let cells = perimeter(rect);
        assert_eq!(cells.len(), 10);
        assert_eq!(cells[0], (2, 1));
        assert_eq!(cells[3], (5, 1));
        assert_eq!(cells[5], (5, 3));
        assert_eq!(cells[9], (2, 2));
        let mut sorted = cells.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), cells.len());

        assert_eq!(perimeter(Rect::new(0, 0, 1, 1)), vec![(0, 0)]);
        assert!(perimeter(Rect::default()).is_empty());
    }

    #[test]
    fn box_corners() {
        let mut frame = Frame::new(6, 4);
        draw_box(&mut frame, Rect::new(0, 0, 6, 4), Rgb::BLACK, Rgb::WHITE);
        assert_eq!(frame.row_text(0), "╭────╮");
        assert_eq!(frame.row_text(1), "│    │");
        assert_eq!(frame.row_text(3), "╰────╯");
    }

    #[test]
    fn ring_lights_a_fraction_of_the_border() {
        let mut frame = Frame::new(6, 4);
        let rect = Rect::new(0, 0, 6, 4);
        draw_box(&mut frame, rect, Rgb::BLACK, Rgb::WHITE);
        draw_ring(&mut frame, rect, 0.5, Rgb::hex(0xeb5a14));
        let lit = perimeter(rect)
            .into_iter()
            .filter(|&(x, y)| frame.get(x, y).is_some_and(|c| c.fg == Rgb::hex(0xeb5a14)))
            .count();
        assert_eq!(lit, 8);
    }

    #[test]
    fn pulse_and_falloff_ranges() {
        assert!(pulse(Duration::ZERO, 2.0).abs() < 1e-6);
        assert!((pulse(Duration::from_secs(1), 2.0) - 1.0).abs() < 1e-6);
        assert!((falloff(10, 5, (10.0, 5.0), 4.0) - 1.0).abs() < 1e-6);
        assert_eq!(falloff(40, 5, (10.0, 5.0), 4.0), 0.0);
    }
}
