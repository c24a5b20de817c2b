//! Green-on-black television panel theme
//!
//! Color palette and style helpers for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Panel color palette
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // CORE PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Background: #000000
    pub const BACKGROUND: Color = Color::Rgb(0x00, 0x00, 0x00);

    /// Primary: #32cd32 (lime green, all regular text)
    pub const PRIMARY: Color = Color::Rgb(0x32, 0xcd, 0x32);

    /// Highlight: #90ee90 (light green, selection and hover)
    pub const HIGHLIGHT: Color = Color::Rgb(0x90, 0xee, 0x90);

    /// Panel: #4e4e4e (grey frame around the screen)
    pub const PANEL: Color = Color::Rgb(0x4e, 0x4e, 0x4e);

    /// Dim: #2e8b2e (muted green for hints)
    pub const DIM: Color = Color::Rgb(0x2e, 0x8b, 0x2e);

    /// Error: #ff4040
    pub const ERROR: Color = Color::Rgb(0xff, 0x40, 0x40);

    // ═══════════════════════════════════════════════════════════════════════
    // STYLE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Self::PRIMARY).bg(Self::BACKGROUND)
    }

    /// Selected list row
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected row drawn inverted
    pub fn highlighted() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Dimmed/muted text
    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    /// Title/header style
    pub fn title() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Frame around the whole screen
    pub fn panel() -> Style {
        Style::default().fg(Self::PANEL).bg(Self::BACKGROUND)
    }

    /// Normal/unfocused border
    pub fn border() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Focused border
    pub fn border_focused() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Progress bar style
    pub fn progress_bar() -> Style {
        Style::default().fg(Self::PRIMARY).bg(Self::PANEL)
    }

    /// Style for input fields
    pub fn input() -> Style {
        Style::default().fg(Self::PRIMARY).bg(Self::BACKGROUND)
    }

    /// Keybinding hint style
    pub fn keybind() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Status bar style
    pub fn status_bar() -> Style {
        Style::default().fg(Self::PRIMARY).bg(Self::PANEL)
    }

    /// Episode number column
    pub fn number() -> Style {
        Style::default().fg(Self::DIM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// WCAG relative luminance of an sRGB color
    fn relative_luminance((r, g, b): (u8, u8, u8)) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
    }

    /// 1.0 for identical colors up to 21.0 for black on white
    fn contrast_ratio(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> f64 {
        let (a, b) = (relative_luminance(fg), relative_luminance(bg));
        (a.max(b) + 0.05) / (a.min(b) + 0.05)
    }

    fn meets_wcag_aa(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> bool {
        contrast_ratio(fg, bg) >= 4.5
    }

    fn meets_wcag_aa_large(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> bool {
        contrast_ratio(fg, bg) >= 3.0
    }

    fn rgb(color: Color) -> (u8, u8, u8) {
        match color {
            Color::Rgb(r, g, b) => (r, g, b),
            other => panic!("{:?} is not an RGB color", other),
        }
    }

    #[test]
    fn test_all_colors_are_rgb() {
        for color in [
            Theme::BACKGROUND,
            Theme::PRIMARY,
            Theme::HIGHLIGHT,
            Theme::PANEL,
            Theme::DIM,
            Theme::ERROR,
        ] {
            rgb(color);
        }
    }

    #[test]
    fn test_palette_values() {
        assert_eq!(rgb(Theme::BACKGROUND), (0, 0, 0));
        assert_eq!(rgb(Theme::PRIMARY), (0x32, 0xcd, 0x32));
        assert_eq!(rgb(Theme::HIGHLIGHT), (0x90, 0xee, 0x90));
        assert_eq!(rgb(Theme::PANEL), (0x4e, 0x4e, 0x4e));
    }

    #[test]
    fn test_text_contrast_against_background() {
        let ratio = contrast_ratio(rgb(Theme::PRIMARY), rgb(Theme::BACKGROUND));
        assert!(
            meets_wcag_aa(rgb(Theme::PRIMARY), rgb(Theme::BACKGROUND)),
            "Text on background should meet WCAG AA (got {:.2}:1)",
            ratio
        );
    }

    #[test]
    fn test_inverted_highlight_contrast() {
        assert!(meets_wcag_aa(rgb(Theme::BACKGROUND), rgb(Theme::HIGHLIGHT)));
    }

    #[test]
    fn test_dim_and_error_readable() {
        let bg = rgb(Theme::BACKGROUND);
        assert!(meets_wcag_aa_large(rgb(Theme::DIM), bg));
        assert!(meets_wcag_aa_large(rgb(Theme::ERROR), bg));
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        let ratio = contrast_ratio((0, 0, 0), (255, 255, 255));
        assert!((ratio - 21.0).abs() < 0.1);
    }

    #[test]
    fn test_contrast_ratio_same_color() {
        let ratio = contrast_ratio((100, 100, 100), (100, 100, 100));
        assert!((ratio - 1.0).abs() < 0.001);
    }
}
