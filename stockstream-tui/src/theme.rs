//! Parrot/neon theme tokens for the StockStream TUI.
//!
//! # Color Palette
//! - **Background**: Near-black / deep charcoal (base layer)
//! - **Accent**: Electric cyan (primary highlights, focus)
//! - **Positive**: Neon green (gains, up candles)
//! - **Negative**: Hot pink (losses, down candles, errors)
//! - **Warning**: Neon orange (alerts, loading)
//! - **Neutral**: Cool purple (secondary info)
//! - **Muted**: Steel blue (disabled, secondary text)

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub const fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Green for gains, pink for losses.
    pub fn change_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    /// Distinct color for the n-th series on a chart.
    pub fn series_color(&self, index: usize) -> Color {
        let palette = [
            self.accent,
            self.positive,
            self.warning,
            self.neutral,
            self.negative,
            self.muted,
            self.text_primary,
        ];
        palette[index % palette.len()]
    }
}

pub const THEME: Theme = Theme::parrot_neon();

pub fn accent() -> Style {
    Style::default().fg(THEME.accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(THEME.muted)
}

pub fn neutral() -> Style {
    Style::default().fg(THEME.neutral)
}

pub fn warning() -> Style {
    Style::default().fg(THEME.warning)
}

pub fn negative() -> Style {
    Style::default().fg(THEME.negative)
}

pub fn positive() -> Style {
    Style::default().fg(THEME.positive)
}

pub fn text() -> Style {
    Style::default().fg(THEME.text_primary)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_creation() {
        let theme = Theme::default();
        assert_eq!(theme.background, Color::Rgb(18, 18, 20));
        assert_eq!(theme.accent, Color::Rgb(0, 255, 255));
    }

    #[test]
    fn change_color_sign() {
        let theme = Theme::default();
        assert_eq!(theme.change_color(0.02), theme.positive);
        assert_eq!(theme.change_color(-0.01), theme.negative);
        assert_eq!(theme.change_color(0.0), theme.positive);
    }

    #[test]
    fn series_colors_cycle() {
        let theme = Theme::default();
        assert_eq!(theme.series_color(0), theme.accent);
        assert_eq!(theme.series_color(7), theme.accent);
        assert_ne!(theme.series_color(0), theme.series_color(1));
    }
}
