//! Badges and text styles.

use owo_colors::{OwoColorize, Style};

use mileage_core::NoticeKind;

/// Badge types for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Ok,
    Warn,
    Err,
    Info,
}

impl Badge {
    /// Get badge with symbol for display.
    pub fn display(&self, unicode: bool) -> &'static str {
        match (self, unicode) {
            (Self::Ok, true) => "[\u{2713}]",
            (Self::Ok, false) => "[OK]",
            (Self::Warn, true) => "[\u{26A0}]",
            (Self::Warn, false) => "[WARN]",
            (Self::Err, true) => "[\u{2717}]",
            (Self::Err, false) => "[ERR]",
            (Self::Info, true) => "[\u{2139}]",
            (Self::Info, false) => "[INFO]",
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Self::Ok => styles::success(),
            Self::Warn => styles::warning(),
            Self::Err => styles::error(),
            Self::Info => styles::info(),
        }
    }
}

impl From<NoticeKind> for Badge {
    fn from(kind: NoticeKind) -> Self {
        match kind {
            NoticeKind::Success => Self::Ok,
            NoticeKind::Error => Self::Err,
            NoticeKind::Info => Self::Info,
        }
    }
}

pub mod styles {
    use owo_colors::Style;

    pub fn bold() -> Style {
        Style::new().bold()
    }

    pub fn dim() -> Style {
        Style::new().dimmed()
    }

    pub fn success() -> Style {
        Style::new().green()
    }

    pub fn warning() -> Style {
        Style::new().yellow()
    }

    pub fn error() -> Style {
        Style::new().red()
    }

    pub fn info() -> Style {
        Style::new().cyan()
    }
}

/// Apply `style` when color is enabled.
pub fn styled(text: &str, style: Style, color: bool) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_display_ascii() {
        assert_eq!(Badge::Ok.display(false), "[OK]");
        assert_eq!(Badge::Err.display(false), "[ERR]");
    }

    #[test]
    fn test_badge_display_unicode() {
        assert_eq!(Badge::Ok.display(true), "[\u{2713}]");
    }

    #[test]
    fn test_notice_kind_badges() {
        assert_eq!(Badge::from(NoticeKind::Success), Badge::Ok);
        assert_eq!(Badge::from(NoticeKind::Info), Badge::Info);
    }

    #[test]
    fn test_styled_without_color_is_plain() {
        assert_eq!(styled("x", styles::bold(), false), "x");
        assert_ne!(styled("x", styles::bold(), true), "x");
    }
}
