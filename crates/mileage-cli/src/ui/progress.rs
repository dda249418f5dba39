//! Progress indicators for network calls.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::context::UiContext;

/// A spinner for indeterminate progress.
///
/// Draws only when animation is allowed; otherwise it is silent so scripted
/// output stays stable.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(ctx: &UiContext, message: &str) -> Self {
        if !ctx.allows_animation() {
            return Self { bar: None };
        }

        let frames: &[&str] = if ctx.unicode {
            &[
                "\u{280B}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283C}", "\u{2834}",
                "\u{2826}", "\u{2827}", "\u{2807}", "\u{280F}", " ",
            ]
        } else {
            &["|", "/", "-", "\\", " "]
        };
        let style = ProgressStyle::with_template("{spinner} {msg}...")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(frames);

        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }

    /// Remove the spinner line.
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
