//! Terminal detection and output mode selection.

use std::io::IsTerminal;

/// How results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// JSON only
    Json,
    /// `key=value` lines, stable for scripts
    #[default]
    Plain,
    /// Colors, badges and tables
    Pretty,
}

impl OutputMode {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}

/// What the process found out about its terminal.
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
    pub stdout_tty: bool,
    pub stdin_tty: bool,
    pub dumb: bool,
    pub no_color_env: bool,
    pub columns: Option<usize>,
}

impl Terminal {
    pub fn probe() -> Self {
        Self {
            stdout_tty: std::io::stdout().is_terminal(),
            stdin_tty: std::io::stdin().is_terminal(),
            dumb: std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false),
            no_color_env: std::env::var_os("NO_COLOR").is_some(),
            columns: columns(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiContext {
    pub color: bool,
    pub unicode: bool,
    pub width: usize,
    pub mode: OutputMode,
    /// Whether prompts can be answered; stdin must be a terminal too.
    pub prompts: bool,
}

impl UiContext {
    pub fn from_env(json: bool, no_color: bool, ascii: bool) -> Self {
        Self::resolve(Terminal::probe(), json, no_color, ascii)
    }

    /// `--json` wins, then a dumb or redirected stdout means plain.
    pub fn resolve(term: Terminal, json: bool, no_color: bool, ascii: bool) -> Self {
        let mode = if json {
            OutputMode::Json
        } else if term.dumb || !term.stdout_tty {
            OutputMode::Plain
        } else {
            OutputMode::Pretty
        };

        Self {
            color: mode.is_pretty() && !no_color && !term.no_color_env,
            unicode: !ascii,
            width: term.columns.unwrap_or(80),
            mode,
            prompts: term.stdout_tty && term.stdin_tty,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.prompts
    }

    /// Spinners only on a pretty terminal.
    pub fn allows_animation(&self) -> bool {
        self.mode.is_pretty()
    }

    /// A colorless, ascii, 80-column context.
    #[cfg(test)]
    pub(crate) fn fixed(mode: OutputMode) -> Self {
        Self {
            color: false,
            unicode: false,
            width: 80,
            mode,
            prompts: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn plain() -> Self {
        Self::fixed(OutputMode::Plain)
    }
}

fn columns() -> Option<usize> {
    if let Some(width) = std::env::var("COLUMNS")
        .ok()
        .and_then(|cols| cols.trim().parse::<usize>().ok())
        .filter(|width| *width > 0)
    {
        return Some(width);
    }

    #[cfg(unix)]
    {
        let mut size = libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        // SAFETY: TIOCGWINSZ writes a winsize into the pointer we pass
        let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };
        if rc == 0 && size.ws_col > 0 {
            return Some(size.ws_col as usize);
        }
    }

    None
}
