//! Rendering primitives for CLI output.

use comfy_table::{Attribute, Cell, ContentArrangement, Table as ComfyTable};

use mileage_core::Notice;

use super::context::{OutputMode, UiContext};
use super::theme::{styled, styles, Badge};

/// Render a header line for a command.
///
/// Pretty mode: "Mileage · command (context)"
/// Plain mode: "mileage command"
pub fn header(ctx: &UiContext, command: &str, context: Option<&str>) -> String {
    match ctx.mode {
        OutputMode::Pretty => {
            let title = styled("Mileage", styles::bold(), ctx.color);
            match context {
                Some(c) => format!("{} \u{00B7} {} ({})", title, command, c),
                None => format!("{} \u{00B7} {}", title, command),
            }
        }
        OutputMode::Plain => format!("mileage {}", command),
        OutputMode::Json => String::new(),
    }
}

/// Render a badge with optional message.
pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let colored_badge = styled(kind.display(ctx.unicode), kind.style(), ctx.color);
    if message.is_empty() {
        colored_badge
    } else {
        format!("{} {}", colored_badge, message)
    }
}

/// Render a session notice.
///
/// Multi-line notices keep their paragraphs; continuation lines are indented
/// in pretty mode.
pub fn notice(ctx: &UiContext, notice: &Notice) -> String {
    let kind = Badge::from(notice.kind);
    if ctx.mode.is_pretty() {
        let mut lines = notice.text.lines();
        let first = lines.next().unwrap_or_default();
        let mut out = badge(ctx, kind, first);
        for line in lines {
            out.push('\n');
            if !line.is_empty() {
                out.push_str("    ");
                out.push_str(line);
            }
        }
        out
    } else {
        format!(
            "{}={}",
            notice.kind.as_str(),
            notice.text.replace("\n\n", " ").replace('\n', " ")
        )
    }
}

/// `Key: value` when pretty, `key=value` otherwise.
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        format!("{} {}", styled(&format!("{}:", key), styles::dim(), ctx.color), value)
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

pub fn hint(ctx: &UiContext, text: &str) -> String {
    kv(ctx, "Hint", text)
}

/// Borderless table. Plain mode drops the header and separates cells with tabs.
pub fn simple_table(ctx: &UiContext, headers: &[&str], rows: &[Vec<String>]) -> String {
    if !ctx.mode.is_pretty() {
        return rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = ComfyTable::new();
    table
        .load_preset(comfy_table::presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(u16::try_from(ctx.width).unwrap_or(u16::MAX))
        .set_header(headers.iter().map(|h| {
            let cell = Cell::new(h);
            if ctx.color {
                cell.add_attribute(Attribute::Dim)
            } else {
                cell
            }
        }));
    for column in table.column_iter_mut() {
        column.set_padding((0, 2));
    }
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Write to stdout; JSON mode and empty strings print nothing.
pub fn print(ctx: &UiContext, message: &str) {
    if !ctx.mode.is_json() && !message.is_empty() {
        println!("{}", message);
    }
}

pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let first = if ctx.mode.is_pretty() {
        badge(ctx, Badge::Err, message)
    } else {
        format!("error={}", message)
    };
    match error_hint {
        Some(h) => format!("{}\n{}", first, hint(ctx, h)),
        None => first,
    }
}

pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}
