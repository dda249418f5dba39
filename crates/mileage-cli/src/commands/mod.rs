//! Command handlers.

mod distance;
mod doctor;
mod script;
mod serve;
mod session;

use std::path::{Path, PathBuf};

use mileage_core::{EntryStore, ExportedFile, LedgerSession};

use crate::ui::{self, Badge, UiContext};

pub use distance::handle_distance;
pub use doctor::handle_doctor;
pub use serve::handle_serve;
pub use session::handle_session;

/// Print the session's current notice, errors to stderr.
fn print_notice<S: EntryStore>(ctx: &UiContext, session: &LedgerSession<S>) {
    if let Some(notice) = session.notice() {
        let line = ui::notice(ctx, notice);
        match notice.kind {
            mileage_core::NoticeKind::Error => eprintln!("{}", line),
            _ => ui::print(ctx, &line),
        }
    }
}

/// Write an exported workbook into `dir`, creating it if needed.
fn write_export(file: &ExportedFile, dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        anyhow::anyhow!("Failed to create export directory {}: {}", dir.display(), e)
    })?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    log::info!("Wrote {} ({} bytes)", path.display(), file.bytes.len());
    Ok(path)
}

/// [`write_export`] as a session save step.
fn save_export(file: &ExportedFile, dir: &Path) -> mileage_core::Result<PathBuf> {
    write_export(file, dir).map_err(|e| mileage_core::MileageError::Export(e.to_string()))
}

/// Print the outcome of a successful export.
fn print_export(ctx: &UiContext, file: &ExportedFile, path: &Path) {
    for warning in &file.warnings {
        eprintln!("{}", ui::badge(ctx, Badge::Warn, warning));
    }
    ui::print(ctx, &ui::kv(ctx, "File", &path.display().to_string()));
    ui::print(ctx, &ui::kv(ctx, "Rows", &file.rows.to_string()));
}
