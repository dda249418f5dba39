//! Receipt image acquisition for the terminal.
//!
//! A terminal has no camera, so "gallery" means picking an image file.

use std::path::Path;

use dialoguer::{Input, Select};
use log::debug;

use mileage_core::receipt::{CaptureSource, ImageSource};
use mileage_core::{MileageError, Result};

const NO_CAMERA: &str = "No camera available or permission denied.";

/// Prompts for an image file on the terminal.
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn acquire(&self, source: CaptureSource) -> Result<Option<Vec<u8>>> {
        let source = match source {
            CaptureSource::Prompt => {
                let choice = Select::new()
                    .with_prompt("Receipt photo")
                    .items(&["Choose an image file", "Take a photo"][..])
                    .default(0)
                    .interact_opt()
                    .map_err(|e| MileageError::Capture(e.to_string()))?;
                match choice {
                    Some(0) => CaptureSource::Gallery,
                    Some(_) => CaptureSource::Camera,
                    None => return Ok(None),
                }
            }
            other => other,
        };

        match source {
            CaptureSource::Camera => Err(MileageError::CapabilityUnavailable(NO_CAMERA.into())),
            _ => {
                let path: String = Input::new()
                    .with_prompt("Image path (empty to cancel)")
                    .allow_empty(true)
                    .interact_text()
                    .map_err(|e| MileageError::Capture(e.to_string()))?;
                if path.trim().is_empty() {
                    return Ok(None);
                }
                read_image(Path::new(path.trim())).map(Some)
            }
        }
    }
}

/// Read an image file from disk.
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    debug!("Reading receipt image {}", path.display());
    std::fs::read(path)
        .map_err(|e| MileageError::Capture(format!("cannot read {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_image_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_image(&dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, MileageError::Capture(_)));
    }

    #[test]
    fn test_camera_is_unavailable() {
        let err = FileImageSource.acquire(CaptureSource::Camera).unwrap_err();
        assert!(matches!(err, MileageError::CapabilityUnavailable(_)));
    }
}
