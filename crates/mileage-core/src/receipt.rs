//! Receipt image capture.
//!
//! The platform capability (camera, photo library, file picker) is detected
//! once when the session is built and handed in as an optional
//! [`ImageSource`]. Callers check [`ReceiptCapture::is_available`] before
//! offering the feature.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{MileageError, Result};

/// Message used when no capture capability was detected.
pub const CAPTURE_UNAVAILABLE: &str = "Camera feature is not available on this platform.";

/// Image container formats the exporter can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Detect the format from the file's magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        };
        f.write_str(name)
    }
}

/// A receipt image, held base64 encoded for embedding.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptImage {
    format: ImageFormat,
    data: String,
}

/// Check that `bytes` is an image the exporter can embed.
///
/// The magic bytes pick the format; the header must also yield non-zero
/// dimensions, which rules out truncated files.
fn validate(bytes: &[u8]) -> Result<ImageFormat> {
    let format = ImageFormat::detect(bytes).ok_or_else(|| {
        MileageError::Capture("unrecognized image format (use JPEG, PNG, GIF or BMP)".into())
    })?;
    let size = imagesize::blob_size(bytes)
        .map_err(|e| MileageError::Capture(format!("unreadable {} image: {}", format, e)))?;
    if size.width == 0 || size.height == 0 {
        return Err(MileageError::Capture(format!(
            "{} image has no dimensions",
            format
        )));
    }
    Ok(format)
}

impl ReceiptImage {
    /// Encode raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns `MileageError::Capture` if the bytes are not a recognized,
    /// readable image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format = validate(bytes)?;
        Ok(Self {
            format,
            data: STANDARD.encode(bytes),
        })
    }

    /// Wrap an already base64-encoded payload.
    pub fn from_base64(data: impl Into<String>) -> Result<Self> {
        let data = data.into();
        let bytes = STANDARD
            .decode(data.as_bytes())
            .map_err(|e| MileageError::Capture(format!("invalid base64 payload: {}", e)))?;
        let format = validate(&bytes)?;
        Ok(Self { format, data })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn as_base64(&self) -> &str {
        &self.data
    }

    /// Decode back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| MileageError::Capture(format!("invalid base64 payload: {}", e)))
    }

    /// Approximate decoded size in bytes.
    pub fn size_hint(&self) -> usize {
        self.data.len() / 4 * 3
    }

    /// `data:` URI for previews.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data)
    }
}

impl fmt::Debug for ReceiptImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptImage")
            .field("format", &self.format)
            .field("bytes", &self.size_hint())
            .finish()
    }
}

/// Where the platform should take the image from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureSource {
    /// Let the user choose between camera and gallery
    #[default]
    Prompt,
    Camera,
    Gallery,
}

/// Platform image acquisition capability.
pub trait ImageSource {
    /// Acquire raw image bytes.
    ///
    /// Returns `Ok(None)` when the user cancels. Returns
    /// `MileageError::CapabilityUnavailable` when the requested source does
    /// not exist on this device (e.g. no camera).
    fn acquire(&self, source: CaptureSource) -> Result<Option<Vec<u8>>>;
}

/// Receipt capture, backed by whatever capability was detected at startup.
pub struct ReceiptCapture {
    source: Option<Box<dyn ImageSource>>,
}

impl ReceiptCapture {
    /// Build from the detected capability, if any.
    pub fn new(source: Option<Box<dyn ImageSource>>) -> Self {
        if source.is_none() {
            info!("Receipt capture unavailable on this platform");
        }
        Self { source }
    }

    /// No capability present.
    pub fn unavailable() -> Self {
        Self { source: None }
    }

    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    /// Capture a receipt image.
    ///
    /// # Returns
    ///
    /// `Ok(Some(image))` on success, `Ok(None)` if the user cancelled.
    ///
    /// # Errors
    ///
    /// Returns `MileageError::CapabilityUnavailable` if no capability was
    /// detected, or `MileageError::Capture` if the bytes are not an image.
    pub fn capture(&self) -> Result<Option<ReceiptImage>> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| MileageError::CapabilityUnavailable(CAPTURE_UNAVAILABLE.to_string()))?;

        match source.acquire(CaptureSource::Prompt)? {
            Some(bytes) => {
                let image = ReceiptImage::from_bytes(&bytes)?;
                debug!("Captured {} receipt ({} bytes)", image.format(), bytes.len());
                Ok(Some(image))
            }
            None => Ok(None),
        }
    }
}

impl Default for ReceiptCapture {
    fn default() -> Self {
        Self::unavailable()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// JPEG magic bytes with nothing behind them.
    pub(crate) const TINY_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F'];

    /// A complete 1x1 RGB PNG.
    pub(crate) const ONE_PIXEL_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0xF8,
        0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00, 0xC9, 0xFE, 0x92, 0xEF, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    struct CannedSource(Option<Vec<u8>>);

    impl ImageSource for CannedSource {
        fn acquire(&self, _source: CaptureSource) -> Result<Option<Vec<u8>>> {
            Ok(self.0.clone())
        }
    }

    struct NoCamera;

    impl ImageSource for NoCamera {
        fn acquire(&self, _source: CaptureSource) -> Result<Option<Vec<u8>>> {
            Err(MileageError::CapabilityUnavailable(
                "No camera available or permission denied.".into(),
            ))
        }
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(TINY_JPEG), Some(ImageFormat::Jpeg));
        assert_eq!(
            ImageFormat::detect(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"hello"), None);
    }

    #[test]
    fn test_receipt_base64_round_trip() {
        let image = ReceiptImage::from_bytes(ONE_PIXEL_PNG).unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.decode().unwrap(), ONE_PIXEL_PNG);
        let again = ReceiptImage::from_base64(image.as_base64()).unwrap();
        assert_eq!(again, image);
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_truncated_image_is_rejected() {
        assert!(matches!(
            ReceiptImage::from_bytes(TINY_JPEG),
            Err(MileageError::Capture(_))
        ));
        assert!(matches!(
            ReceiptImage::from_bytes(&ONE_PIXEL_PNG[..12]),
            Err(MileageError::Capture(_))
        ));
        let encoded = STANDARD.encode(TINY_JPEG);
        assert!(matches!(
            ReceiptImage::from_base64(encoded),
            Err(MileageError::Capture(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_non_images() {
        assert!(matches!(
            ReceiptImage::from_bytes(b"not an image"),
            Err(MileageError::Capture(_))
        ));
    }

    #[test]
    fn test_capture_without_capability() {
        let capture = ReceiptCapture::unavailable();
        assert!(!capture.is_available());
        match capture.capture() {
            Err(MileageError::CapabilityUnavailable(message)) => {
                assert_eq!(message, CAPTURE_UNAVAILABLE)
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_capture_cancelled_is_none() {
        let capture = ReceiptCapture::new(Some(Box::new(CannedSource(None))));
        assert!(capture.capture().unwrap().is_none());
    }

    #[test]
    fn test_capture_encodes_image() {
        let capture = ReceiptCapture::new(Some(Box::new(CannedSource(Some(ONE_PIXEL_PNG.to_vec())))));
        let image = capture.capture().unwrap().unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
    }

    #[test]
    fn test_capture_propagates_missing_camera() {
        let capture = ReceiptCapture::new(Some(Box::new(NoCamera)));
        assert!(matches!(
            capture.capture(),
            Err(MileageError::CapabilityUnavailable(_))
        ));
    }
}
