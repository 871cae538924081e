//! Decode/encode boundary with the `image` crate.
//!
//! The editor core only ever sees [`PixelBuffer`]s. These helpers turn files
//! into buffers and buffers into downloadable PNG/JPEG bytes; the format and
//! quality are passed straight through to the encoder.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use crate::buffer::PixelBuffer;
use crate::error::{EditorError, Result};

/// Default JPEG quality (0-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg { quality: u8 },
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Decode an image file into an RGBA8 buffer.
pub fn decode_file(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path)
        .map_err(|e| EditorError::InvalidBuffer(format!("Failed to load {}: {}", path.display(), e)))?;
    let buffer = PixelBuffer::try_from(img.to_rgba8())?;
    tracing::info!(
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        "Image decoded"
    );
    Ok(buffer)
}

/// Encode a buffer to bytes. JPEG drops the alpha channel.
pub fn encode(buffer: &PixelBuffer, format: ExportFormat) -> Result<Vec<u8>> {
    let rgba = buffer.to_rgba_image();
    let mut out = Cursor::new(Vec::new());

    match format {
        ExportFormat::Png => {
            rgba.write_to(&mut out, image::ImageFormat::Png)?;
        }
        ExportFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
            encoder.encode_image(&rgb)?;
        }
    }

    Ok(out.into_inner())
}

/// Encode and write to `path`, creating parent directories as needed.
pub fn save(buffer: &PixelBuffer, path: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = encode(buffer, format)?;
    std::fs::write(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), format = format.extension(), "Image saved");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
