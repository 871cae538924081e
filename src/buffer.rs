//! RGBA8 raster shared by every stage of the editor.
//!
//! A [`PixelBuffer`] can only be built through a validating constructor, so
//! every buffer in circulation satisfies `pixels.len() == width * height * 4`
//! with non-zero dimensions. Downstream code (analysis, pipeline) relies on
//! that and stays infallible.

use image::RgbaImage;
use crate::error::{EditorError, Result};

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Rec. 601 luma weights used for every luminance computation in the crate.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Weighted brightness of a pixel: `0.299R + 0.587G + 0.114B`.
#[inline]
pub fn luminance(r: f64, g: f64, b: f64) -> f64 {
    LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b
}

/// Owned width x height RGBA8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 bytes, rejecting empty or mis-sized buffers.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width < 1 || height < 1 {
            return Err(EditorError::InvalidBuffer(format!(
                "dimensions must be at least 1x1, got {}x{}",
                width, height
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                EditorError::InvalidBuffer(format!("{}x{} overflows the address space", width, height))
            })?;

        if pixels.len() != expected {
            return Err(EditorError::InvalidBuffer(format!(
                "expected {} bytes for {}x{} RGBA8, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }

        Ok(Self { width, height, pixels })
    }

    /// Buffer where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let count = (width as usize).saturating_mul(height as usize);
        let pixels = rgba.iter().copied().cycle().take(count.saturating_mul(CHANNELS)).collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels (not bytes).
    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / CHANNELS
    }

    /// Raw interleaved RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access stays crate-private so the length invariant cannot be broken.
    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.pixels[idx..idx + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Copy into an `image` crate buffer for encoding or display.
    pub fn to_rgba_image(&self) -> RgbaImage {
        // Length is validated at construction, so `from_raw` always succeeds.
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = EditorError;

    fn try_from(img: RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }
}

// ============================================================================
// TESTS
// ============================================================================
