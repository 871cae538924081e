//! Tonal statistics for a loaded image.
//!
//! One pass collects per-pixel luminance, the histogram, channel-average
//! brightness and the luminance extremes; a second pass over the cached
//! luminance plane computes the standard deviation and the Laplacian
//! sharpness estimate.
//!
//! Two means are kept apart on purpose: `brightness` averages `(R+G+B)/3`
//! while `contrast` is centred on the mean of weighted luminance. They differ
//! for coloured images and are not reconciled.

use serde::{Deserialize, Serialize};
use crate::buffer::{luminance, PixelBuffer, CHANNELS};

/// Histogram bin count (one per 8-bit luminance level).
pub const HISTOGRAM_BINS: usize = 256;

/// Display thresholds for [`Exposure`].
pub const DARK_BELOW: u8 = 85;
pub const BRIGHT_ABOVE: u8 = 170;

/// Statistics computed once per loaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Mean of per-pixel `(R+G+B)/3`, rounded.
    pub brightness: u8,
    /// Population standard deviation of luminance, rounded.
    pub contrast: u32,
    /// `round(max L) - round(min L)`.
    pub dynamic_range: u8,
    /// Mean squared discrete Laplacian over interior pixels, rounded.
    pub sharpness: u64,
    /// Count of pixels per rounded luminance level; always 256 entries.
    pub histogram: Vec<u64>,
}

/// Coarse exposure label shown next to the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    Dark,
    Good,
    Bright,
}

impl AnalysisResult {
    pub fn exposure(&self) -> Exposure {
        if self.brightness < DARK_BELOW {
            Exposure::Dark
        } else if self.brightness > BRIGHT_ABOVE {
            Exposure::Bright
        } else {
            Exposure::Good
        }
    }

    /// Total pixels counted by the histogram.
    pub fn pixel_count(&self) -> u64 {
        self.histogram.iter().sum()
    }
}

/// Compute brightness, contrast, dynamic range, sharpness and histogram.
///
/// Pure and deterministic. `PixelBuffer` construction already rejects empty
/// or mis-sized rasters, so every buffer reaching here is analysable.
pub fn analyze(buffer: &PixelBuffer) -> AnalysisResult {
    let (width, height) = buffer.dimensions();
    let pixel_count = buffer.pixel_count();

    let mut lum: Vec<f64> = Vec::with_capacity(pixel_count);
    let mut histogram = vec![0u64; HISTOGRAM_BINS];
    let mut channel_sum = 0.0f64;
    let mut lum_sum = 0.0f64;
    let mut min_l = f64::INFINITY;
    let mut max_l = f64::NEG_INFINITY;

    for px in buffer.pixels().chunks_exact(CHANNELS) {
        let l = luminance(px[0] as f64, px[1] as f64, px[2] as f64);

        histogram[level(l)] += 1;
        channel_sum += (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0;
        lum_sum += l;
        min_l = min_l.min(l);
        max_l = max_l.max(l);
        lum.push(l);
    }

    let n = pixel_count as f64;
    let brightness = (channel_sum / n).round().clamp(0.0, 255.0) as u8;
    let dynamic_range = (level(max_l) - level(min_l)) as u8;

    let mean_l = lum_sum / n;
    let variance = lum.iter().map(|&l| (l - mean_l) * (l - mean_l)).sum::<f64>() / n;
    let contrast = variance.sqrt().round() as u32;

    let sharpness = laplacian_energy(&lum, width as usize, height as usize);

    tracing::debug!(
        width,
        height,
        brightness,
        contrast,
        dynamic_range,
        sharpness,
        "Image analyzed"
    );

    AnalysisResult {
        brightness,
        contrast,
        dynamic_range,
        sharpness,
        histogram,
    }
}

/// Rounded luminance clamped into a histogram index.
fn level(l: f64) -> usize {
    l.round().clamp(0.0, 255.0) as usize
}

/// Mean of squared 4-neighbour Laplacian over interior pixels.
/// Rasters with no interior (either side < 3) score 0.
fn laplacian_energy(lum: &[f64], width: usize, height: usize) -> u64 {
    if width < 3 || height < 3 {
        return 0;
    }

    let mut sum = 0.0f64;
    let mut count = 0u64;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = y * width + x;
            let delta = (4.0 * lum[idx]
                - lum[idx - 1]
                - lum[idx + 1]
                - lum[idx - width]
                - lum[idx + width])
                .abs();
            sum += delta * delta;
            count += 1;
        }
    }

    (sum / count as f64).round() as u64
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_buffer(width: u32, height: u32, levels: &[u8]) -> PixelBuffer {
        let pixels = levels.iter().flat_map(|&v| [v, v, v, 255]).collect();
        PixelBuffer::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_black_image() {
        let buf = PixelBuffer::filled(4, 4, [0, 0, 0, 255]).unwrap();
        let result = analyze(&buf);
        assert_eq!(result.brightness, 0);
        assert_eq!(result.contrast, 0);
        assert_eq!(result.dynamic_range, 0);
        assert_eq!(result.sharpness, 0);
        assert_eq!(result.histogram[0], 16);
        assert_eq!(result.exposure(), Exposure::Dark);
    }

    #[test]
    fn test_histogram_sums_to_pixel_count() {
        let levels: Vec<u8> = (0..35u32).map(|i| (i * 7 % 256) as u8).collect();
        let buf = gray_buffer(7, 5, &levels);
        let result = analyze(&buf);
        assert_eq!(result.histogram.len(), HISTOGRAM_BINS);
        assert_eq!(result.pixel_count(), 35);
    }

    #[test]
    fn test_uniform_image_has_no_sharpness() {
        let buf = PixelBuffer::filled(10, 10, [90, 140, 60, 255]).unwrap();
        let result = analyze(&buf);
        assert_eq!(result.sharpness, 0);
        assert_eq!(result.contrast, 0);
    }

    #[test]
    fn test_single_interior_pixel_sharpness() {
        let levels = [100, 100, 100, 100, 200, 100, 100, 100, 100];
        let buf = gray_buffer(3, 3, &levels);
        let result = analyze(&buf);
        assert_eq!(result.sharpness, 160_000);
    }

    #[test]
    fn test_thin_images_have_zero_sharpness() {
        let buf = gray_buffer(2, 4, &[0, 255, 255, 0, 0, 255, 255, 0]);
        assert_eq!(analyze(&buf).sharpness, 0);

        let buf = gray_buffer(5, 1, &[0, 255, 0, 255, 0]);
        assert_eq!(analyze(&buf).sharpness, 0);
    }

    #[test]
    fn test_dynamic_range_and_contrast() {
        // Two levels: mean 100, every deviation 100.
        let buf = gray_buffer(2, 1, &[0, 200]);
        let result = analyze(&buf);
        assert_eq!(result.dynamic_range, 200);
        assert_eq!(result.contrast, 100);
        assert_eq!(result.histogram[0], 1);
        assert_eq!(result.histogram[200], 1);
    }

    #[test]
    fn test_brightness_uses_channel_average() {
        // Pure red: channel mean 85, luminance ~76.
        let buf = PixelBuffer::filled(2, 2, [255, 0, 0, 255]).unwrap();
        let result = analyze(&buf);
        assert_eq!(result.brightness, 85);
        assert_eq!(result.histogram[76], 4);
        assert_eq!(result.exposure(), Exposure::Good);
    }

    #[test]
    fn test_half_level_luminance_rounds_up() {
        // 0.299*4 + 0.587*40 + 0.114*16 = 26.5 exactly.
        let buf = PixelBuffer::filled(1, 1, [4, 40, 16, 255]).unwrap();
        let result = analyze(&buf);
        assert_eq!(result.histogram[27], 1);
        assert_eq!(result.histogram[26], 0);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let opaque = PixelBuffer::filled(3, 3, [200, 200, 200, 255]).unwrap();
        let clear = PixelBuffer::filled(3, 3, [200, 200, 200, 0]).unwrap();
        assert_eq!(analyze(&opaque), analyze(&clear));
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let levels: Vec<u8> = (0..64u32).map(|i| (i * 37 % 251) as u8).collect();
        let buf = gray_buffer(8, 8, &levels);
        assert_eq!(analyze(&buf), analyze(&buf));
    }

    #[test]
    fn test_exposure_labels() {
        let mut result = analyze(&PixelBuffer::filled(1, 1, [128, 128, 128, 255]).unwrap());
        assert_eq!(result.exposure(), Exposure::Good);
        result.brightness = 171;
        assert_eq!(result.exposure(), Exposure::Bright);
        result.brightness = 84;
        assert_eq!(result.exposure(), Exposure::Dark);
    }
}
