//! Per-pixel tone adjustment chain.
//!
//! Five transforms run in a fixed order on every pixel:
//!
//! 1. **Brightness** - constant offset of `brightness * 2.55`
//! 2. **Contrast** - classic `259(c+255) / 255(259-c)` factor around 128
//! 3. **Shadows / highlights** - offsets weighted by `(1-L/255)^2` and `(L/255)^2`
//! 4. **Saturation** - scale chroma around the pixel's luminance
//! 5. **Glow** - brighten pixels above mid-grey proportionally
//!
//! Each transform reads the output of the previous one and writes back an
//! 8-bit value, computed in `f64`, rounded half to even and clamped to
//! 0..=255. That is how a clamped RGBA8 working buffer stores each pass.
//! Alpha is never touched. A transform whose parameter is zero is skipped
//! entirely.
//!
//! The order is part of the contract: saturation and glow recompute luminance
//! from the tonally adjusted channels, so reordering changes the output.

use crate::buffer::{luminance, PixelBuffer, CHANNELS};
use crate::error::{EditorError, Result};
use crate::settings::{Parameter, Settings};

/// Slider units to 8-bit channel units.
const UNIT_SCALE: f64 = 2.55;
/// Strength of the glow boost at full mask and glow 100.
const GLOW_GAIN: f64 = 0.3;

/// Produce an adjusted copy of `source`. `source` is never modified.
pub fn apply(source: &PixelBuffer, settings: &Settings) -> PixelBuffer {
    let mut output = source.clone();
    process(output.pixels_mut(), settings);
    output
}

/// Adjust `source` into a caller-owned `output` of identical dimensions,
/// reusing its allocation.
pub fn apply_into(source: &PixelBuffer, settings: &Settings, output: &mut PixelBuffer) -> Result<()> {
    if source.dimensions() != output.dimensions() {
        return Err(EditorError::DimensionMismatch {
            expected: source.dimensions(),
            actual: output.dimensions(),
        });
    }
    output.pixels_mut().copy_from_slice(source.pixels());
    process(output.pixels_mut(), settings);
    Ok(())
}

fn process(pixels: &mut [u8], settings: &Settings) {
    let chain = Chain::new(settings);
    if chain.is_identity() {
        return;
    }
    for px in pixels.chunks_exact_mut(CHANNELS) {
        let mut rgb = [px[0] as f64, px[1] as f64, px[2] as f64];
        chain.apply(&mut rgb);
        px[0] = rgb[0] as u8;
        px[1] = rgb[1] as u8;
        px[2] = rgb[2] as u8;
    }
}

/// Per-call constants derived once from the settings. `None` means skip.
#[derive(Debug, Clone, Copy)]
struct Chain {
    brightness: Option<f64>,
    contrast: Option<f64>,
    shadows: Option<f64>,
    highlights: Option<f64>,
    saturation: Option<f64>,
    glow: Option<f64>,
}

impl Chain {
    fn new(settings: &Settings) -> Self {
        let nonzero = |p: Parameter| Some(settings.get(p)).filter(|&v| v != 0.0).map(f64::from);

        Self {
            brightness: nonzero(Parameter::Brightness).map(|b| b * UNIT_SCALE),
            contrast: nonzero(Parameter::Contrast).map(contrast_factor),
            shadows: nonzero(Parameter::Shadows).map(|s| s * UNIT_SCALE),
            highlights: nonzero(Parameter::Highlights).map(|h| h * UNIT_SCALE),
            saturation: nonzero(Parameter::Saturation).map(|s| 1.0 + s / 100.0),
            glow: nonzero(Parameter::Glow).map(|g| g / 100.0),
        }
    }

    fn is_identity(&self) -> bool {
        self.brightness.is_none()
            && self.contrast.is_none()
            && self.shadows.is_none()
            && self.highlights.is_none()
            && self.saturation.is_none()
            && self.glow.is_none()
    }

    fn apply(&self, rgb: &mut [f64; 3]) {
        if let Some(adjust) = self.brightness {
            map_channels(rgb, |c| c + adjust);
        }

        if let Some(factor) = self.contrast {
            map_channels(rgb, |c| factor * (c - 128.0) + 128.0);
        }

        if self.shadows.is_some() || self.highlights.is_some() {
            // Both masks come from the same luminance sample.
            let l = luminance(rgb[0], rgb[1], rgb[2]) / 255.0;
            if let Some(amount) = self.shadows {
                let mask = (1.0 - l) * (1.0 - l);
                map_channels(rgb, |c| c + amount * mask);
            }
            if let Some(amount) = self.highlights {
                let mask = l * l;
                map_channels(rgb, |c| c + amount * mask);
            }
        }

        if let Some(factor) = self.saturation {
            let l = luminance(rgb[0], rgb[1], rgb[2]);
            map_channels(rgb, |c| l + (c - l) * factor);
        }

        if let Some(strength) = self.glow {
            let l = luminance(rgb[0], rgb[1], rgb[2]);
            let mask = ((l - 128.0) / 127.0).max(0.0);
            let amount = mask * strength;
            if amount > 0.0 {
                map_channels(rgb, |c| c + c * amount * GLOW_GAIN);
            }
        }
    }
}

/// `259(c + 255) / (255(259 - c))`. With `c` clamped to [-100, 100] the
/// denominator stays in [159, 359] * 255.
fn contrast_factor(contrast: f64) -> f64 {
    259.0 * (contrast + 255.0) / (255.0 * (259.0 - contrast))
}

/// Apply `f` to R, G, B and store the result back as an 8-bit value.
#[inline]
fn map_channels(rgb: &mut [f64; 3], f: impl Fn(f64) -> f64) {
    for c in rgb.iter_mut() {
        *c = quantize(f(*c));
    }
}

#[inline]
fn quantize(v: f64) -> f64 {
    v.round_ties_even().clamp(0.0, 255.0)
}

// ============================================================================
// TESTS
// ============================================================================
