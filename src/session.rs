//! Edit session: one loaded image, its settings, and the derived result.
//!
//! A session is either `Empty` or `Loaded`. Loading computes the analysis and
//! suggestions once and keeps the decoded buffer as the immutable original.
//! Every settings change re-runs the whole pipeline from that original and
//! publishes the result by swapping an `Arc`, so a reader holding the previous
//! buffer keeps a complete image and never observes a half-written one.
//!
//! Sessions are plain values owned by the caller; any number can coexist.

use std::sync::Arc;
use std::time::Instant;
use crate::analyzer::{analyze, AnalysisResult};
use crate::buffer::PixelBuffer;
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::pipeline;
use crate::presets::{Preset, PresetLibrary};
use crate::settings::{Parameter, Settings};
use crate::suggestions::{self, Suggestion};

#[derive(Debug)]
struct LoadedImage {
    original: Arc<PixelBuffer>,
    current: Arc<PixelBuffer>,
    settings: Settings,
    analysis: AnalysisResult,
    suggestions: Vec<Suggestion>,
    /// Recomputes since load.
    revision: u64,
}

impl LoadedImage {
    fn new(buffer: PixelBuffer) -> Self {
        let analysis = analyze(&buffer);
        let suggestions = suggestions::suggest(&analysis);
        let original = Arc::new(buffer);
        Self {
            current: Arc::clone(&original),
            original,
            settings: Settings::default(),
            analysis,
            suggestions,
            revision: 0,
        }
    }

    fn recompute(&mut self) -> Arc<PixelBuffer> {
        let started = Instant::now();
        let next = if self.settings.is_default() {
            Arc::clone(&self.original)
        } else {
            Arc::new(pipeline::apply(&self.original, &self.settings))
        };
        self.current = next;
        self.revision += 1;
        tracing::debug!(
            revision = self.revision,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Recomputed current buffer"
        );
        Arc::clone(&self.current)
    }
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Empty,
    Loaded(Box<LoadedImage>),
}

#[derive(Debug, Default)]
pub struct EditSession {
    presets: PresetLibrary,
    state: SessionState,
}

impl EditSession {
    /// Empty session with the built-in presets.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets(presets: PresetLibrary) -> Self {
        Self {
            presets,
            state: SessionState::Empty,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::with_presets(config.preset_library())
    }

    /// Empty session with `buffer` already loaded.
    pub fn open(buffer: PixelBuffer) -> Self {
        let mut session = Self::new();
        session.load(buffer);
        session
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Take ownership of `buffer` as the new original, discarding any
    /// previous image and settings.
    pub fn load(&mut self, buffer: PixelBuffer) {
        let (width, height) = buffer.dimensions();
        let loaded = LoadedImage::new(buffer);
        tracing::info!(
            width,
            height,
            brightness = loaded.analysis.brightness,
            suggestions = loaded.suggestions.len(),
            "Image loaded into session"
        );
        self.state = SessionState::Loaded(Box::new(loaded));
    }

    /// Validate raw RGBA8 bytes and load them. On failure the session is left
    /// `Empty`, even if an image was loaded before.
    pub fn load_raw(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> Result<()> {
        match PixelBuffer::new(width, height, pixels) {
            Ok(buffer) => {
                self.load(buffer);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(width, height, error = %e, "Rejected image buffer");
                self.state = SessionState::Empty;
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, SessionState::Loaded(_))
    }

    fn loaded(&self) -> Result<&LoadedImage> {
        match &self.state {
            SessionState::Loaded(image) => Ok(image.as_ref()),
            SessionState::Empty => Err(EditorError::NotLoaded),
        }
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedImage> {
        match &mut self.state {
            SessionState::Loaded(image) => Ok(image.as_mut()),
            SessionState::Empty => Err(EditorError::NotLoaded),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn analysis(&self) -> Result<&AnalysisResult> {
        Ok(&self.loaded()?.analysis)
    }

    pub fn suggestions(&self) -> Result<&[Suggestion]> {
        Ok(&self.loaded()?.suggestions)
    }

    pub fn settings(&self) -> Result<&Settings> {
        Ok(&self.loaded()?.settings)
    }

    /// Snapshot of the most recently derived buffer.
    pub fn current_buffer(&self) -> Result<Arc<PixelBuffer>> {
        Ok(Arc::clone(&self.loaded()?.current))
    }

    /// The untouched image as loaded, for before/after comparison.
    pub fn original_buffer(&self) -> Result<Arc<PixelBuffer>> {
        Ok(Arc::clone(&self.loaded()?.original))
    }

    pub fn revision(&self) -> Result<u64> {
        Ok(self.loaded()?.revision)
    }

    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Store a clamped value without recomputing; returns the stored value.
    pub fn stage_parameter(&mut self, param: Parameter, value: f32) -> Result<f32> {
        let image = self.loaded_mut()?;
        let stored = image.settings.set(param, value);
        tracing::debug!(parameter = %param, requested = value, stored, "Parameter staged");
        Ok(stored)
    }

    pub fn set_parameter(&mut self, param: Parameter, value: f32) -> Result<Arc<PixelBuffer>> {
        self.stage_parameter(param, value)?;
        self.recompute()
    }

    /// [`set_parameter`](Self::set_parameter) with the parameter given by name.
    pub fn set_parameter_by_name(&mut self, name: &str, value: f32) -> Result<Arc<PixelBuffer>> {
        let param: Parameter = name.parse()?;
        self.set_parameter(param, value)
    }

    /// Reset to defaults, overlay the named preset, recompute.
    pub fn apply_preset(&mut self, name: &str) -> Result<Arc<PixelBuffer>> {
        let preset = self
            .presets
            .get(name)
            .cloned()
            .ok_or_else(|| EditorError::UnknownPreset(name.to_string()))?;
        self.apply_preset_values(&preset)
    }

    pub fn apply_preset_values(&mut self, preset: &Preset) -> Result<Arc<PixelBuffer>> {
        let image = self.loaded_mut()?;
        image.settings = preset.settings();
        tracing::info!(preset = %preset.name, "Preset applied");
        Ok(image.recompute())
    }

    /// Merge the suggestions computed at load time over the current settings.
    pub fn apply_suggestions(&mut self) -> Result<Arc<PixelBuffer>> {
        let image = self.loaded_mut()?;
        image.settings = suggestions::apply_suggestions(&image.settings, &image.suggestions);
        tracing::info!(count = image.suggestions.len(), "Suggestions applied");
        Ok(image.recompute())
    }

    /// Merge an explicit (possibly filtered) list of suggestions.
    pub fn apply_suggestion_list(&mut self, list: &[Suggestion]) -> Result<Arc<PixelBuffer>> {
        let image = self.loaded_mut()?;
        image.settings = suggestions::apply_suggestions(&image.settings, list);
        Ok(image.recompute())
    }

    pub fn reset(&mut self) -> Result<Arc<PixelBuffer>> {
        let image = self.loaded_mut()?;
        image.settings.reset();
        tracing::info!("Settings reset");
        Ok(image.recompute())
    }

    /// Re-derive the current buffer from the original and the settings as
    /// they are right now.
    pub fn recompute(&mut self) -> Result<Arc<PixelBuffer>> {
        Ok(self.loaded_mut()?.recompute())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsDelta;
    use crate::suggestions::Rule;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 255) / width.max(1)) as u8;
                pixels.extend_from_slice(&[v, (y * 40 % 256) as u8, 255 - v, 255]);
            }
        }
        PixelBuffer::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_empty_session_rejects_operations() {
        let mut session = EditSession::new();
        assert!(!session.is_loaded());
        assert!(matches!(session.analysis(), Err(EditorError::NotLoaded)));
        assert!(matches!(session.current_buffer(), Err(EditorError::NotLoaded)));
        assert!(matches!(
            session.set_parameter(Parameter::Glow, 10.0),
            Err(EditorError::NotLoaded)
        ));
        assert!(matches!(session.reset(), Err(EditorError::NotLoaded)));
    }

    #[test]
    fn test_load_starts_at_defaults_with_current_equal_original() {
        let session = EditSession::open(gradient(8, 6));
        assert!(session.is_loaded());
        assert!(session.settings().unwrap().is_default());
        assert_eq!(*session.current_buffer().unwrap(), *session.original_buffer().unwrap());
        assert_eq!(session.revision().unwrap(), 0);
    }

    #[test]
    fn test_zero_width_load_fails_and_empties_session() {
        let mut session = EditSession::open(gradient(4, 4));
        let err = session.load_raw(0, 4, Vec::new()).unwrap_err();
        assert!(matches!(err, EditorError::InvalidBuffer(_)));
        assert!(!session.is_loaded());
    }

    #[test]
    fn test_load_raw_success() {
        let mut session = EditSession::new();
        session.load_raw(2, 1, vec![0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
        assert_eq!(session.analysis().unwrap().brightness, 0);
    }

    #[test]
    fn test_set_parameter_clamps_and_recomputes() {
        let mut session = EditSession::open(PixelBuffer::filled(3, 3, [0, 0, 0, 255]).unwrap());
        let out = session.set_parameter(Parameter::Brightness, 20.0).unwrap();
        assert_eq!(out.pixel(1, 1), Some([51, 51, 51, 255]));
        assert_eq!(session.revision().unwrap(), 1);

        session.set_parameter_by_name("brightness", 1000.0).unwrap();
        assert_eq!(session.settings().unwrap().get(Parameter::Brightness), 100.0);
    }

    #[test]
    fn test_unknown_parameter_name() {
        let mut session = EditSession::open(gradient(2, 2));
        assert!(matches!(
            session.set_parameter_by_name("tint", 5.0),
            Err(EditorError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_original_is_never_mutated() {
        let source = gradient(10, 7);
        let mut session = EditSession::open(source.clone());
        session.set_parameter(Parameter::Contrast, 60.0).unwrap();
        session.set_parameter(Parameter::Glow, 80.0).unwrap();
        assert_eq!(*session.original_buffer().unwrap(), source);
        assert_ne!(*session.current_buffer().unwrap(), source);
    }

    #[test]
    fn test_reset_restores_original_pixels() {
        let mut session = EditSession::open(gradient(9, 9));
        session.set_parameter(Parameter::Saturation, 70.0).unwrap();
        session.set_parameter(Parameter::Shadows, -40.0).unwrap();
        session.apply_preset("glow").unwrap();

        let out = session.reset().unwrap();
        assert!(session.settings().unwrap().is_default());
        assert_eq!(*out, *session.original_buffer().unwrap());
    }

    #[test]
    fn test_preset_replaces_rather_than_merges() {
        let mut session = EditSession::open(gradient(4, 4));
        session.set_parameter(Parameter::Saturation, -50.0).unwrap();
        session.apply_preset("bright").unwrap();

        let settings = session.settings().unwrap();
        assert_eq!(settings.get(Parameter::Saturation), 0.0);
        assert_eq!(settings.get(Parameter::Brightness), 20.0);
        assert_eq!(settings.get(Parameter::Shadows), 25.0);
        assert_eq!(settings.get(Parameter::Glow), 15.0);
    }

    #[test]
    fn test_unknown_preset() {
        let mut session = EditSession::open(gradient(4, 4));
        assert!(matches!(
            session.apply_preset("vintage"),
            Err(EditorError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_apply_suggestions_on_dark_image() {
        let mut session = EditSession::open(PixelBuffer::filled(5, 5, [10, 10, 10, 255]).unwrap());
        let rules: Vec<Rule> = session.suggestions().unwrap().iter().map(|s| s.rule).collect();
        assert_eq!(
            rules,
            vec![Rule::Underexposed, Rule::LowContrast, Rule::Polish, Rule::Soft]
        );

        session.apply_suggestions().unwrap();
        let settings = session.settings().unwrap();
        assert_eq!(settings.get(Parameter::Brightness), 20.0);
        assert_eq!(settings.get(Parameter::Shadows), 30.0);
        assert_eq!(settings.get(Parameter::Glow), 20.0);
        assert_eq!(settings.get(Parameter::Contrast), 10.0);
        assert_eq!(settings.get(Parameter::Clarity), 30.0);
    }

    #[test]
    fn test_apply_single_suggestion() {
        let mut session = EditSession::open(PixelBuffer::filled(5, 5, [10, 10, 10, 255]).unwrap());
        let first = session.suggestions().unwrap()[..1].to_vec();
        session.apply_suggestion_list(&first).unwrap();

        let expected = Settings::from_delta(
            &SettingsDelta::new()
                .with(Parameter::Brightness, 20.0)
                .with(Parameter::Shadows, 30.0)
                .with(Parameter::Glow, 15.0),
        );
        assert_eq!(*session.settings().unwrap(), expected);
    }

    #[test]
    fn test_reload_discards_previous_state() {
        let mut session = EditSession::open(gradient(4, 4));
        session.set_parameter(Parameter::Glow, 50.0).unwrap();

        let next = PixelBuffer::filled(2, 2, [250, 250, 250, 255]).unwrap();
        session.load(next.clone());
        assert!(session.settings().unwrap().is_default());
        assert_eq!(*session.original_buffer().unwrap(), next);
        assert_eq!(session.revision().unwrap(), 0);
        assert_eq!(session.suggestions().unwrap()[0].rule, Rule::Overexposed);
    }

    #[test]
    fn test_old_snapshot_survives_recompute() {
        let mut session = EditSession::open(gradient(6, 6));
        let before = session.current_buffer().unwrap();
        let after = session.set_parameter(Parameter::Brightness, -60.0).unwrap();
        assert_ne!(*before, *after);
        assert_eq!(*before, *session.original_buffer().unwrap());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = EditSession::open(gradient(4, 4));
        let b = EditSession::open(gradient(4, 4));
        a.set_parameter(Parameter::Contrast, 90.0).unwrap();
        assert!(b.settings().unwrap().is_default());
    }

    #[test]
    fn test_configured_presets_are_available() {
        let config = EditorConfig::from_json(
            r#"{"presets": [{"name": "noir", "values": {"saturation": -100}}]}"#,
        )
        .unwrap();
        let mut session = EditSession::from_config(&config);
        session.load(PixelBuffer::filled(2, 2, [200, 30, 30, 255]).unwrap());
        let out = session.apply_preset("noir").unwrap();
        let px = out.pixel(0, 0).unwrap();
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
}
