//! Adjustment parameters and partial overlays of them.
//!
//! [`Settings`] always holds a value for every [`Parameter`], each clamped to
//! its declared domain. Presets and suggestions are expressed as
//! [`SettingsDelta`] overlays merged onto a `Settings` value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use crate::error::EditorError;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Number of [`Parameter`] variants.
pub const PARAMETER_COUNT: usize = 7;

/// Named adjustment parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Brightness = 0,
    Contrast = 1,
    Shadows = 2,
    Highlights = 3,
    Saturation = 4,
    Glow = 5,
    /// Accepted and stored, but no pixel transform reads it.
    Clarity = 6,
}

impl Parameter {
    pub const ALL: [Parameter; PARAMETER_COUNT] = [
        Parameter::Brightness,
        Parameter::Contrast,
        Parameter::Shadows,
        Parameter::Highlights,
        Parameter::Saturation,
        Parameter::Glow,
        Parameter::Clarity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Brightness => "brightness",
            Parameter::Contrast => "contrast",
            Parameter::Shadows => "shadows",
            Parameter::Highlights => "highlights",
            Parameter::Saturation => "saturation",
            Parameter::Glow => "glow",
            Parameter::Clarity => "clarity",
        }
    }

    /// Inclusive `(min, max)` domain.
    pub fn domain(self) -> (f32, f32) {
        match self {
            Parameter::Glow | Parameter::Clarity => (0.0, 100.0),
            _ => (-100.0, 100.0),
        }
    }

    pub fn default_value(self) -> f32 {
        0.0
    }

    /// Clamp into the domain. NaN has no meaningful position and maps to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let (min, max) = self.domain();
        value.clamp(min, max)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EditorError::UnknownParameter(s.to_string()))
    }
}

// ============================================================================
// DELTA
// ============================================================================

/// Partial mapping from parameter to value.
///
/// Values are targets, not increments: merging a delta overwrites the keys it
/// names and leaves the rest untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsDelta(BTreeMap<Parameter, f32>);

impl SettingsDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, param: Parameter, value: f32) -> Self {
        self.0.insert(param, value);
        self
    }

    pub fn insert(&mut self, param: Parameter, value: f32) {
        self.0.insert(param, value);
    }

    pub fn get(&self, param: Parameter) -> Option<f32> {
        self.0.get(&param).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f32)> + '_ {
        self.0.iter().map(|(&p, &v)| (p, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Layer `other` on top of `self`; keys in `other` win.
    pub fn merge(&mut self, other: &SettingsDelta) {
        for (param, value) in other.iter() {
            self.0.insert(param, value);
        }
    }
}

impl FromIterator<(Parameter, f32)> for SettingsDelta {
    fn from_iter<I: IntoIterator<Item = (Parameter, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Full parameter vector driving the adjustment pipeline.
///
/// Serializes as a complete JSON object; deserializes from any partial object
/// by overlaying it on defaults, so the clamping invariant survives a round
/// trip through untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SettingsDelta", into = "SettingsDelta")]
pub struct Settings {
    values: [f32; PARAMETER_COUNT],
}

impl Default for Settings {
    fn default() -> Self {
        let mut values = [0.0; PARAMETER_COUNT];
        for param in Parameter::ALL {
            values[param.index()] = param.default_value();
        }
        Self { values }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, param: Parameter) -> f32 {
        self.values[param.index()]
    }

    /// Store a clamped value and return what was actually stored.
    pub fn set(&mut self, param: Parameter, value: f32) -> f32 {
        let clamped = param.clamp(value);
        self.values[param.index()] = clamped;
        clamped
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when every parameter sits at its default.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the keys present in `delta`, clamping each.
    pub fn overlay(&mut self, delta: &SettingsDelta) {
        for (param, value) in delta.iter() {
            self.set(param, value);
        }
    }

    /// Defaults with `delta` overlaid.
    pub fn from_delta(delta: &SettingsDelta) -> Self {
        let mut settings = Self::default();
        settings.overlay(delta);
        settings
    }

    /// Every parameter and its current value, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f32)> + '_ {
        Parameter::ALL.iter().map(move |&p| (p, self.get(p)))
    }
}

impl From<SettingsDelta> for Settings {
    fn from(delta: SettingsDelta) -> Self {
        Settings::from_delta(&delta)
    }
}

impl From<Settings> for SettingsDelta {
    fn from(settings: Settings) -> Self {
        settings.iter().collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
