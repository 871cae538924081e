//! Named one-click styles.
//!
//! A preset is a partial settings overlay applied on top of defaults (not on
//! top of the current settings). Three built-ins ship with the crate; more
//! can be layered in from configuration.

use serde::{Deserialize, Serialize};
use crate::settings::{Parameter, Settings, SettingsDelta};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub values: SettingsDelta,
}

impl Preset {
    pub fn new(name: impl Into<String>, values: SettingsDelta) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Defaults with this preset's values overlaid and clamped.
    pub fn settings(&self) -> Settings {
        Settings::from_delta(&self.values)
    }
}

/// Ordered collection of presets, unique by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetLibrary {
    presets: Vec<Preset>,
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetLibrary {
    pub fn empty() -> Self {
        Self { presets: Vec::new() }
    }

    /// `auto`, `glow` and `bright`.
    pub fn builtin() -> Self {
        let mut library = Self::empty();
        library.insert(Preset::new(
            "auto",
            SettingsDelta::new()
                .with(Parameter::Brightness, 10.0)
                .with(Parameter::Contrast, 15.0)
                .with(Parameter::Glow, 20.0)
                .with(Parameter::Saturation, 5.0),
        ));
        library.insert(Preset::new(
            "glow",
            SettingsDelta::new()
                .with(Parameter::Glow, 40.0)
                .with(Parameter::Brightness, 5.0)
                .with(Parameter::Contrast, 10.0),
        ));
        library.insert(Preset::new(
            "bright",
            SettingsDelta::new()
                .with(Parameter::Brightness, 20.0)
                .with(Parameter::Shadows, 25.0)
                .with(Parameter::Glow, 15.0),
        ));
        library
    }

    /// Add a preset, replacing any existing one with the same name in place.
    pub fn insert(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    /// Insert every preset from `other`, later names overriding.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Preset>) {
        for preset in other {
            self.insert(preset);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let library = PresetLibrary::builtin();
        assert_eq!(library.names(), vec!["auto", "glow", "bright"]);
    }

    #[test]
    fn test_bright_preset_settings() {
        let library = PresetLibrary::builtin();
        let settings = library.get("bright").unwrap().settings();
        assert_eq!(settings.get(Parameter::Brightness), 20.0);
        assert_eq!(settings.get(Parameter::Shadows), 25.0);
        assert_eq!(settings.get(Parameter::Glow), 15.0);
        assert_eq!(settings.get(Parameter::Contrast), 0.0);
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut library = PresetLibrary::builtin();
        library.insert(Preset::new(
            "glow",
            SettingsDelta::new().with(Parameter::Glow, 90.0),
        ));
        assert_eq!(library.len(), 3);
        assert_eq!(library.names(), vec!["auto", "glow", "bright"]);
        assert_eq!(library.get("glow").unwrap().values.get(Parameter::Glow), Some(90.0));
    }

    #[test]
    fn test_extend_appends_new_names() {
        let mut library = PresetLibrary::builtin();
        library.extend(vec![Preset::new(
            "moody",
            SettingsDelta::new().with(Parameter::Saturation, -30.0),
        )]);
        assert_eq!(library.len(), 4);
        assert!(library.get("moody").is_some());
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn test_preset_values_are_clamped_when_applied() {
        let preset = Preset::new("hot", SettingsDelta::new().with(Parameter::Brightness, 400.0));
        assert_eq!(preset.settings().get(Parameter::Brightness), 100.0);
    }

    #[test]
    fn test_library_json_round_trip() {
        let library = PresetLibrary::builtin();
        let json = serde_json::to_string(&library).unwrap();
        let parsed: PresetLibrary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, library);
    }
}
