//! Editor configuration, persisted as camelCase JSON.
//!
//! Every field has a default so a partial (or missing) file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use crate::error::Result;
use crate::export::{ExportFormat, DEFAULT_JPEG_QUALITY};
use crate::presets::{Preset, PresetLibrary};

/// One display refresh at 60 Hz, rounded down.
pub const DEFAULT_COALESCE_WINDOW_MS: u64 = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    pub format: ExportFormat,
    /// Used when the format is switched to JPEG without an explicit quality.
    pub jpeg_quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Window within which rapid parameter changes collapse into one recompute.
    pub coalesce_window_ms: u64,
    /// Presets layered over the built-ins; same-named entries replace them.
    pub presets: Vec<Preset>,
    pub export: ExportSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            coalesce_window_ms: DEFAULT_COALESCE_WINDOW_MS,
            presets: Vec::new(),
            export: ExportSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Read `path` if it exists, otherwise fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        tracing::info!(path = %path.display(), presets = config.presets.len(), "Config loaded");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }

    /// Built-in presets with the configured ones layered on top.
    pub fn preset_library(&self) -> PresetLibrary {
        let mut library = PresetLibrary::builtin();
        library.extend(self.presets.iter().cloned());
        library
    }
}

// ============================================================================
// TESTS
// ============================================================================
