//! Tonal editing core for RGBA8 images.
//!
//! - [`analyzer`] measures brightness, contrast, dynamic range and sharpness
//! - [`suggestions`] turns those measurements into prioritized corrections
//! - [`pipeline`] applies the seven adjustment parameters to a buffer
//! - [`session`] owns the original/current buffers and the settings record
//! - [`live`] coalesces rapid parameter changes into single recomputes
//!
//! Decoding and encoding files lives at the edge in [`export`]; everything
//! else works on [`PixelBuffer`]s.

pub mod analyzer;
pub mod buffer;
pub mod config;
pub mod error;
pub mod export;
pub mod live;
pub mod pipeline;
pub mod presets;
pub mod session;
pub mod settings;
pub mod suggestions;

pub use analyzer::{analyze, AnalysisResult, Exposure};
pub use buffer::PixelBuffer;
pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use export::ExportFormat;
pub use live::LiveSession;
pub use presets::{Preset, PresetLibrary};
pub use session::EditSession;
pub use settings::{Parameter, Settings, SettingsDelta};
pub use suggestions::{suggest, Priority, Rule, Suggestion};
