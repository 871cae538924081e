//! Rule engine turning analysis statistics into correction suggestions.
//!
//! Rules are evaluated in a fixed order and each contributes at most one
//! suggestion. The output order is the evaluation order, never re-sorted by
//! priority, because merging is order-sensitive (later deltas win).

use serde::{Deserialize, Serialize};
use crate::analyzer::AnalysisResult;
use crate::settings::{Parameter, Settings, SettingsDelta};

/// Mean brightness under which an image counts as underexposed.
pub const UNDEREXPOSED_BELOW: u8 = 80;
/// Mean brightness over which an image counts as overexposed.
pub const OVEREXPOSED_ABOVE: u8 = 200;
/// Luminance standard deviation under which contrast is considered flat.
pub const LOW_CONTRAST_BELOW: u32 = 30;
/// Laplacian energy under which the image is considered soft.
pub const SOFT_BELOW: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Which rule produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Underexposed,
    Overexposed,
    LowContrast,
    Polish,
    Soft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub rule: Rule,
    pub priority: Priority,
    pub text: String,
    pub delta: SettingsDelta,
}

impl Suggestion {
    fn new(rule: Rule, priority: Priority, text: &str, delta: SettingsDelta) -> Self {
        Self {
            rule,
            priority,
            text: text.to_string(),
            delta,
        }
    }
}

/// Evaluate every rule against `result`, in rule order.
pub fn suggest(result: &AnalysisResult) -> Vec<Suggestion> {
    let mut out = Vec::with_capacity(4);

    if result.brightness < UNDEREXPOSED_BELOW {
        out.push(Suggestion::new(
            Rule::Underexposed,
            Priority::High,
            "Image looks underexposed: lift brightness and open up the shadows",
            SettingsDelta::new()
                .with(Parameter::Brightness, 20.0)
                .with(Parameter::Shadows, 30.0)
                .with(Parameter::Glow, 15.0),
        ));
    } else if result.brightness > OVEREXPOSED_ABOVE {
        out.push(Suggestion::new(
            Rule::Overexposed,
            Priority::High,
            "Image looks overexposed: recover highlights and pull brightness down",
            SettingsDelta::new()
                .with(Parameter::Highlights, -25.0)
                .with(Parameter::Brightness, -5.0)
                .with(Parameter::Glow, 10.0),
        ));
    }

    if result.contrast < LOW_CONTRAST_BELOW {
        out.push(Suggestion::new(
            Rule::LowContrast,
            Priority::Medium,
            "Contrast is flat: add contrast and clarity for more depth",
            SettingsDelta::new()
                .with(Parameter::Contrast, 25.0)
                .with(Parameter::Clarity, 20.0)
                .with(Parameter::Glow, 15.0),
        ));
    }

    out.push(Suggestion::new(
        Rule::Polish,
        Priority::Low,
        "Finish with a soft glow and a touch of contrast",
        SettingsDelta::new()
            .with(Parameter::Glow, 25.0)
            .with(Parameter::Clarity, 15.0)
            .with(Parameter::Contrast, 10.0),
    ));

    if result.sharpness < SOFT_BELOW {
        out.push(Suggestion::new(
            Rule::Soft,
            Priority::Medium,
            "Details look soft: increase clarity",
            SettingsDelta::new()
                .with(Parameter::Clarity, 30.0)
                .with(Parameter::Glow, 20.0),
        ));
    }

    tracing::debug!(count = out.len(), "Suggestions evaluated");
    out
}

/// Fold every suggestion's delta into one, later suggestions overwriting
/// earlier ones key by key.
pub fn merged_delta(suggestions: &[Suggestion]) -> SettingsDelta {
    suggestions.iter().fold(SettingsDelta::new(), |mut acc, s| {
        acc.merge(&s.delta);
        acc
    })
}

/// `settings` with all suggestion deltas overlaid and clamped.
pub fn apply_suggestions(settings: &Settings, suggestions: &[Suggestion]) -> Settings {
    let mut next = *settings;
    next.overlay(&merged_delta(suggestions));
    next
}

// ============================================================================
// TESTS
// ============================================================================
