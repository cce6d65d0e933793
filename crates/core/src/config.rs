//! Merge configuration.
//!
//! Every heuristic constant lives here so it can be tuned from a JSON file
//! or the command line instead of being baked into the algorithm.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Keywords that mark a template region as unfilled boilerplate.
pub const DEFAULT_PLACEHOLDER_KEYWORDS: &[&str] = &[
    "title",
    "content",
    "subtitle",
    "标题",
    "副标题",
    "内容",
    "点击",
    "替换",
    "click",
    "replace",
    "main content",
    "template",
    "模板",
    "chapter",
    "章节",
    "https://star.vision",
];

/// Narrower instruction phrases used when cleaning the source deck itself.
pub const DEFAULT_LIGHTWEIGHT_KEYWORDS: &[&str] = &[
    "点击此处",
    "单击此处",
    "click here",
    "click to",
    "add title",
    "add text",
    "添加标题",
    "添加文本",
];

/// Which deck the output is built on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Template deck as the base, source text placed into it.
    #[default]
    Styled,
    /// Source deck as the base, only its own placeholder text purged.
    Lightweight,
}

/// How content records are matched to target regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStrategy {
    /// i-th record in reading order goes to the i-th region.
    #[default]
    Positional,
    /// Largest bounding-box overlap first, positional fallback.
    Overlap,
}

/// What happens to the template slides kept when the template is longer
/// than the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TruncatePolicy {
    /// Kept slides are copied with all their shapes and styling.
    #[default]
    KeepSlides,
    /// Kept slides are re-stamped from their layouts only.
    BareLayouts,
}

/// All tunables of a merge run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub mode: MergeMode,
    pub placeholder_keywords: Vec<String>,
    pub lightweight_keywords: Vec<String>,
    pub title_font_size_pt: f64,
    pub body_font_size_pt: f64,

    /// Lightweight cleanup only touches text shorter than this many characters.
    pub placeholder_max_len: usize,

    /// Capture per-run formatting from the source and reapply it.
    pub preserve_formatting: bool,
    pub strategy: PlacementStrategy,
    pub truncate: TruncatePolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            mode: MergeMode::Styled,
            placeholder_keywords: to_owned(DEFAULT_PLACEHOLDER_KEYWORDS),
            lightweight_keywords: to_owned(DEFAULT_LIGHTWEIGHT_KEYWORDS),
            title_font_size_pt: 32.0,
            body_font_size_pt: 18.0,
            placeholder_max_len: 50,
            preserve_formatting: false,
            strategy: PlacementStrategy::Positional,
            truncate: TruncatePolicy::KeepSlides,
        }
    }
}

impl MergeConfig {
    /// Create a configuration with the default constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set the merge mode.
    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the placement strategy.
    pub fn with_strategy(mut self, strategy: PlacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Turn formatting capture on or off.
    pub fn with_preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = preserve;
        self
    }

    /// Reject values the placer cannot write.
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [
            ("title_font_size_pt", self.title_font_size_pt),
            ("body_font_size_pt", self.body_font_size_pt),
        ] {
            // OOXML font sizes are hundredths of a point in 1..=400000.
            if !(0.01..=4000.0).contains(&size) {
                return Err(Error::Config(format!(
                    "{} must be between 0.01 and 4000, got {}",
                    name, size
                )));
            }
        }
        Ok(())
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
