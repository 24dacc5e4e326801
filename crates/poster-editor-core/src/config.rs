//! Editor configuration.
//!
//! Defaults match the poster layout; hosts may override any field by passing a
//! partial JSON-compatible object (missing fields fall back to defaults).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UserInputError;
use crate::types::CssColor;

/// Engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Upper bound on simultaneously existing cards.
    pub max_cards: usize,
    /// Sanitizer truncation bound, in UTF-16 code units.
    pub max_input_len: usize,
    /// Pixel size that a font scale of `1.0` maps to.
    pub base_font_px: f64,
    /// Delay before reading the native selection after pointer/key events.
    pub selection_debounce_ms: u32,
    /// Clamp range for the numeric font-size field.
    pub font_scale_min: f64,
    pub font_scale_max: f64,
    /// Range of the font-size slider (narrower than the field).
    pub slider_min: f64,
    pub slider_max: f64,
    /// Display token inside every placeholder widget.
    pub blank_token: String,
    /// Toolbar palette: name to hex color.
    pub palette: Vec<PaletteEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub hex: String,
}

impl PaletteEntry {
    fn new(name: &str, hex: &str) -> Self {
        Self {
            name: name.to_string(),
            hex: hex.to_string(),
        }
    }
}

/// Named font-size presets shown under the slider.
pub const FONT_PRESETS: [(&str, f64); 4] =
    [("Small", 0.8), ("Normal", 1.0), ("Large", 1.2), ("XL", 1.5)];

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_cards: 3,
            max_input_len: 500,
            base_font_px: 18.0,
            selection_debounce_ms: 50,
            font_scale_min: 0.5,
            font_scale_max: 5.0,
            slider_min: 0.5,
            slider_max: 3.0,
            blank_token: "____".to_string(),
            palette: vec![
                PaletteEntry::new("red", "#EF4444"),
                PaletteEntry::new("orange", "#F97316"),
                PaletteEntry::new("yellow", "#EAB308"),
                PaletteEntry::new("green", "#10B981"),
                PaletteEntry::new("blue", "#3B82F6"),
                PaletteEntry::new("indigo", "#6366F1"),
                PaletteEntry::new("purple", "#8B5CF6"),
                PaletteEntry::new("black", "#1F2937"),
            ],
        }
    }
}

impl EditorConfig {
    pub fn selection_debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.selection_debounce_ms))
    }

    /// Resolve a palette name (case-insensitive) or a raw CSS color.
    pub fn resolve_color(&self, value: &str) -> Result<CssColor, UserInputError> {
        let name = value.trim();
        match self
            .palette
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
        {
            Some(entry) => CssColor::parse(&entry.hex),
            None => CssColor::parse(name),
        }
    }

    pub fn clamp_font_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.font_scale_min, self.font_scale_max)
    }

    pub fn slider_accepts(&self, scale: f64) -> bool {
        (self.slider_min..=self.slider_max).contains(&scale)
    }
}
