//! Editor chrome visibility and the paired font-size controls.

use std::cell::Cell;

use serde::Serialize;

use crate::config::EditorConfig;
use crate::guard::EchoGuard;

/// Which floating controls are showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorChrome {
    pub toolbar: bool,
    pub palette: bool,
    pub font_controls: bool,
}

impl EditorChrome {
    pub fn show_toolbar(&mut self) {
        self.toolbar = true;
    }

    /// Palette and font controls are mutually exclusive.
    pub fn show_palette(&mut self) {
        self.toolbar = true;
        self.palette = true;
        self.font_controls = false;
    }

    pub fn show_font_controls(&mut self) {
        self.toolbar = true;
        self.font_controls = true;
        self.palette = false;
    }

    pub fn hide_all(&mut self) {
        *self = Self::default();
    }

    pub fn any_visible(&self) -> bool {
        self.toolbar || self.palette || self.font_controls
    }
}

/// Slider and numeric field that both drive the font scale.
///
/// Updating one control writes the other through a host callback; the echo
/// guard drops whatever input event that write might fire back.
#[derive(Debug)]
pub struct FontSizeControls {
    slider: Cell<f64>,
    field: Cell<f64>,
    syncing: EchoGuard,
    field_range: (f64, f64),
    slider_range: (f64, f64),
}

impl FontSizeControls {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            slider: Cell::new(1.0),
            field: Cell::new(1.0),
            syncing: EchoGuard::new(),
            field_range: (config.font_scale_min, config.font_scale_max),
            slider_range: (config.slider_min, config.slider_max),
        }
    }

    pub fn slider(&self) -> f64 {
        self.slider.get()
    }

    pub fn field(&self) -> f64 {
        self.field.get()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.is_active()
    }

    /// Load the current scale of the selection into both controls.
    pub fn show_for(&self, scale: f64) {
        self.field.set(scale);
        self.slider
            .set(scale.clamp(self.slider_range.0, self.slider_range.1));
    }

    /// Slider moved. Returns the scale to apply, or `None` for an echo.
    pub fn on_slider_input(&self, value: f64, sync_field: impl FnOnce(f64)) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let _scope = self.syncing.enter()?;
        self.slider.set(value);
        self.field.set(value);
        sync_field(value);
        Some(value)
    }

    /// Numeric field edited. The value is clamped; the slider follows only
    /// while the value is inside its narrower range.
    pub fn on_field_input(&self, value: f64, sync_slider: impl FnOnce(f64)) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let _scope = self.syncing.enter()?;
        let clamped = value.clamp(self.field_range.0, self.field_range.1);
        self.field.set(clamped);
        if (self.slider_range.0..=self.slider_range.1).contains(&clamped) {
            self.slider.set(clamped);
            sync_slider(clamped);
        }
        Some(clamped)
    }

    /// Preset button: both controls take the preset.
    pub fn on_preset(&self, scale: f64) -> f64 {
        self.show_for(scale);
        scale
    }
}
