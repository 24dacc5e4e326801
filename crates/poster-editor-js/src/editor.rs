//! JsPosterEditor - the editor wrapper for JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Local, NaiveDate};
use wasm_bindgen::prelude::*;

use poster_editor_browser::{
    BrowserSurface, CardId, EditorConfig, EditorEngine, EditorError, EditorEvents, ExportFormat,
    Field, PatternCard, RegionId, SharedEngine, apply_chrome,
};

use crate::types::{JsCard, JsChrome, JsExportPlan};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn notice(err: EditorError) -> JsError {
    JsError::new(&err.notice())
}

fn parse_field(field: &str) -> Result<Field, JsError> {
    match field {
        "pattern" => Ok(Field::Pattern),
        "examples" => Ok(Field::Examples),
        other => Err(JsError::new(&format!("Unknown field: {other}"))),
    }
}

fn parse_format(format: &str) -> Result<ExportFormat, JsError> {
    match format {
        "pdf" => Ok(ExportFormat::Pdf),
        "png" => Ok(ExportFormat::Png),
        other => Err(JsError::new(&format!("Unknown export format: {other}"))),
    }
}

/// The poster editor exposed to JavaScript.
///
/// The host renders `#pattern-{id}` cards with `.pattern-display` and
/// `.examples-display` children, plus the toolbar, palette and font-size
/// controls. Call `mount()` once they are in the document.
#[wasm_bindgen]
pub struct JsPosterEditor {
    engine: SharedEngine,
    events: Option<EditorEvents>,
}

impl JsPosterEditor {
    /// Run `f` on the engine, then mirror chrome visibility onto the page.
    fn with_engine<R>(
        &self,
        f: impl FnOnce(&mut EditorEngine<BrowserSurface>) -> Result<R, EditorError>,
    ) -> Result<R, JsError> {
        let mut engine = self
            .engine
            .try_borrow_mut()
            .map_err(|_| JsError::new("Editor is busy"))?;
        let result = f(&mut engine);
        apply_chrome(engine.surface().document(), engine.chrome());
        result.map_err(notice)
    }
}

#[wasm_bindgen]
impl JsPosterEditor {
    /// Create an editor. `config` may be omitted; missing fields take
    /// their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsPosterEditor, JsError> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };
        let surface = BrowserSurface::new().map_err(|e| JsError::new(&e.to_string()))?;
        let engine = EditorEngine::new(config, surface, today());
        Ok(Self {
            engine: Rc::new(RefCell::new(engine)),
            events: None,
        })
    }

    /// Render every card and start listening for selections.
    pub fn mount(&mut self) -> Result<(), JsError> {
        self.with_engine(|engine| engine.render_all())?;
        if self.events.is_none() {
            let events =
                EditorEvents::attach(&self.engine).map_err(|e| JsError::new(&e.to_string()))?;
            self.events = Some(events);
        }
        tracing::info!(target: "poster::engine", "editor mounted");
        Ok(())
    }

    /// Detach all listeners.
    pub fn unmount(&mut self) {
        self.events = None;
    }

    /// Re-render every card from its stored record.
    pub fn render(&self) -> Result<(), JsError> {
        self.with_engine(|engine| engine.render_all())
    }

    #[wasm_bindgen(js_name = renderCard)]
    pub fn render_card(&self, id: u32) -> Result<(), JsError> {
        self.with_engine(|engine| engine.render_card(CardId(id)))
    }

    /// Add a card and return its id.
    #[wasm_bindgen(js_name = addCard)]
    pub fn add_card(&self) -> Result<u32, JsError> {
        self.with_engine(|engine| engine.add_card(today()))
            .map(|id| id.0)
    }

    #[wasm_bindgen(js_name = deleteCard)]
    pub fn delete_card(&self, id: u32) -> Result<(), JsError> {
        self.with_engine(|engine| engine.delete_card(CardId(id)))
    }

    /// Reset to a single empty card.
    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&self) -> Result<(), JsError> {
        self.with_engine(|engine| engine.clear_all(today()))
    }

    /// Open a field in its raw input. Returns the text to prefill.
    #[wasm_bindgen(js_name = enterEdit)]
    pub fn enter_edit(&self, id: u32, field: &str) -> Result<String, JsError> {
        let field = parse_field(field)?;
        self.with_engine(|engine| engine.enter_edit_mode(RegionId::new(CardId(id), field)))
    }

    #[wasm_bindgen(js_name = cancelEdit)]
    pub fn cancel_edit(&self) -> Result<(), JsError> {
        self.with_engine(|engine| {
            engine.cancel_edit();
            Ok(())
        })
    }

    /// Save a field's raw text. Returns whether the text changed.
    #[wasm_bindgen(js_name = commitText)]
    pub fn commit_text(&self, id: u32, field: &str, text: &str) -> Result<bool, JsError> {
        let field = parse_field(field)?;
        self.with_engine(|engine| engine.commit_text(CardId(id), field, text))
    }

    /// Save a `YY.MM.DD` date; the weekday is filled in.
    #[wasm_bindgen(js_name = saveDate)]
    pub fn save_date(&self, id: u32, text: &str) -> Result<(), JsError> {
        self.with_engine(|engine| engine.save_date(CardId(id), text))
    }

    /// Apply a palette name or CSS color to the current selection.
    #[wasm_bindgen(js_name = applyColor)]
    pub fn apply_color(&self, color: &str) -> Result<(), JsError> {
        self.with_engine(|engine| engine.apply_color(color).map(|_| ()))
    }

    /// Apply a font scale, `1.0` being the default size.
    #[wasm_bindgen(js_name = applyFontSize)]
    pub fn apply_font_size(&self, scale: f64) -> Result<(), JsError> {
        self.with_engine(|engine| engine.apply_font_size(scale).map(|_| ()))
    }

    pub fn reset(&self) -> Result<(), JsError> {
        self.with_engine(|engine| engine.reset())
    }

    #[wasm_bindgen(js_name = hideControls)]
    pub fn hide_controls(&self) -> Result<(), JsError> {
        self.with_engine(|engine| {
            engine.hide_controls();
            Ok(())
        })
    }

    /// Persist every card, hide the editor controls and describe the page
    /// to rasterize. `format` is `"pdf"` or `"png"`.
    #[wasm_bindgen(js_name = prepareExport)]
    pub fn prepare_export(&self, format: &str) -> Result<JsExportPlan, JsError> {
        let format = parse_format(format)?;
        self.with_engine(|engine| engine.prepare_export(format, today()))
            .map(JsExportPlan::from)
    }

    #[wasm_bindgen(js_name = getCards)]
    pub fn get_cards(&self) -> Result<JsValue, JsError> {
        let engine = self
            .engine
            .try_borrow()
            .map_err(|_| JsError::new("Editor is busy"))?;
        let cards: Vec<JsCard> = engine.deck().cards().iter().map(JsCard::from).collect();
        serde_wasm_bindgen::to_value(&cards)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = getChrome)]
    pub fn get_chrome(&self) -> Result<JsChrome, JsError> {
        self.with_engine(|engine| Ok(engine.chrome().into()))
    }

    /// Text of the header badge, e.g. `Oct 11 - Oct 17, 2026`.
    #[wasm_bindgen(js_name = weekBadge)]
    pub fn week_badge(&self) -> Result<String, JsError> {
        self.with_engine(|engine| Ok(engine.week_badge(today())))
    }

    /// Flip examples visibility and return the new state.
    #[wasm_bindgen(js_name = toggleExamples)]
    pub fn toggle_examples(&self) -> Result<bool, JsError> {
        self.with_engine(|engine| Ok(engine.toggle_examples()))
    }

    /// Register `callback(card)`, called after each persisted change.
    #[wasm_bindgen(js_name = onSave)]
    pub fn on_save(&self, callback: js_sys::Function) -> Result<(), JsError> {
        self.with_engine(|engine| {
            engine.set_save_callback(move |card: &PatternCard| {
                let value = match serde_wasm_bindgen::to_value(&JsCard::from(card)) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!(target: "poster::persist", %e, "card not serialized");
                        return;
                    }
                };
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    tracing::warn!(target: "poster::persist", ?e, "save callback threw");
                }
            });
            Ok(())
        })
    }
}

/// Recent editor log lines, for bug reports.
#[wasm_bindgen(js_name = getLogs)]
pub fn get_logs() -> String {
    poster_editor_browser::get_logs()
}

#[wasm_bindgen(js_name = clearLogs)]
pub fn clear_logs() {
    poster_editor_browser::clear_logs();
}
