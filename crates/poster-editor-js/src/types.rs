//! Types exposed to JavaScript via wasm-bindgen.

use poster_editor_core::{EditorChrome, ExportPlan, PatternCard};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// A pattern card as the host page renders it.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsCard {
    pub id: u32,
    pub pattern_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_markup: Option<String>,
    pub examples_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples_markup: Option<String>,
    pub date: String,
    /// Layout class, `size-small` through `size-xl`.
    pub size_class: String,
}

impl From<&PatternCard> for JsCard {
    fn from(card: &PatternCard) -> Self {
        Self {
            id: card.id.0,
            pattern_text: card.pattern_text.clone(),
            pattern_markup: card.pattern_markup.clone(),
            examples_text: card.examples_text.clone(),
            examples_markup: card.examples_markup.clone(),
            date: card.date.clone(),
            size_class: card.size().class_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsExportPlan {
    pub file_name: String,
    /// `"pdf"` or `"png"`.
    pub format: String,
    pub page_width_px: u32,
    pub page_height_px: u32,
    pub scale: u32,
}

impl From<ExportPlan> for JsExportPlan {
    fn from(plan: ExportPlan) -> Self {
        Self {
            file_name: plan.file_name,
            format: plan.format.extension().to_string(),
            page_width_px: plan.page_width_px,
            page_height_px: plan.page_height_px,
            scale: plan.scale,
        }
    }
}

/// Which editor controls are showing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsChrome {
    pub toolbar: bool,
    pub palette: bool,
    pub font_controls: bool,
}

impl From<EditorChrome> for JsChrome {
    fn from(chrome: EditorChrome) -> Self {
        Self {
            toolbar: chrome.toolbar,
            palette: chrome.palette,
            font_controls: chrome.font_controls,
        }
    }
}
