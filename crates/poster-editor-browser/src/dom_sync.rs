//! DOM synchronization for the display regions.
//!
//! Each card is rendered by the host as `#pattern-{id}` holding a
//! `.pattern-display` and an `.examples-display`. This module mounts engine
//! markup into those elements and maps elements back to [`RegionId`]s.

use poster_editor_core::{
    CardId, EditorChrome, Field, PlatformError, RawSelection, RegionId, RegionSurface,
    SelectionSource,
};
use wasm_bindgen::JsCast;

pub(crate) const DISPLAY_SELECTOR: &str = ".pattern-display, .examples-display";
pub(crate) const CARD_SELECTOR: &str = ".pattern-card";
pub(crate) const WIDGET_SELECTOR: &str = ".blank-box";
pub(crate) const TOOLBAR_ID: &str = "text-editor-toolbar";
pub(crate) const PALETTE_ID: &str = "color-palette";
pub(crate) const FONT_CONTROLS_ID: &str = "font-size-controls";

/// Class toggled on a display element while it shows its placeholder.
const EMPTY_CLASS: &str = "empty";

/// [`RegionSurface`] over the live document.
pub struct BrowserSurface {
    document: web_sys::Document,
}

impl BrowserSurface {
    pub fn new() -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    /// The display element of a region, if the host has rendered it.
    pub fn region_element(&self, region: RegionId) -> Option<web_sys::Element> {
        let selector = format!("#pattern-{} .{}", region.card, region.field.display_class());
        self.document.query_selector(&selector).ok().flatten()
    }

    fn require_element(&self, region: RegionId) -> Result<web_sys::Element, PlatformError> {
        self.region_element(region)
            .ok_or_else(|| PlatformError(format!("region element not found: {region}")))
    }
}

impl RegionSurface for BrowserSurface {
    fn is_attached(&self, region: RegionId) -> bool {
        self.region_element(region)
            .is_some_and(|element| element.is_connected())
    }

    fn mount_markup(&mut self, region: RegionId, markup: &str) -> Result<(), PlatformError> {
        let element = self.require_element(region)?;
        element.set_inner_html(markup);
        element
            .class_list()
            .remove_1(EMPTY_CLASS)
            .map_err(|e| format!("classList.remove failed: {:?}", e))?;
        Ok(())
    }

    fn mount_placeholder(&mut self, region: RegionId, text: &str) -> Result<(), PlatformError> {
        let element = self.require_element(region)?;
        element.set_text_content(Some(text));
        element
            .class_list()
            .add_1(EMPTY_CLASS)
            .map_err(|e| format!("classList.add failed: {:?}", e))?;
        Ok(())
    }

    fn replace_region(&mut self, region: RegionId, markup: &str) -> Result<(), PlatformError> {
        let element = self.require_element(region)?;
        if !element.is_connected() {
            return Err(format!("region {region} is not attached").into());
        }
        element.set_inner_html(markup);
        tracing::trace!(target: "poster::dom", %region, len = markup.len(), "region replaced");
        Ok(())
    }

    fn detach_region(&mut self, region: RegionId) {
        // The card element itself belongs to the host; only its content is ours.
        if let Some(element) = self.region_element(region) {
            element.set_inner_html("");
        }
    }
}

impl SelectionSource for BrowserSurface {
    fn read_selection(&self) -> RawSelection {
        crate::cursor::read_selection()
    }
}

/// Identify the region a display element belongs to.
pub(crate) fn region_for_display(display: &web_sys::Element) -> Option<RegionId> {
    let card = display.closest(CARD_SELECTOR).ok().flatten()?;
    let id = card.id();
    let card = id.strip_prefix("pattern-")?.parse().ok().map(CardId)?;
    let field = if display.class_list().contains(Field::Pattern.display_class()) {
        Field::Pattern
    } else {
        Field::Examples
    };
    Some(RegionId::new(card, field))
}

/// Document-order index of `widget` among the widgets of `display`.
pub(crate) fn widget_ordinal(display: &web_sys::Element, widget: &web_sys::Element) -> Option<usize> {
    let widgets = display.query_selector_all(WIDGET_SELECTOR).ok()?;
    let target: &web_sys::Node = widget.as_ref();
    (0..widgets.length()).find_map(|i| {
        widgets
            .item(i)
            .filter(|node| node.is_same_node(Some(target)))
            .map(|_| i as usize)
    })
}

/// Reflect chrome visibility onto the page.
///
/// The toolbar stays on screen and is only marked active; the palette and
/// font controls are shown and hidden.
pub fn apply_chrome(document: &web_sys::Document, chrome: EditorChrome) {
    if let Some(toolbar) = document.get_element_by_id(TOOLBAR_ID) {
        let _ = toolbar
            .class_list()
            .toggle_with_force("active", chrome.toolbar);
    }
    for (id, visible) in [
        (PALETTE_ID, chrome.palette),
        (FONT_CONTROLS_ID, chrome.font_controls),
    ] {
        let Some(element) = document.get_element_by_id(id) else {
            continue;
        };
        let _ = element.class_list().toggle_with_force("show", visible);
        if let Some(html) = element.dyn_ref::<web_sys::HtmlElement>() {
            let _ = html
                .style()
                .set_property("display", if visible { "block" } else { "none" });
        }
    }
}
