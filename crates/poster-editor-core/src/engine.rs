//! The editor engine: one owner for the deck, the rendered regions, the
//! selection snapshot and the baseline registry.
//!
//! Style operations run on working copies of the region tree and the
//! registries. Nothing is committed until the surface has accepted the new
//! markup, so a failed apply or reset leaves no partial style behind and the
//! card record untouched.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::apply::{ApplyBranch, StyleContext, apply_to_range, apply_to_widget};
use crate::blank::BlankTransformer;
use crate::card::{CardDeck, PatternCard};
use crate::config::EditorConfig;
use crate::controls::{EditorChrome, FontSizeControls};
use crate::dates;
use crate::error::{EditorError, UserInputError};
use crate::export::{ExportFormat, ExportPlan};
use crate::markup::Region;
use crate::persist::canonical_markup;
use crate::platform::{PointerTarget, RawSelection, RegionSurface, SelectionSource};
use crate::registry::{BaselineSizeRegistry, KeyAllocator};
use crate::reset::{ResetContext, reset_range, reset_widget};
use crate::selection::{RegionInfo, SelectionSnapshot, SelectionTracker, SnapshotKind};
use crate::types::{CardId, Field, FontSize, RegionId, StyleChange};

/// Host hook run after every style mutation and every save.
/// Called with the card record after each persisted change.
pub type SaveCallback = Box<dyn FnMut(&PatternCard)>;

/// Engine-side record of one mounted region.
#[derive(Clone, Debug)]
struct RegionState {
    tree: Region,
    generation: u64,
    placeholder: bool,
}

pub struct EditorEngine<S: RegionSurface> {
    config: EditorConfig,
    transformer: BlankTransformer,
    deck: CardDeck,
    surface: S,
    regions: HashMap<RegionId, RegionState>,
    generation: u64,
    tracker: SelectionTracker,
    baselines: BaselineSizeRegistry,
    keys: KeyAllocator,
    editing: Option<RegionId>,
    chrome: EditorChrome,
    font_controls: FontSizeControls,
    examples_visible: bool,
    on_save: Option<SaveCallback>,
}

fn region_info(
    regions: &HashMap<RegionId, RegionState>,
    editing: Option<RegionId>,
    id: RegionId,
) -> Option<RegionInfo> {
    regions.get(&id).map(|state| RegionInfo {
        generation: state.generation,
        units: state.tree.units(),
        widgets: state.tree.widget_count(),
        editing: editing == Some(id),
        placeholder: state.placeholder,
    })
}

impl<S: RegionSurface> EditorEngine<S> {
    /// A fresh engine with one empty card. Call [`render_all`](Self::render_all)
    /// once the surface is ready.
    pub fn new(config: EditorConfig, surface: S, today: NaiveDate) -> Self {
        let transformer = BlankTransformer {
            max_input_len: config.max_input_len,
            token: config.blank_token.clone(),
        };
        Self {
            deck: CardDeck::new(config.max_cards, today),
            font_controls: FontSizeControls::new(&config),
            transformer,
            config,
            surface,
            regions: HashMap::new(),
            generation: 0,
            tracker: SelectionTracker::new(),
            baselines: BaselineSizeRegistry::new(),
            keys: KeyAllocator::default(),
            editing: None,
            chrome: EditorChrome::default(),
            examples_visible: true,
            on_save: None,
        }
    }

    pub fn set_save_callback(&mut self, callback: impl FnMut(&PatternCard) + 'static) {
        self.on_save = Some(Box::new(callback));
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn deck(&self) -> &CardDeck {
        &self.deck
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn snapshot(&self) -> Option<&SelectionSnapshot> {
        self.tracker.current()
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn chrome(&self) -> EditorChrome {
        self.chrome
    }

    pub fn font_controls(&self) -> &FontSizeControls {
        &self.font_controls
    }

    pub fn editing(&self) -> Option<RegionId> {
        self.editing
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id).map(|state| &state.tree)
    }

    pub fn baselines(&self) -> &BaselineSizeRegistry {
        &self.baselines
    }

    fn notify_saved(&mut self, id: CardId) {
        if let (Some(callback), Some(card)) = (self.on_save.as_mut(), self.deck.get(id)) {
            callback(card);
        }
    }

    // --- rendering ---

    /// Re-render every card. Regions of cards that no longer exist are removed.
    pub fn render_all(&mut self) -> Result<(), EditorError> {
        let stale: Vec<RegionId> = self
            .regions
            .keys()
            .filter(|id| self.deck.get(id.card).is_none())
            .copied()
            .collect();
        for id in stale {
            self.detach(id);
        }
        let ids: Vec<CardId> = self.deck.cards().iter().map(|card| card.id).collect();
        for id in ids {
            self.render_card(id)?;
        }
        Ok(())
    }

    pub fn render_card(&mut self, id: CardId) -> Result<(), EditorError> {
        for field in Field::ALL {
            self.render_region(RegionId::new(id, field))?;
        }
        Ok(())
    }

    /// Regenerate one region. Stored markup wins over the plain text.
    fn render_region(&mut self, region: RegionId) -> Result<(), EditorError> {
        let card = self
            .deck
            .get(region.card)
            .ok_or(UserInputError::UnknownCard(region.card))?;
        let tree = match card.markup(region.field) {
            Some(markup) => Region::parse(markup),
            None => Region::parse(&self.transformer.transform(card.text(region.field), false)),
        };

        self.tracker.region_replaced(region);
        if self.editing == Some(region) {
            self.editing = None;
        }
        let placeholder = tree.is_empty();
        if placeholder {
            self.surface
                .mount_placeholder(region, region.field.placeholder())?;
        } else {
            self.surface.mount_markup(region, &tree.to_html())?;
        }
        self.keys.observe(&tree);
        self.generation += 1;
        tracing::trace!(target: "poster::engine", %region, generation = self.generation, placeholder, "rendered region");
        self.regions.insert(
            region,
            RegionState {
                tree,
                generation: self.generation,
                placeholder,
            },
        );
        Ok(())
    }

    fn detach(&mut self, region: RegionId) {
        self.tracker.region_replaced(region);
        self.surface.detach_region(region);
        self.regions.remove(&region);
        if self.editing == Some(region) {
            self.editing = None;
        }
    }

    // --- cards ---

    pub fn add_card(&mut self, today: NaiveDate) -> Result<CardId, EditorError> {
        let id = self.deck.add_card(today)?;
        self.render_card(id)?;
        Ok(id)
    }

    pub fn delete_card(&mut self, id: CardId) -> Result<(), EditorError> {
        self.deck.delete_card(id)?;
        for field in Field::ALL {
            self.detach(RegionId::new(id, field));
        }
        Ok(())
    }

    /// Drop every card and start over with one empty card.
    pub fn clear_all(&mut self, today: NaiveDate) -> Result<(), EditorError> {
        let mounted: Vec<RegionId> = self.regions.keys().copied().collect();
        for region in mounted {
            self.detach(region);
        }
        self.deck.clear_all(today);
        self.hide_controls();
        self.render_all()
    }

    /// Open a field in its raw input. Returns the text to edit.
    pub fn enter_edit_mode(&mut self, region: RegionId) -> Result<String, EditorError> {
        let card = self
            .deck
            .get(region.card)
            .ok_or(UserInputError::UnknownCard(region.card))?;
        let text = card.text(region.field).to_string();
        self.tracker.entered_edit_mode(region.card);
        self.chrome.hide_all();
        self.editing = Some(region);
        tracing::debug!(target: "poster::engine", %region, "edit mode");
        Ok(text)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save a field's raw text and re-render it. Returns whether the text
    /// changed, which drops any styling stored for that field.
    pub fn commit_text(&mut self, id: CardId, field: Field, text: &str) -> Result<bool, EditorError> {
        let changed = self.deck.save_text(id, field, text)?;
        self.editing = None;
        self.render_region(RegionId::new(id, field))?;
        self.notify_saved(id);
        Ok(changed)
    }

    pub fn save_date(&mut self, id: CardId, text: &str) -> Result<(), EditorError> {
        self.deck.save_date(id, text)?;
        self.notify_saved(id);
        Ok(())
    }

    pub fn toggle_examples(&mut self) -> bool {
        self.examples_visible = !self.examples_visible;
        self.examples_visible
    }

    pub fn examples_visible(&self) -> bool {
        self.examples_visible
    }

    pub fn week_badge(&self, today: NaiveDate) -> String {
        dates::week_badge(today)
    }

    // --- selection ---

    pub fn pointer_down(&mut self, target: PointerTarget) {
        let dropped = self.tracker.pointer_down(target);
        if dropped || target == PointerTarget::Elsewhere {
            self.chrome.hide_all();
        }
    }

    /// Returns whether the host should schedule a debounced
    /// [`settle_selection`](Self::settle_selection).
    pub fn selection_gesture_end(&mut self, target: PointerTarget) -> bool {
        self.tracker.gesture_ended(target)
    }

    pub fn settle_selection(&mut self, raw: RawSelection) -> Option<SelectionSnapshot> {
        let (regions, editing) = (&self.regions, self.editing);
        self.tracker
            .settle(raw, |id| region_info(regions, editing, id))
            .cloned()
    }

    /// Settle whatever the surface reports as the live selection.
    pub fn settle_live(&mut self) -> Option<SelectionSnapshot>
    where
        S: SelectionSource,
    {
        let raw = self.surface.read_selection();
        self.settle_selection(raw)
    }

    pub fn widget_clicked(&mut self, region: RegionId, ordinal: usize) -> bool {
        let (regions, editing) = (&self.regions, self.editing);
        self.tracker
            .widget_clicked(region, ordinal, |id| region_info(regions, editing, id))
    }

    /// Right-click. Returns whether the toolbar was surfaced.
    pub fn context_menu(&mut self, raw: RawSelection) -> bool {
        let (regions, editing) = (&self.regions, self.editing);
        let captured = self
            .tracker
            .context_menu(raw, |id| region_info(regions, editing, id));
        if captured {
            self.chrome.show_toolbar();
        }
        captured
    }

    pub fn escape(&mut self) {
        self.hide_controls();
    }

    /// Drop the snapshot and hide all editor chrome.
    pub fn hide_controls(&mut self) {
        self.tracker.clear();
        self.chrome.hide_all();
    }

    pub fn show_palette(&mut self) -> Result<(), EditorError> {
        self.require_snapshot()?;
        self.chrome.show_palette();
        Ok(())
    }

    /// Show the font-size controls loaded with the selection's current scale.
    ///
    /// With no snapshot, `live` is captured first.
    pub fn show_font_controls(&mut self, live: Option<RawSelection>) -> Result<f64, EditorError> {
        if !self.tracker.is_captured() {
            if let Some(raw) = live {
                self.settle_selection(raw);
            }
        }
        self.require_snapshot()?;
        let scale = self.current_font_scale();
        self.font_controls.show_for(scale);
        self.chrome.show_font_controls();
        Ok(scale)
    }

    /// Scale in effect at the start of the snapshot; `1.0` without one.
    pub fn current_font_scale(&self) -> f64 {
        let base = self.config.base_font_px;
        let Some(snapshot) = self.tracker.current() else {
            return 1.0;
        };
        let Some(state) = self.regions.get(&snapshot.region.id) else {
            return 1.0;
        };
        let offset = match snapshot.kind {
            SnapshotKind::Text { range } => Some(range.start()),
            SnapshotKind::Widget { ordinal } => state.tree.widget_offset(ordinal),
        };
        offset
            .and_then(|offset| state.tree.font_size_at(offset))
            .map_or(1.0, |size| size.scale(base))
    }

    fn require_snapshot(&self) -> Result<&SelectionSnapshot, EditorError> {
        match self.tracker.current() {
            Some(snapshot) => Ok(snapshot),
            None if self.editing.is_some() => Err(UserInputError::RawEditMode.into()),
            None => Err(UserInputError::NoSelection.into()),
        }
    }

    /// The snapshot, checked against the live region.
    fn validated_snapshot(&self) -> Result<SelectionSnapshot, EditorError> {
        let snapshot = self.require_snapshot()?;
        let id = snapshot.region.id;
        if self.editing == Some(id) {
            return Err(UserInputError::RawEditMode.into());
        }
        let current = self
            .regions
            .get(&id)
            .is_some_and(|state| state.generation == snapshot.region.generation && !state.placeholder);
        if !current || !self.surface.is_attached(id) {
            return Err(EditorError::StaleSelection);
        }
        Ok(snapshot.clone())
    }

    // --- styling ---

    /// Apply a palette name or CSS color to the snapshot.
    pub fn apply_color(&mut self, value: &str) -> Result<ApplyBranch, EditorError> {
        let result = self
            .config
            .resolve_color(value)
            .map_err(EditorError::from)
            .and_then(|color| self.apply_change(StyleChange::Color(color)));
        self.finish("apply", result)
    }

    /// Apply a font scale (`1.0` = default), clamped to the field range.
    pub fn apply_font_size(&mut self, scale: f64) -> Result<ApplyBranch, EditorError> {
        let result = if scale.is_finite() {
            let scale = self.config.clamp_font_scale(scale);
            let size = FontSize::from_scale(scale, self.config.base_font_px);
            self.apply_change(StyleChange::FontSize(size))
        } else {
            Err(UserInputError::InvalidFontSize(scale).into())
        };
        self.finish("apply", result)
    }

    fn apply_change(&mut self, change: StyleChange) -> Result<ApplyBranch, EditorError> {
        let snapshot = self.validated_snapshot()?;
        let id = snapshot.region.id;
        let mut tree = self
            .regions
            .get(&id)
            .map(|state| state.tree.clone())
            .ok_or(EditorError::StaleSelection)?;
        let mut baselines = self.baselines.clone();
        let mut keys = self.keys.clone();
        let mut ctx = StyleContext {
            baselines: &mut baselines,
            keys: &mut keys,
            base_font_px: self.config.base_font_px,
        };
        let branch = match snapshot.kind {
            SnapshotKind::Widget { ordinal } => apply_to_widget(&mut tree, ordinal, &change, &mut ctx)?,
            SnapshotKind::Text { range } => apply_to_range(&mut tree, range, &change, &mut ctx)?,
        };
        self.surface.replace_region(id, &tree.to_html())?;

        self.baselines = baselines;
        self.keys = keys;
        if let Some(state) = self.regions.get_mut(&id) {
            state.tree = tree;
        }
        tracing::debug!(target: "poster::engine", region = %id, ?branch, ?change, "style applied");
        self.sync(id.card)?;
        self.notify_saved(id.card);
        Ok(branch)
    }

    /// Remove styling from the snapshot, then drop the snapshot.
    pub fn reset(&mut self) -> Result<(), EditorError> {
        let result = self.reset_inner();
        if result.is_ok() {
            self.hide_controls();
        }
        self.finish("reset", result)
    }

    fn reset_inner(&mut self) -> Result<(), EditorError> {
        let snapshot = self.validated_snapshot()?;
        let id = snapshot.region.id;
        let mut tree = self
            .regions
            .get(&id)
            .map(|state| state.tree.clone())
            .ok_or(EditorError::StaleSelection)?;
        let ctx = ResetContext {
            baselines: &self.baselines,
            base_font_px: self.config.base_font_px,
        };
        match snapshot.kind {
            SnapshotKind::Widget { ordinal } => reset_widget(&mut tree, ordinal, &ctx)?,
            SnapshotKind::Text { range } => reset_range(&mut tree, range, &ctx)?,
        }
        self.surface.replace_region(id, &tree.to_html())?;
        if let Some(state) = self.regions.get_mut(&id) {
            state.tree = tree;
        }
        tracing::debug!(target: "poster::engine", region = %id, "style reset");
        self.sync(id.card)?;
        self.notify_saved(id.card);
        Ok(())
    }

    /// Operation boundary: log failures and drop the snapshot when it can no
    /// longer be trusted.
    fn finish<T>(&mut self, op: &str, result: Result<T, EditorError>) -> Result<T, EditorError> {
        if let Err(err) = &result {
            tracing::warn!(target: "poster::engine", op, %err, "style operation failed");
            if err.invalidates_selection() {
                self.hide_controls();
            }
        }
        result
    }

    // --- persistence ---

    /// Write the canonical markup of a card's mounted regions into the card.
    /// Regions showing their placeholder, or no longer attached, are skipped.
    pub fn sync(&mut self, id: CardId) -> Result<(), EditorError> {
        let mut updates = Vec::new();
        for field in Field::ALL {
            let region = RegionId::new(id, field);
            let Some(state) = self.regions.get(&region) else {
                continue;
            };
            if state.placeholder || !self.surface.is_attached(region) {
                continue;
            }
            updates.push((field, canonical_markup(&state.tree, &self.config.blank_token)));
        }
        let card = self
            .deck
            .get_mut(id)
            .ok_or(UserInputError::UnknownCard(id))?;
        for (field, markup) in updates {
            card.set_markup(field, Some(markup));
        }
        tracing::trace!(target: "poster::persist", %id, "card synced");
        Ok(())
    }

    /// Sync everything and clear editor chrome so the host can rasterize.
    pub fn prepare_export(
        &mut self,
        format: ExportFormat,
        today: NaiveDate,
    ) -> Result<ExportPlan, EditorError> {
        let ids: Vec<CardId> = self.deck.cards().iter().map(|card| card.id).collect();
        for id in ids {
            self.sync(id)?;
        }
        self.hide_controls();
        let plan = ExportPlan::new(format, today);
        tracing::debug!(target: "poster::engine", file = %plan.file_name, "export prepared");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::platform::MemorySurface;
    use crate::types::Selection;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn pattern(id: u32) -> RegionId {
        RegionId::new(CardId(id), Field::Pattern)
    }

    fn engine_with(text: &str) -> EditorEngine<MemorySurface> {
        let mut engine = EditorEngine::new(EditorConfig::default(), MemorySurface::new(), today());
        engine.render_all().unwrap();
        engine.commit_text(CardId(1), Field::Pattern, text).unwrap();
        engine
    }

    fn select(engine: &mut EditorEngine<MemorySurface>, start: usize, end: usize) {
        let region = pattern(1);
        let text = engine.region(region).unwrap().text_in(start..end);
        assert!(engine.selection_gesture_end(PointerTarget::Region(region)));
        engine
            .settle_selection(RawSelection::Text {
                region,
                range: Selection::new(start, end),
                text,
            })
            .expect("selection captured");
    }

    #[test]
    fn test_love_to_scenario() {
        let mut engine = engine_with("I love to [   ]");
        let card = engine.deck().get(CardId(1)).unwrap();
        assert_eq!(card.pattern_text, "I love to [   ]");
        assert!(card.pattern_markup.is_none());
        let html = engine.surface().markup(pattern(1)).unwrap().to_string();
        assert_eq!(html.matches("blank-box space-3").count(), 1);

        // Saving the same text again keeps the plain-text path.
        assert!(!engine.commit_text(CardId(1), Field::Pattern, "I love to [   ]").unwrap());
        assert!(engine.deck().get(CardId(1)).unwrap().pattern_markup.is_none());

        select(&mut engine, 2, 6);
        engine.apply_color("red").unwrap();
        let markup = engine
            .deck()
            .get(CardId(1))
            .unwrap()
            .pattern_markup
            .clone()
            .expect("markup after styling");
        assert!(markup.contains(r#"<span style="color: #EF4444;">love</span>"#));

        engine.render_all().unwrap();
        assert_eq!(engine.surface().markup(pattern(1)), Some(markup.as_str()));
    }

    #[test]
    fn test_apply_reset_round_trip() {
        let mut engine = engine_with("I can [] swim");
        let before = engine.region(pattern(1)).unwrap().text_content();
        select(&mut engine, 2, 5);
        assert_eq!(engine.apply_color("red").unwrap(), ApplyBranch::Text);
        // The snapshot survives so a size can follow the color.
        assert!(engine.snapshot().is_some());
        engine.reset().unwrap();
        assert!(engine.snapshot().is_none());

        let region = engine.region(pattern(1)).unwrap();
        assert_eq!(region.text_content(), before);
        assert!(!region.to_html().contains("color"));
        let markup = engine.deck().get(CardId(1)).unwrap().pattern_markup.clone().unwrap();
        assert!(!markup.contains("color"));
    }

    #[test]
    fn test_mixed_apply_colors_widget() {
        let mut engine = engine_with("I can [] swim");
        select(&mut engine, 0, 12);
        assert_eq!(engine.apply_color("blue").unwrap(), ApplyBranch::Mixed);
        let html = engine.surface().markup(pattern(1)).unwrap();
        assert!(html.contains("blank-box space-1"));
        assert!(html.contains("color: #3B82F6 !important;"));
        assert!(html.contains(r#"data-styled="true""#));
    }

    #[test]
    fn test_mixed_font_size_reset_round_trip() {
        let mut engine = engine_with("I can [] swim");
        let before = engine.region(pattern(1)).unwrap().text_content();
        select(&mut engine, 0, 12);
        assert_eq!(engine.apply_font_size(1.5).unwrap(), ApplyBranch::Mixed);
        assert!(engine
            .surface()
            .markup(pattern(1))
            .unwrap()
            .contains("font-size: 27px !important;"));
        engine.reset().unwrap();

        let region = engine.region(pattern(1)).unwrap();
        assert_eq!(region.text_content(), before);
        assert_eq!(region.widget(0).unwrap().style.font_size, None);
        assert!(!region.to_html().contains("font-size"));
        let markup = engine.deck().get(CardId(1)).unwrap().pattern_markup.clone().unwrap();
        assert!(!markup.contains("font-size"));
    }

    #[test]
    fn test_widget_baseline_restored() {
        let mut engine = engine_with("a [] b");
        assert!(engine.widget_clicked(pattern(1), 0));
        engine.apply_font_size(1.5).unwrap();
        engine.apply_font_size(2.0).unwrap();
        assert_eq!(engine.current_font_scale(), 2.0);
        engine.reset().unwrap();
        let widget = engine.region(pattern(1)).unwrap().widget(0).unwrap().clone();
        assert_eq!(widget.style.font_size, None);
        assert!(!widget.styled);
    }

    #[test]
    fn test_widget_non_default_baseline_restored() {
        let mut engine = engine_with(
            r#"<span class="blank-box space-2" style="font-size: 27px !important;"><span class="blank-text">____</span></span>"#,
        );
        assert!(engine.widget_clicked(pattern(1), 0));
        assert_eq!(engine.show_font_controls(None).unwrap(), 1.5);
        engine.apply_font_size(2.0).unwrap();
        engine.apply_font_size(3.0).unwrap();
        assert!(engine.widget_clicked(pattern(1), 0));
        engine.reset().unwrap();
        let widget = engine.region(pattern(1)).unwrap().widget(0).unwrap().clone();
        assert_eq!(widget.style.font_size, Some(FontSize::from_px(27.0)));
    }

    #[test]
    fn test_card_limits() {
        let mut engine = engine_with("x");
        engine.add_card(today()).unwrap();
        engine.add_card(today()).unwrap();
        let err = engine.add_card(today()).unwrap_err();
        assert!(matches!(err, EditorError::UserInput(UserInputError::CardLimit(3))));
        assert_eq!(engine.deck().len(), 3);

        engine.delete_card(CardId(2)).unwrap();
        engine.delete_card(CardId(3)).unwrap();
        let err = engine.delete_card(CardId(1)).unwrap_err();
        assert!(matches!(err, EditorError::UserInput(UserInputError::LastCard)));
        assert_eq!(engine.deck().len(), 1);
        assert_eq!(engine.surface().content(pattern(2)), None);
    }

    #[test]
    fn test_detached_region_is_stale() {
        let mut engine = engine_with("I can [] swim");
        select(&mut engine, 2, 5);
        engine.show_palette().unwrap();
        engine.surface_mut().detach_externally(pattern(1));
        let err = engine.apply_color("red").unwrap_err();
        assert!(matches!(err, EditorError::StaleSelection));
        assert!(engine.snapshot().is_none());
        assert!(!engine.chrome().any_visible());
        assert!(engine.deck().get(CardId(1)).unwrap().pattern_markup.is_none());
    }

    #[test]
    fn test_rerender_drops_snapshot() {
        let mut engine = engine_with("I can [] swim");
        select(&mut engine, 2, 5);
        engine.render_all().unwrap();
        let err = engine.apply_color("red").unwrap_err();
        assert!(matches!(err, EditorError::UserInput(UserInputError::NoSelection)));
    }

    #[test]
    fn test_raw_edit_mode_rejected() {
        let mut engine = engine_with("I can [] swim");
        select(&mut engine, 2, 5);
        assert_eq!(engine.enter_edit_mode(pattern(1)).unwrap(), "I can [] swim");
        assert!(engine.snapshot().is_none());
        let err = engine.apply_font_size(1.2).unwrap_err();
        assert!(matches!(err, EditorError::UserInput(UserInputError::RawEditMode)));
        assert_eq!(
            err.notice(),
            "Styles can't be applied while editing. Press Enter to save first."
        );
    }

    #[test]
    fn test_invalid_color_keeps_selection() {
        let mut engine = engine_with("I can [] swim");
        select(&mut engine, 2, 5);
        let err = engine.apply_color("red; background: url(x)").unwrap_err();
        assert!(matches!(err, EditorError::UserInput(UserInputError::InvalidColor(_))));
        assert!(engine.snapshot().is_some());
    }

    #[test]
    fn test_pointer_and_escape() {
        let mut engine = engine_with("I can [] swim");
        select(&mut engine, 2, 5);
        engine.show_palette().unwrap();
        engine.pointer_down(PointerTarget::Chrome);
        assert!(engine.chrome().palette);
        engine.pointer_down(PointerTarget::Elsewhere);
        assert!(engine.snapshot().is_none());
        assert!(!engine.chrome().any_visible());

        select(&mut engine, 2, 5);
        engine.escape();
        assert!(engine.snapshot().is_none());
    }

    #[test]
    fn test_context_menu_surfaces_toolbar() {
        let mut engine = engine_with("I can [] swim");
        assert!(engine.context_menu(RawSelection::Widget {
            region: pattern(1),
            ordinal: 0
        }));
        assert!(engine.chrome().toolbar);
        assert!(engine.snapshot().unwrap().is_widget());
    }

    #[test]
    fn test_placeholder_region_not_selectable() {
        let mut engine = EditorEngine::new(EditorConfig::default(), MemorySurface::new(), today());
        engine.render_all().unwrap();
        let examples = RegionId::new(CardId(1), Field::Examples);
        assert!(matches!(
            engine.surface().content(examples),
            Some(crate::platform::MountedContent::Placeholder(_))
        ));
        assert!(!engine.widget_clicked(examples, 0));
    }

    #[test]
    fn test_save_callback_and_export() {
        let saved = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine_with("I can [] swim");
        let log = saved.clone();
        engine.set_save_callback(move |card: &PatternCard| log.borrow_mut().push(card.id));
        select(&mut engine, 2, 5);
        engine.apply_font_size(1.2).unwrap();
        engine.save_date(CardId(1), "26.10.15").unwrap();
        assert_eq!(*saved.borrow(), vec![CardId(1), CardId(1)]);

        let plan = engine.prepare_export(ExportFormat::Pdf, today()).unwrap();
        assert_eq!(plan.file_name, "ZENITH_English_Weekly_Pattern_20261014.pdf");
        assert!(engine.snapshot().is_none());
        assert!(!engine.chrome().any_visible());
    }

    #[test]
    fn test_text_change_drops_markup() {
        let mut engine = engine_with("I can [] swim");
        select(&mut engine, 2, 5);
        engine.apply_color("green").unwrap();
        assert!(engine.deck().get(CardId(1)).unwrap().pattern_markup.is_some());
        assert!(engine.commit_text(CardId(1), Field::Pattern, "I can [] run").unwrap());
        assert!(engine.deck().get(CardId(1)).unwrap().pattern_markup.is_none());
        assert!(!engine.surface().markup(pattern(1)).unwrap().contains("color"));
    }

    #[test]
    fn test_settle_live_reads_surface_selection() {
        let mut engine = engine_with("I can [] swim");
        assert!(engine.settle_live().is_none());

        engine.surface_mut().set_live_selection(RawSelection::Widget {
            region: pattern(1),
            ordinal: 0,
        });
        let snapshot = engine.settle_live().expect("widget captured");
        assert!(snapshot.is_widget());
        assert_eq!(snapshot.text, "[]");
    }
}
