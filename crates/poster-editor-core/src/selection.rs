//! Selection tracker: turns settled native selections into snapshots.
//!
//! Two states, `Idle` and `Captured`. Only the tracker creates or replaces a
//! snapshot; Apply and Reset consume it and either keep it or clear it.

use smol_str::SmolStr;
use web_time::Instant;

use crate::platform::{PointerTarget, RawSelection};
use crate::types::{CardId, RegionId, Selection};

/// What the tracker needs to know about a region to validate a capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionInfo {
    /// Render generation; bumps on every full re-render.
    pub generation: u64,
    pub units: usize,
    pub widgets: usize,
    /// The region's field is open in its raw input.
    pub editing: bool,
    /// The region shows its empty-state placeholder.
    pub placeholder: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionRef {
    pub id: RegionId,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
    /// A unit range of text, possibly spanning widgets.
    Text { range: Selection },
    /// A single placeholder widget, by document order inside the region.
    Widget { ordinal: usize },
}

/// Immutable capture of the user's selection.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSnapshot {
    pub kind: SnapshotKind,
    pub region: RegionRef,
    pub text: SmolStr,
    pub captured_at: Instant,
}

impl SelectionSnapshot {
    pub fn is_widget(&self) -> bool {
        matches!(self.kind, SnapshotKind::Widget { .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum TrackerState {
    #[default]
    Idle,
    Captured(SelectionSnapshot),
}

#[derive(Debug, Default)]
pub struct SelectionTracker {
    state: TrackerState,
    settle_pending: bool,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn current(&self) -> Option<&SelectionSnapshot> {
        match &self.state {
            TrackerState::Captured(snapshot) => Some(snapshot),
            TrackerState::Idle => None,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.current().is_some()
    }

    /// A debounced settle has been requested and not yet run.
    pub fn settle_pending(&self) -> bool {
        self.settle_pending
    }

    /// Pointer pressed. Returns whether the snapshot was dropped.
    ///
    /// Presses on editor chrome keep the snapshot so toolbar clicks can use
    /// it; presses inside the captured region keep it until the new
    /// selection settles.
    pub fn pointer_down(&mut self, target: PointerTarget) -> bool {
        let keep = match target {
            PointerTarget::Chrome => true,
            PointerTarget::Region(region) | PointerTarget::Widget { region, .. } => self
                .current()
                .is_some_and(|snapshot| snapshot.region.id == region),
            PointerTarget::InputField | PointerTarget::Elsewhere => false,
        };
        if keep || !self.is_captured() {
            return false;
        }
        tracing::debug!(target: "poster::selection", ?target, "pointer down outside captured region");
        self.state = TrackerState::Idle;
        true
    }

    /// Pointer released or a key lifted. Returns whether the host should
    /// schedule a debounced [`settle`](Self::settle).
    pub fn gesture_ended(&mut self, target: PointerTarget) -> bool {
        if target == PointerTarget::Chrome {
            return false;
        }
        self.settle_pending = true;
        true
    }

    /// Read the settled native selection.
    ///
    /// An empty selection drops the snapshot. Selections in raw inputs, outside
    /// every region, or in a region being edited are ignored.
    pub fn settle(
        &mut self,
        raw: RawSelection,
        lookup: impl Fn(RegionId) -> Option<RegionInfo>,
    ) -> Option<&SelectionSnapshot> {
        self.settle_pending = false;
        match raw {
            RawSelection::Empty => {
                self.state = TrackerState::Idle;
            }
            RawSelection::InputField | RawSelection::Outside => {}
            raw => match capture(raw, &lookup) {
                Capture::Snapshot(snapshot) => self.replace(snapshot),
                Capture::Drop => self.state = TrackerState::Idle,
                Capture::Ignore => {}
            },
        }
        self.current()
    }

    /// Dedicated click on a widget: select it immediately.
    pub fn widget_clicked(
        &mut self,
        region: RegionId,
        ordinal: usize,
        lookup: impl Fn(RegionId) -> Option<RegionInfo>,
    ) -> bool {
        match capture(RawSelection::Widget { region, ordinal }, &lookup) {
            Capture::Snapshot(snapshot) => {
                self.replace(snapshot);
                true
            }
            Capture::Drop | Capture::Ignore => false,
        }
    }

    /// Context menu: capture without debounce. Returns whether a snapshot is
    /// now held, in which case the toolbar should be shown.
    pub fn context_menu(
        &mut self,
        raw: RawSelection,
        lookup: impl Fn(RegionId) -> Option<RegionInfo>,
    ) -> bool {
        if let Capture::Snapshot(snapshot) = capture(raw, &lookup) {
            self.replace(snapshot);
            return true;
        }
        false
    }

    pub fn escape(&mut self) {
        self.clear();
    }

    /// A card's field switched to its raw input.
    pub fn entered_edit_mode(&mut self, card: CardId) {
        self.clear();
        tracing::trace!(target: "poster::selection", %card, "edit mode entered");
    }

    /// A region's subtree was regenerated; node identity is gone.
    pub fn region_replaced(&mut self, region: RegionId) {
        if self
            .current()
            .is_some_and(|snapshot| snapshot.region.id == region)
        {
            tracing::debug!(target: "poster::selection", %region, "snapshot invalidated by re-render");
            self.state = TrackerState::Idle;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.state = TrackerState::Idle;
        self.settle_pending = false;
    }

    fn replace(&mut self, snapshot: SelectionSnapshot) {
        tracing::debug!(
            target: "poster::selection",
            region = %snapshot.region.id,
            kind = ?snapshot.kind,
            text = %snapshot.text,
            "captured selection"
        );
        self.state = TrackerState::Captured(snapshot);
    }
}

enum Capture {
    Snapshot(SelectionSnapshot),
    /// Selection is unusable; fall back to `Idle`.
    Drop,
    /// Leave the current state alone.
    Ignore,
}

fn capture(raw: RawSelection, lookup: &impl Fn(RegionId) -> Option<RegionInfo>) -> Capture {
    let (region, kind, text) = match raw {
        RawSelection::Text {
            region,
            range,
            text,
        } => {
            let trimmed = text.trim();
            if range.is_collapsed() || trimmed.is_empty() {
                return Capture::Drop;
            }
            (region, SnapshotKind::Text { range }, SmolStr::new(trimmed))
        }
        RawSelection::Widget { region, ordinal } => {
            (region, SnapshotKind::Widget { ordinal }, SmolStr::new_static("[]"))
        }
        RawSelection::Empty => return Capture::Drop,
        RawSelection::InputField | RawSelection::Outside => return Capture::Ignore,
    };
    let Some(info) = lookup(region) else {
        return Capture::Ignore;
    };
    if info.editing || info.placeholder {
        return Capture::Ignore;
    }
    let in_bounds = match kind {
        SnapshotKind::Text { range } => range.end() <= info.units,
        SnapshotKind::Widget { ordinal } => ordinal < info.widgets,
    };
    if !in_bounds {
        tracing::warn!(target: "poster::selection", %region, ?kind, "selection outside region bounds");
        return Capture::Drop;
    }
    Capture::Snapshot(SelectionSnapshot {
        kind,
        region: RegionRef {
            id: region,
            generation: info.generation,
        },
        text,
        captured_at: Instant::now(),
    })
}
