//! Platform abstraction traits for the styling engine.
//!
//! These traits define the interface between the engine and whatever surface
//! renders the regions (browser DOM, a virtual DOM, a test double). The engine
//! only needs to know whether a region is still attached, and to push new
//! markup into it.

use std::collections::{HashMap, HashSet};

use crate::types::{RegionId, Selection};

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// A settled native selection, already mapped into region units.
#[derive(Clone, Debug, PartialEq)]
pub enum RawSelection {
    /// Text (possibly spanning widgets) inside a display region.
    Text {
        region: RegionId,
        range: Selection,
        text: String,
    },
    /// The selection's nearest element is, or sits inside, a placeholder widget.
    Widget { region: RegionId, ordinal: usize },
    /// Selection is inside a raw `<input>`/`<textarea>`.
    InputField,
    /// Selection is outside every display region.
    Outside,
    /// Nothing selected.
    Empty,
}

/// What a pointer event landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    /// Toolbar, palette, or font-size controls.
    Chrome,
    /// A display region (not on a widget).
    Region(RegionId),
    /// A placeholder widget inside a display region.
    Widget { region: RegionId, ordinal: usize },
    /// A raw input or textarea.
    InputField,
    Elsewhere,
}

impl PointerTarget {
    pub fn region(&self) -> Option<RegionId> {
        match self {
            PointerTarget::Region(region) | PointerTarget::Widget { region, .. } => Some(*region),
            _ => None,
        }
    }
}

/// Surface that displays the editable regions.
pub trait RegionSurface {
    /// Whether the region's element is still part of the document.
    fn is_attached(&self, region: RegionId) -> bool;

    /// Mount freshly rendered markup, replacing whatever element was there.
    fn mount_markup(&mut self, region: RegionId, markup: &str) -> Result<(), PlatformError>;

    /// Mount the region's empty-state placeholder.
    fn mount_placeholder(&mut self, region: RegionId, text: &str) -> Result<(), PlatformError>;

    /// Replace the children of an attached region in place after a style edit.
    fn replace_region(&mut self, region: RegionId, markup: &str) -> Result<(), PlatformError>;

    /// Remove a region (its card was deleted).
    fn detach_region(&mut self, region: RegionId);
}

/// Reads the live selection, already mapped onto region units.
pub trait SelectionSource {
    fn read_selection(&self) -> RawSelection;
}

/// What a [`MemorySurface`] region currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MountedContent {
    Markup(String),
    Placeholder(String),
}

/// In-memory surface for hosts without a DOM, and for tests.
#[derive(Debug, Default)]
pub struct MemorySurface {
    mounted: HashMap<RegionId, MountedContent>,
    detached: HashSet<RegionId>,
    live: Option<RawSelection>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self, region: RegionId) -> Option<&MountedContent> {
        self.mounted.get(&region)
    }

    /// Markup of a region, or `None` if it shows a placeholder.
    pub fn markup(&self, region: RegionId) -> Option<&str> {
        match self.mounted.get(&region)? {
            MountedContent::Markup(markup) => Some(markup),
            MountedContent::Placeholder(_) => None,
        }
    }

    /// Set what [`SelectionSource::read_selection`] reports next.
    pub fn set_live_selection(&mut self, raw: RawSelection) {
        self.live = Some(raw);
    }

    /// Simulate the host removing a region from the document.
    pub fn detach_externally(&mut self, region: RegionId) {
        self.detached.insert(region);
    }
}

impl RegionSurface for MemorySurface {
    fn is_attached(&self, region: RegionId) -> bool {
        self.mounted.contains_key(&region) && !self.detached.contains(&region)
    }

    fn mount_markup(&mut self, region: RegionId, markup: &str) -> Result<(), PlatformError> {
        self.detached.remove(&region);
        self.mounted
            .insert(region, MountedContent::Markup(markup.to_string()));
        Ok(())
    }

    fn mount_placeholder(&mut self, region: RegionId, text: &str) -> Result<(), PlatformError> {
        self.detached.remove(&region);
        self.mounted
            .insert(region, MountedContent::Placeholder(text.to_string()));
        Ok(())
    }

    fn replace_region(&mut self, region: RegionId, markup: &str) -> Result<(), PlatformError> {
        if !self.is_attached(region) {
            return Err(format!("region {region} is not attached").into());
        }
        self.mounted
            .insert(region, MountedContent::Markup(markup.to_string()));
        Ok(())
    }

    fn detach_region(&mut self, region: RegionId) {
        self.mounted.remove(&region);
        self.detached.remove(&region);
    }
}

impl SelectionSource for MemorySurface {
    fn read_selection(&self) -> RawSelection {
        self.live.clone().unwrap_or(RawSelection::Empty)
    }
}
