//! poster-editor-core: in-place text styling engine for the poster editor,
//! without any browser dependency.
//!
//! This crate provides:
//! - `sanitize` / `BlankTransformer` - free text to placeholder-widget markup
//! - `Region` - typed markup tree measured in units
//! - `SelectionTracker` - settled selections to immutable snapshots
//! - `apply_to_range` / `reset_range` and their widget forms
//! - `CardDeck` - the pattern cards the regions belong to
//! - `EditorEngine<S>` - owner of all of the above, generic over `RegionSurface`

pub mod apply;
pub mod blank;
pub mod card;
pub mod config;
pub mod controls;
pub mod dates;
pub mod engine;
pub mod error;
pub mod export;
pub mod guard;
pub mod markup;
pub mod persist;
pub mod platform;
pub mod registry;
pub mod reset;
pub mod sanitize;
pub mod selection;
pub mod types;

pub use apply::{ApplyBranch, StyleContext, apply_to_range, apply_to_widget};
pub use blank::{BlankSize, BlankTransformer, transform};
pub use card::{CardDeck, CardSize, PatternCard};
pub use config::{EditorConfig, FONT_PRESETS, PaletteEntry};
pub use controls::{EditorChrome, FontSizeControls};
pub use engine::{EditorEngine, SaveCallback};
pub use error::{EditorError, UserInputError};
pub use export::{ExportFormat, ExportPlan};
pub use guard::{EchoGuard, LatestWins};
pub use markup::{BlankWidget, InlineStyle, Node, Region, StyledSpan};
pub use persist::{canonical_markup, canonicalize};
pub use platform::{
    MemorySurface, MountedContent, PlatformError, PointerTarget, RawSelection, RegionSurface,
    SelectionSource,
};
pub use registry::{BaselineSizeRegistry, ElementKey, KeyAllocator};
pub use reset::{ResetContext, reset_range, reset_widget};
pub use sanitize::{MAX_INPUT_LEN, sanitize, sanitize_with_limit};
pub use selection::{RegionInfo, SelectionSnapshot, SelectionTracker, SnapshotKind, TrackerState};
pub use smol_str::SmolStr;
pub use types::{
    CardId, CssColor, Field, FontSize, RegionId, Selection, StyleChange, StyleProperty,
};
