//! Core engine types: identities, unit-offset selections, and style values.
//!
//! These types carry no DOM state and can be used by any host surface.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::UserInputError;

/// Unique, monotonically assigned card identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which display region of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Pattern,
    Examples,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Pattern, Field::Examples];

    /// CSS class of the rendered display element.
    pub fn display_class(self) -> &'static str {
        match self {
            Field::Pattern => "pattern-display",
            Field::Examples => "examples-display",
        }
    }

    /// Text shown while the field has no content.
    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Pattern => "Click to add pattern (use [], [ ], [   ] for different sizes)",
            Field::Examples => "Add examples (use [] for blanks)",
        }
    }
}

/// One editable display region: a field of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId {
    pub card: CardId,
    pub field: Field,
}

impl RegionId {
    pub fn new(card: CardId, field: Field) -> Self {
        Self { card, field }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern-{} .{}", self.card, self.field.display_class())
    }
}

/// Text selection with anchor and head positions, in region units.
///
/// The anchor is where the selection started, the head is where it ended.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where selection ended
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is collapsed (empty).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Ordered unit range.
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// Styleable properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Color,
    FontSize,
}

impl StyleProperty {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::FontSize => "font-size",
        }
    }
}

/// A validated CSS color: `#rgb`, `#rrggbb`, or an alphabetic keyword.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CssColor(SmolStr);

impl CssColor {
    pub fn parse(value: &str) -> Result<Self, UserInputError> {
        let value = value.trim();
        let valid = match value.strip_prefix('#') {
            Some(hex) => {
                matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
            }
            None => !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()),
        };
        if valid {
            Ok(Self(SmolStr::new(value)))
        } else {
            Err(UserInputError::InvalidColor(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Absolute font size in CSS pixels.
///
/// Sizes are always stored as pixels so nested overrides never compound.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct FontSize(f64);

/// Sizes closer than this are treated as equal.
const SIZE_EPSILON: f64 = 0.01;

impl FontSize {
    pub fn from_px(px: f64) -> Self {
        Self(px)
    }

    /// Scale relative to `base_px` (`1.0` is the default size).
    pub fn from_scale(scale: f64, base_px: f64) -> Self {
        Self(scale * base_px)
    }

    pub fn px(self) -> f64 {
        self.0
    }

    pub fn scale(self, base_px: f64) -> f64 {
        self.0 / base_px
    }

    pub fn differs_from(self, other: FontSize) -> bool {
        (self.0 - other.0).abs() > SIZE_EPSILON
    }

    /// Parse a CSS length in `px` or `em`.
    pub fn parse_css(value: &str, base_px: f64) -> Option<Self> {
        let value = value.trim();
        if let Some(num) = value.strip_suffix("px") {
            num.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(Self)
        } else if let Some(num) = value.strip_suffix("em") {
            num.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|scale| Self::from_scale(scale, base_px))
        } else {
            None
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = format!("{:.2}", self.0);
        let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{trimmed}px")
    }
}

/// A single style change requested from the toolbar.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleChange {
    Color(CssColor),
    FontSize(FontSize),
}

impl StyleChange {
    pub fn property(&self) -> StyleProperty {
        match self {
            StyleChange::Color(_) => StyleProperty::Color,
            StyleChange::FontSize(_) => StyleProperty::FontSize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_ordering() {
        let sel = Selection::new(7, 2);
        assert_eq!(sel.start(), 2);
        assert_eq!(sel.end(), 7);
        assert_eq!(sel.to_range(), 2..7);
        assert!(!sel.is_collapsed());
    }

    #[test]
    fn test_color_validation() {
        assert!(CssColor::parse("#EF4444").is_ok());
        assert!(CssColor::parse("#abc").is_ok());
        assert!(CssColor::parse("rebeccapurple").is_ok());
        assert_eq!(
            CssColor::parse("red; background: url(x)"),
            Err(UserInputError::InvalidColor(
                "red; background: url(x)".to_string()
            ))
        );
        assert!(CssColor::parse("#12345").is_err());
    }

    #[test]
    fn test_font_size_display() {
        assert_eq!(FontSize::from_scale(1.5, 18.0).to_string(), "27px");
        assert_eq!(FontSize::from_scale(1.2, 18.0).to_string(), "21.6px");
        assert_eq!(FontSize::from_px(18.0).to_string(), "18px");
    }

    #[test]
    fn test_font_size_parse() {
        assert_eq!(
            FontSize::parse_css("27px", 18.0),
            Some(FontSize::from_px(27.0))
        );
        assert_eq!(
            FontSize::parse_css("1.5em", 18.0),
            Some(FontSize::from_px(27.0))
        );
        assert_eq!(FontSize::parse_css("large", 18.0), None);
    }

    #[test]
    fn test_material_difference() {
        let a = FontSize::from_px(18.0);
        assert!(!a.differs_from(FontSize::from_px(18.004)));
        assert!(a.differs_from(FontSize::from_px(18.5)));
    }
}
