//! Element identity keys and the baseline font-size registry.

use std::collections::HashMap;
use std::fmt;

use smol_str::{SmolStr, format_smolstr};

use crate::markup::{Node, Region};
use crate::types::FontSize;

const KEY_PREFIX: &str = "el-";

/// Stable identity of a styled element, written as `data-element-id`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementKey(SmolStr);

impl ElementKey {
    pub fn new(key: impl Into<SmolStr>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(KEY_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out fresh keys. Keys are never reused within one engine.
#[derive(Clone, Debug)]
pub struct KeyAllocator {
    next: u64,
}

impl Default for KeyAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl KeyAllocator {
    pub fn allocate(&mut self) -> ElementKey {
        let key = ElementKey(format_smolstr!("{KEY_PREFIX}{}", self.next));
        self.next += 1;
        key
    }

    /// Move past every key already present in `region`.
    pub fn observe(&mut self, region: &Region) {
        fn walk(nodes: &[Node], next: &mut u64) {
            for node in nodes {
                let key = match node {
                    Node::Span(span) => {
                        walk(&span.children, next);
                        span.key.as_ref()
                    }
                    Node::Blank(widget) => widget.key.as_ref(),
                    _ => None,
                };
                if let Some(seq) = key.and_then(ElementKey::sequence) {
                    *next = (*next).max(seq + 1);
                }
            }
        }
        walk(&region.nodes, &mut self.next);
    }
}

/// Font size each element had before its first size override.
///
/// Entries are written once and never overwritten; Reset reads them back.
#[derive(Clone, Debug, Default)]
pub struct BaselineSizeRegistry {
    baselines: HashMap<ElementKey, FontSize>,
}

impl BaselineSizeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `size` for `key` unless a baseline already exists.
    ///
    /// Returns whether the entry was inserted.
    pub fn record_if_absent(&mut self, key: &ElementKey, size: FontSize) -> bool {
        if self.baselines.contains_key(key) {
            return false;
        }
        tracing::trace!(target: "poster::baseline", %key, %size, "recording baseline");
        self.baselines.insert(key.clone(), size);
        true
    }

    pub fn get(&self, key: &ElementKey) -> Option<FontSize> {
        self.baselines.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_never_overwritten() {
        let mut registry = BaselineSizeRegistry::new();
        let key = ElementKey::new("el-1");
        assert!(registry.record_if_absent(&key, FontSize::from_px(18.0)));
        assert!(!registry.record_if_absent(&key, FontSize::from_px(27.0)));
        assert_eq!(registry.get(&key), Some(FontSize::from_px(18.0)));
    }

    #[test]
    fn test_allocator_skips_observed_keys() {
        let region = Region::parse(
            r#"<span style="color: red;" data-element-id="el-7">a</span>b"#,
        );
        let mut keys = KeyAllocator::default();
        keys.observe(&region);
        assert_eq!(keys.allocate().as_str(), "el-8");
    }
}
