//! Style reset: the inverse of [`crate::apply`].
//!
//! Widgets go back to their recorded baseline size, or lose every style when
//! no baseline differs from the default. Wrapper spans are unwrapped unless
//! they have a baseline worth keeping.

use crate::error::EditorError;
use crate::markup::{BlankWidget, InlineStyle, Node, Region, split_range, units};
use crate::registry::{BaselineSizeRegistry, ElementKey};
use crate::types::{FontSize, Selection};

/// Read-only state a reset consults.
pub struct ResetContext<'a> {
    pub baselines: &'a BaselineSizeRegistry,
    pub base_font_px: f64,
}

impl ResetContext<'_> {
    /// Baseline recorded for `key` if it is materially off the default size.
    fn kept_baseline(&self, key: Option<&ElementKey>) -> Option<FontSize> {
        let default = FontSize::from_px(self.base_font_px);
        key.and_then(|key| self.baselines.get(key))
            .filter(|size| size.differs_from(default))
    }

    fn reset_widget(&self, widget: &mut BlankWidget) {
        widget.style = match self.kept_baseline(widget.key.as_ref()) {
            Some(size) => InlineStyle {
                color: None,
                font_size: Some(size),
            },
            None => InlineStyle::default(),
        };
        widget.styled = false;
    }

    fn clean(&self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Blank(mut widget) => {
                    self.reset_widget(&mut widget);
                    out.push(Node::Blank(widget));
                }
                Node::Span(mut span) => {
                    let children = self.clean(std::mem::take(&mut span.children));
                    match self.kept_baseline(span.key.as_ref()) {
                        Some(size) => {
                            span.style = InlineStyle {
                                color: None,
                                font_size: Some(size),
                            };
                            span.children = children;
                            out.push(Node::Span(span));
                        }
                        // Unwrap entirely so repeated style/reset cycles do not
                        // accumulate empty wrappers.
                        None => out.extend(children),
                    }
                }
                other => out.push(other),
            }
        }
        out
    }
}

/// Reset the `ordinal`-th widget. Its key is kept.
pub fn reset_widget(
    region: &mut Region,
    ordinal: usize,
    ctx: &ResetContext<'_>,
) -> Result<(), EditorError> {
    let widget = region
        .widget_mut(ordinal)
        .ok_or_else(|| EditorError::structural(format!("no widget at ordinal {ordinal}")))?;
    ctx.reset_widget(widget);
    tracing::trace!(target: "poster::reset", ordinal, "reset widget");
    Ok(())
}

/// Reset every styled element inside `range`.
pub fn reset_range(
    region: &mut Region,
    range: Selection,
    ctx: &ResetContext<'_>,
) -> Result<(), EditorError> {
    let total = region.units();
    if range.is_collapsed() || range.end() > total {
        return Err(EditorError::structural(format!(
            "range {}..{} outside region of {total} units",
            range.start(),
            range.end()
        )));
    }
    let (before, middle, after) = split_range(region.nodes.clone(), range.to_range());
    if units(&middle) != range.len() {
        return Err(EditorError::structural("range split did not cover the selection"));
    }
    let mut nodes = before;
    nodes.extend(ctx.clean(middle));
    nodes.extend(after);
    *region = Region::new(nodes);
    tracing::trace!(
        target: "poster::reset",
        start = range.start(),
        end = range.end(),
        "reset range"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::{StyleContext, apply_to_range, apply_to_widget};
    use crate::blank::transform;
    use crate::registry::KeyAllocator;
    use crate::types::{CssColor, StyleChange};

    fn size(scale: f64) -> StyleChange {
        StyleChange::FontSize(FontSize::from_scale(scale, 18.0))
    }

    #[test]
    fn test_range_round_trip() {
        let mut baselines = BaselineSizeRegistry::new();
        let mut keys = KeyAllocator::default();
        let original = Region::parse(&transform("I can [] swim", false));
        let mut region = original.clone();
        let range = Selection::new(2, 5);
        let red = StyleChange::Color(CssColor::parse("#EF4444").unwrap());
        apply_to_range(
            &mut region,
            range,
            &red,
            &mut StyleContext {
                baselines: &mut baselines,
                keys: &mut keys,
                base_font_px: 18.0,
            },
        )
        .unwrap();
        assert_ne!(region, original);

        let ctx = ResetContext {
            baselines: &baselines,
            base_font_px: 18.0,
        };
        reset_range(&mut region, range, &ctx).unwrap();
        assert_eq!(region.text_content(), original.text_content());
        assert!(!region.to_html().contains("color"));
        assert_eq!(region, original);
    }

    #[test]
    fn test_mixed_font_size_round_trip() {
        let mut baselines = BaselineSizeRegistry::new();
        let mut keys = KeyAllocator::default();
        let original = Region::parse(&transform("I can [] swim", false));
        let mut region = original.clone();
        let range = Selection::new(0, 12);
        apply_to_range(
            &mut region,
            range,
            &size(1.5),
            &mut StyleContext {
                baselines: &mut baselines,
                keys: &mut keys,
                base_font_px: 18.0,
            },
        )
        .unwrap();
        assert!(region.to_html().contains("font-size: 27px !important;"));

        let ctx = ResetContext {
            baselines: &baselines,
            base_font_px: 18.0,
        };
        reset_range(&mut region, range, &ctx).unwrap();
        let widget = region.widget(0).unwrap();
        assert_eq!(widget.style.font_size, None);
        assert!(!region.to_html().contains("font-size"));
        assert_eq!(region.text_content(), original.text_content());
    }

    #[test]
    fn test_widget_restores_first_baseline() {
        let mut baselines = BaselineSizeRegistry::new();
        let mut keys = KeyAllocator::default();
        let mut region = Region::parse(
            r#"<span class="blank-box space-2" style="font-size: 27px !important;"><span class="blank-text">____</span></span>"#,
        );
        for scale in [1.5, 2.0] {
            let mut ctx = StyleContext {
                baselines: &mut baselines,
                keys: &mut keys,
                base_font_px: 18.0,
            };
            apply_to_widget(&mut region, 0, &size(scale), &mut ctx).unwrap();
        }
        let ctx = ResetContext {
            baselines: &baselines,
            base_font_px: 18.0,
        };
        reset_widget(&mut region, 0, &ctx).unwrap();
        let widget = region.widget(0).unwrap();
        assert_eq!(widget.style.font_size, Some(FontSize::from_px(27.0)));
        assert!(!widget.styled);
        assert!(widget.key.is_some());
    }

    #[test]
    fn test_widget_at_default_is_stripped() {
        let mut baselines = BaselineSizeRegistry::new();
        let mut keys = KeyAllocator::default();
        let mut region = Region::parse(&transform("[]", false));
        let blue = StyleChange::Color(CssColor::parse("blue").unwrap());
        for change in [size(1.5), blue] {
            let mut ctx = StyleContext {
                baselines: &mut baselines,
                keys: &mut keys,
                base_font_px: 18.0,
            };
            apply_to_widget(&mut region, 0, &change, &mut ctx).unwrap();
        }
        let ctx = ResetContext {
            baselines: &baselines,
            base_font_px: 18.0,
        };
        reset_widget(&mut region, 0, &ctx).unwrap();
        insta::assert_snapshot!(region.to_html(), @r#"<span class="blank-box space-1" data-blank-box="true" data-selectable="true" data-element-id="el-1"><span class="blank-text">____</span></span>"#);
    }

    #[test]
    fn test_span_keeps_material_baseline() {
        let mut baselines = BaselineSizeRegistry::new();
        let mut keys = KeyAllocator::default();
        let mut region = Region::parse(r#"<span style="font-size: 27px;">big</span> text"#);
        let range = Selection::new(0, 3);
        let mut ctx = StyleContext {
            baselines: &mut baselines,
            keys: &mut keys,
            base_font_px: 18.0,
        };
        apply_to_range(&mut region, range, &size(2.0), &mut ctx).unwrap();
        let ctx = ResetContext {
            baselines: &baselines,
            base_font_px: 18.0,
        };
        reset_range(&mut region, range, &ctx).unwrap();
        match region.nodes.first() {
            Some(Node::Span(span)) => {
                assert_eq!(span.style.font_size, Some(FontSize::from_px(27.0)));
            }
            other => panic!("expected span, got {other:?}"),
        }
    }

    #[test]
    fn test_reset_unstyled_range_is_noop() {
        let baselines = BaselineSizeRegistry::new();
        let ctx = ResetContext {
            baselines: &baselines,
            base_font_px: 18.0,
        };
        let mut region = Region::parse("plain words");
        let before = region.clone();
        reset_range(&mut region, Selection::new(0, 5), &ctx).unwrap();
        assert_eq!(region, before);
        assert!(reset_range(&mut region, Selection::new(3, 3), &ctx).is_err());
    }
}
