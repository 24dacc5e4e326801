//! Style applicator.
//!
//! Each operation maps a style change over a slice of the region tree and
//! rebuilds it. Three shapes are handled: a lone widget, a text range with no
//! widgets, and a range that mixes text and widgets.

use crate::error::EditorError;
use crate::markup::{
    BlankWidget, InlineStyle, Node, Region, StyledSpan, contains_widget, split_range, units,
};
use crate::registry::{BaselineSizeRegistry, KeyAllocator};
use crate::types::{FontSize, Selection, StyleChange};

/// Which branch an apply went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyBranch {
    Widget,
    Text,
    Mixed,
}

/// Mutable engine state an apply may touch besides the tree.
pub struct StyleContext<'a> {
    pub baselines: &'a mut BaselineSizeRegistry,
    pub keys: &'a mut KeyAllocator,
    pub base_font_px: f64,
}

impl StyleContext<'_> {
    pub fn default_size(&self) -> FontSize {
        FontSize::from_px(self.base_font_px)
    }

    /// Set `change` on a widget with highest priority and mark it styled.
    fn stamp_widget(
        &mut self,
        widget: &mut BlankWidget,
        change: &StyleChange,
        inherited: Option<FontSize>,
    ) {
        let key = widget
            .key
            .get_or_insert_with(|| self.keys.allocate())
            .clone();
        if matches!(change, StyleChange::FontSize(_)) {
            let current = widget
                .style
                .font_size
                .or(inherited)
                .unwrap_or_else(|| self.default_size());
            self.baselines.record_if_absent(&key, current);
        }
        widget.style.set(change);
        widget.styled = true;
    }

    /// Set `change` on a span and push it into every nested span and widget.
    ///
    /// `inherited` is the size in effect before this apply; descendants
    /// record their baselines against it, never against `change`.
    fn stamp_span(&mut self, span: &mut StyledSpan, change: &StyleChange, inherited: Option<FontSize>) {
        let before = span.style.font_size.or(inherited);
        if matches!(change, StyleChange::FontSize(_)) {
            let key = span.key.get_or_insert_with(|| self.keys.allocate()).clone();
            self.baselines
                .record_if_absent(&key, before.unwrap_or_else(|| self.default_size()));
        }
        span.style.set(change);
        self.stamp_descendants(&mut span.children, change, before);
    }

    fn stamp_descendants(
        &mut self,
        nodes: &mut [Node],
        change: &StyleChange,
        inherited: Option<FontSize>,
    ) {
        for node in nodes {
            match node {
                Node::Span(span) => self.stamp_span(span, change, inherited),
                Node::Blank(widget) => self.stamp_widget(widget, change, inherited),
                Node::Text(_) | Node::LineBreak => {}
            }
        }
    }
}

/// Style the `ordinal`-th widget of `region`.
pub fn apply_to_widget(
    region: &mut Region,
    ordinal: usize,
    change: &StyleChange,
    ctx: &mut StyleContext<'_>,
) -> Result<ApplyBranch, EditorError> {
    let mut remaining = ordinal;
    let (widget, inherited) = find_widget(&mut region.nodes, &mut remaining, None)
        .ok_or_else(|| EditorError::structural(format!("no widget at ordinal {ordinal}")))?;
    ctx.stamp_widget(widget, change, inherited);
    tracing::trace!(target: "poster::apply", ordinal, ?change, "styled widget");
    Ok(ApplyBranch::Widget)
}

fn find_widget<'a>(
    nodes: &'a mut [Node],
    remaining: &mut usize,
    inherited: Option<FontSize>,
) -> Option<(&'a mut BlankWidget, Option<FontSize>)> {
    for node in nodes {
        match node {
            Node::Blank(widget) => {
                if *remaining == 0 {
                    return Some((widget, inherited));
                }
                *remaining -= 1;
            }
            Node::Span(span) => {
                let size = span.style.font_size.or(inherited);
                if let Some(found) = find_widget(&mut span.children, remaining, size) {
                    return Some(found);
                }
            }
            Node::Text(_) | Node::LineBreak => {}
        }
    }
    None
}

/// Style exactly the units in `range`.
///
/// When the range is already covered by a single span (a previous apply on
/// the same selection, or a selection inside one styled run) that span is
/// restyled in place, which keeps every property not being set now.
/// Otherwise the range is wrapped in a new span. Nested spans and widgets
/// receive the property as well, widgets with `!important`.
pub fn apply_to_range(
    region: &mut Region,
    range: Selection,
    change: &StyleChange,
    ctx: &mut StyleContext<'_>,
) -> Result<ApplyBranch, EditorError> {
    let total = region.units();
    if range.is_collapsed() || range.end() > total {
        return Err(EditorError::structural(format!(
            "range {}..{} outside region of {total} units",
            range.start(),
            range.end()
        )));
    }
    let (mut before, mut middle, mut after) = split_range(region.nodes.clone(), range.to_range());
    if units(&middle) != range.len() {
        return Err(EditorError::structural("range split did not cover the selection"));
    }

    let branch = if contains_widget(&middle) {
        ApplyBranch::Mixed
    } else {
        preserve_edge_spaces(&mut before, &mut middle, &mut after);
        ApplyBranch::Text
    };

    let styled = if let [Node::Span(_)] = middle.as_slice() {
        if let Some(Node::Span(span)) = middle.first_mut() {
            ctx.stamp_span(span, change, None);
        }
        middle
    } else {
        let mut wrapper = StyledSpan::new(InlineStyle::default(), middle);
        ctx.stamp_span(&mut wrapper, change, None);
        vec![Node::Span(wrapper)]
    };

    let mut nodes = before;
    nodes.extend(styled);
    nodes.extend(after);
    *region = Region::new(nodes);
    tracing::trace!(
        target: "poster::apply",
        start = range.start(),
        end = range.end(),
        ?branch,
        ?change,
        "styled range"
    );
    Ok(branch)
}

/// Turn plain spaces touching the selection edges into U+00A0 so wrapping
/// does not let HTML whitespace collapsing eat them.
fn preserve_edge_spaces(before: &mut [Node], middle: &mut [Node], after: &mut [Node]) {
    if let Some(text) = edge_text(middle, Edge::First) {
        *text = harden(text, Edge::First);
    }
    if let Some(text) = edge_text(middle, Edge::Last) {
        *text = harden(text, Edge::Last);
    }
    if let Some(text) = edge_text(before, Edge::Last) {
        *text = harden(text, Edge::Last);
    }
    if let Some(text) = edge_text(after, Edge::First) {
        *text = harden(text, Edge::First);
    }
}

#[derive(Clone, Copy)]
enum Edge {
    First,
    Last,
}

fn edge_text(nodes: &mut [Node], edge: Edge) -> Option<&mut String> {
    let node = match edge {
        Edge::First => nodes.first_mut()?,
        Edge::Last => nodes.last_mut()?,
    };
    match node {
        Node::Text(text) => Some(text),
        Node::Span(span) => edge_text(&mut span.children, edge),
        Node::Blank(_) | Node::LineBreak => None,
    }
}

fn harden(text: &str, edge: Edge) -> String {
    let (trimmed, count) = match edge {
        Edge::First => {
            let rest = text.trim_start_matches(' ');
            (rest, text.len() - rest.len())
        }
        Edge::Last => {
            let rest = text.trim_end_matches(' ');
            (rest, text.len() - rest.len())
        }
    };
    let spaces = "\u{a0}".repeat(count);
    match edge {
        Edge::First => format!("{spaces}{trimmed}"),
        Edge::Last => format!("{trimmed}{spaces}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blank::transform;
    use crate::types::CssColor;

    struct Fixture {
        baselines: BaselineSizeRegistry,
        keys: KeyAllocator,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                baselines: BaselineSizeRegistry::new(),
                keys: KeyAllocator::default(),
            }
        }

        fn ctx(&mut self) -> StyleContext<'_> {
            StyleContext {
                baselines: &mut self.baselines,
                keys: &mut self.keys,
                base_font_px: 18.0,
            }
        }
    }

    fn red() -> StyleChange {
        StyleChange::Color(CssColor::parse("red").unwrap())
    }

    fn size(scale: f64) -> StyleChange {
        StyleChange::FontSize(FontSize::from_scale(scale, 18.0))
    }

    #[test]
    fn test_text_branch_wraps_range() {
        let mut fx = Fixture::new();
        let mut region = Region::parse("I like cats");
        let branch = apply_to_range(&mut region, Selection::new(2, 6), &red(), &mut fx.ctx()).unwrap();
        assert_eq!(branch, ApplyBranch::Text);
        insta::assert_snapshot!(region.to_html(), @r#"I&nbsp;<span style="color: red;">like</span>&nbsp;cats"#);
        assert_eq!(region.units(), 11);
    }

    #[test]
    fn test_chained_apply_composes() {
        let mut fx = Fixture::new();
        let mut region = Region::parse(&transform("I can [] swim", false));
        let range = Selection::new(2, 5);
        apply_to_range(&mut region, range, &red(), &mut fx.ctx()).unwrap();
        apply_to_range(&mut region, range, &size(1.5), &mut fx.ctx()).unwrap();
        insta::assert_snapshot!(region.to_html(), @r#"I&nbsp;<span style="color: red; font-size: 27px;" data-element-id="el-1">can</span>&nbsp;<span class="blank-box space-1" data-blank-box="true" data-selectable="true"><span class="blank-text">____</span></span>&nbsp;swim"#);
        assert_eq!(fx.baselines.len(), 1);
    }

    #[test]
    fn test_inherits_other_property_inside_styled_run() {
        let mut fx = Fixture::new();
        let mut region = Region::parse(r#"<span style="font-size: 27px;">big words</span>"#);
        apply_to_range(&mut region, Selection::new(0, 3), &red(), &mut fx.ctx()).unwrap();
        match region.nodes.first() {
            Some(Node::Span(span)) => {
                assert_eq!(span.style.font_size, Some(FontSize::from_px(27.0)));
                assert!(span.style.color.is_some());
            }
            other => panic!("expected span, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_branch_styles_widget() {
        let mut fx = Fixture::new();
        let mut region = Region::parse(&transform("I can [] swim", false));
        let blue = StyleChange::Color(CssColor::parse("#3B82F6").unwrap());
        let branch = apply_to_range(&mut region, Selection::new(0, 12), &blue, &mut fx.ctx()).unwrap();
        assert_eq!(branch, ApplyBranch::Mixed);
        let widget = region.widget(0).unwrap();
        assert_eq!(widget.style.color.as_ref().map(|c| c.as_str()), Some("#3B82F6"));
        assert!(widget.styled);
        assert!(region.to_html().contains("space-1"));
        assert!(region.to_html().contains("color: #3B82F6 !important;"));
    }

    #[test]
    fn test_mixed_font_size_records_sizes_before_apply() {
        let mut fx = Fixture::new();
        let mut region = Region::parse(&format!(
            r#"I can {} <span style="font-size: 27px;">swim {}</span>"#,
            transform("[]", false),
            transform("[]", false)
        ));
        let total = region.units();
        apply_to_range(&mut region, Selection::new(0, total), &size(2.0), &mut fx.ctx()).unwrap();
        let first = region.widget(0).unwrap();
        let second = region.widget(1).unwrap();
        assert_eq!(first.style.font_size, Some(FontSize::from_px(36.0)));
        assert_eq!(second.style.font_size, Some(FontSize::from_px(36.0)));
        let baseline = |widget: &BlankWidget| fx.baselines.get(widget.key.as_ref().unwrap());
        assert_eq!(baseline(first), Some(FontSize::from_px(18.0)));
        assert_eq!(baseline(second), Some(FontSize::from_px(27.0)));
    }

    #[test]
    fn test_widget_branch_records_baseline_once() {
        let mut fx = Fixture::new();
        let mut region = Region::parse(&transform("a [ ] b", false));
        apply_to_widget(&mut region, 0, &size(1.5), &mut fx.ctx()).unwrap();
        apply_to_widget(&mut region, 0, &size(2.0), &mut fx.ctx()).unwrap();
        let widget = region.widget(0).unwrap();
        let key = widget.key.clone().unwrap();
        assert_eq!(widget.style.font_size, Some(FontSize::from_px(36.0)));
        assert_eq!(fx.baselines.get(&key), Some(FontSize::from_px(18.0)));
    }

    #[test]
    fn test_widget_baseline_uses_enclosing_size() {
        let mut fx = Fixture::new();
        let mut region = Region::parse(&format!(
            r#"<span style="font-size: 27px;">{}</span>"#,
            transform("[]", false)
        ));
        apply_to_widget(&mut region, 0, &size(2.0), &mut fx.ctx()).unwrap();
        let key = region.widget(0).unwrap().key.clone().unwrap();
        assert_eq!(fx.baselines.get(&key), Some(FontSize::from_px(27.0)));
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let mut fx = Fixture::new();
        let mut region = Region::parse("abc");
        let before = region.clone();
        let err = apply_to_range(&mut region, Selection::new(1, 9), &red(), &mut fx.ctx()).unwrap_err();
        assert!(matches!(err, EditorError::StructuralMutation(_)));
        assert_eq!(region, before);
        assert!(apply_to_widget(&mut region, 0, &red(), &mut fx.ctx()).is_err());
    }

    #[test]
    fn test_edge_spaces_hardened() {
        let mut fx = Fixture::new();
        let mut region = Region::parse("one two three");
        apply_to_range(&mut region, Selection::new(3, 8), &red(), &mut fx.ctx()).unwrap();
        assert_eq!(region.text_content(), "one\u{a0}two\u{a0}three");
        assert_eq!(region.units(), 13);
    }
}
