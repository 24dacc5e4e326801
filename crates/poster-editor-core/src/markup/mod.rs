//! Typed markup tree for one display region.
//!
//! Region markup is parsed once into [`Node`]s and serialized back only when
//! pushed to the surface or persisted. Positions are measured in *units*:
//! every `char` of text is one unit, every placeholder widget and line break
//! is one unit. Styling never changes unit counts.

mod parse;
mod write;

use std::ops::Range;

pub use parse::has_widget_markup;

use crate::blank::BlankSize;
use crate::registry::ElementKey;
use crate::types::{CssColor, FontSize, StyleChange, StyleProperty};

/// Pixel base used when parsing `em` lengths out of stored markup.
pub const DEFAULT_BASE_FONT_PX: f64 = 18.0;

/// Inline styles the engine manages. Anything else is dropped on parse.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InlineStyle {
    pub color: Option<CssColor>,
    pub font_size: Option<FontSize>,
}

impl InlineStyle {
    pub fn from_change(change: &StyleChange) -> Self {
        let mut style = Self::default();
        style.set(change);
        style
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.font_size.is_none()
    }

    pub fn set(&mut self, change: &StyleChange) {
        match change {
            StyleChange::Color(color) => self.color = Some(color.clone()),
            StyleChange::FontSize(size) => self.font_size = Some(*size),
        }
    }

    pub fn has(&self, property: StyleProperty) -> bool {
        match property {
            StyleProperty::Color => self.color.is_some(),
            StyleProperty::FontSize => self.font_size.is_some(),
        }
    }

    /// Render as a `style` attribute value.
    pub fn to_css(&self, important: bool) -> String {
        let suffix = if important { " !important" } else { "" };
        let mut css = String::new();
        if let Some(color) = &self.color {
            css.push_str(&format!("color: {color}{suffix};"));
        }
        if let Some(size) = self.font_size {
            if !css.is_empty() {
                css.push(' ');
            }
            css.push_str(&format!("font-size: {size}{suffix};"));
        }
        css
    }

    /// Parse a `style` attribute, keeping only color and font-size.
    pub fn parse_css(css: &str) -> Self {
        let mut style = Self::default();
        for decl in css.split(';') {
            let Some((prop, value)) = decl.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let value = value.strip_suffix("!important").unwrap_or(value).trim();
            match prop.trim().to_ascii_lowercase().as_str() {
                "color" => style.color = CssColor::parse(value).ok(),
                "font-size" => style.font_size = FontSize::parse_css(value, DEFAULT_BASE_FONT_PX),
                _ => {}
            }
        }
        style
    }
}

/// Inline styling wrapper.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledSpan {
    pub style: InlineStyle,
    pub key: Option<ElementKey>,
    pub children: Vec<Node>,
}

impl StyledSpan {
    pub fn new(style: InlineStyle, children: Vec<Node>) -> Self {
        Self {
            style,
            key: None,
            children,
        }
    }
}

/// Placeholder widget for one `[]` blank. Atomic: one unit, no children.
#[derive(Clone, Debug, PartialEq)]
pub struct BlankWidget {
    pub size: BlankSize,
    /// Every property is written with `!important`.
    pub style: InlineStyle,
    pub key: Option<ElementKey>,
    /// `data-styled` marker.
    pub styled: bool,
    /// Text of the inner `.blank-text`, `None` when that element is missing.
    pub token: Option<String>,
}

impl BlankWidget {
    pub fn new(size: BlankSize, token: impl Into<String>) -> Self {
        Self {
            size,
            style: InlineStyle::default(),
            key: None,
            styled: false,
            token: Some(token.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Decoded text. Non-breaking spaces are kept as U+00A0.
    Text(String),
    Span(StyledSpan),
    Blank(BlankWidget),
    LineBreak,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn units(&self) -> usize {
        match self {
            Node::Text(text) => text.chars().count(),
            Node::Span(span) => units(&span.children),
            Node::Blank(_) | Node::LineBreak => 1,
        }
    }
}

pub fn units(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::units).sum()
}

pub fn contains_widget(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Blank(_) => true,
        Node::Span(span) => contains_widget(&span.children),
        _ => false,
    })
}

/// Child list of one display region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    pub nodes: Vec<Node>,
}

impl Region {
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut region = Self { nodes };
        region.normalize();
        region
    }

    /// Parse region markup. Unknown elements are dropped, their text kept.
    pub fn parse(html: &str) -> Self {
        Self::new(parse::parse_nodes(html))
    }

    pub fn to_html(&self) -> String {
        write::nodes_to_html(&self.nodes)
    }

    pub fn units(&self) -> usize {
        units(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rendered text: widgets contribute their token, breaks a newline.
    pub fn text_content(&self) -> String {
        fn walk(nodes: &[Node], out: &mut String) {
            for node in nodes {
                match node {
                    Node::Text(text) => out.push_str(text),
                    Node::Span(span) => walk(&span.children, out),
                    Node::Blank(widget) => out.push_str(widget.token.as_deref().unwrap_or("")),
                    Node::LineBreak => out.push('\n'),
                }
            }
        }
        let mut out = String::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// Text covered by a unit range, widgets written as `[]`.
    pub fn text_in(&self, range: Range<usize>) -> String {
        let (_, middle, _) = split_range(self.nodes.clone(), range);
        fn walk(nodes: &[Node], out: &mut String) {
            for node in nodes {
                match node {
                    Node::Text(text) => out.push_str(text),
                    Node::Span(span) => walk(&span.children, out),
                    Node::Blank(_) => out.push_str("[]"),
                    Node::LineBreak => out.push('\n'),
                }
            }
        }
        let mut out = String::new();
        walk(&middle, &mut out);
        out
    }

    pub fn widget_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    Node::Blank(_) => 1,
                    Node::Span(span) => count(&span.children),
                    _ => 0,
                })
                .sum()
        }
        count(&self.nodes)
    }

    /// The `ordinal`-th widget in document order.
    pub fn widget(&self, ordinal: usize) -> Option<&BlankWidget> {
        fn find<'a>(nodes: &'a [Node], remaining: &mut usize) -> Option<&'a BlankWidget> {
            for node in nodes {
                match node {
                    Node::Blank(widget) => {
                        if *remaining == 0 {
                            return Some(widget);
                        }
                        *remaining -= 1;
                    }
                    Node::Span(span) => {
                        if let Some(found) = find(&span.children, remaining) {
                            return Some(found);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        let mut remaining = ordinal;
        find(&self.nodes, &mut remaining)
    }

    pub fn widget_mut(&mut self, ordinal: usize) -> Option<&mut BlankWidget> {
        fn find<'a>(nodes: &'a mut [Node], remaining: &mut usize) -> Option<&'a mut BlankWidget> {
            for node in nodes {
                match node {
                    Node::Blank(widget) => {
                        if *remaining == 0 {
                            return Some(widget);
                        }
                        *remaining -= 1;
                    }
                    Node::Span(span) => {
                        if let Some(found) = find(&mut span.children, remaining) {
                            return Some(found);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        let mut remaining = ordinal;
        find(&mut self.nodes, &mut remaining)
    }

    /// Unit offset of the `ordinal`-th widget.
    pub fn widget_offset(&self, ordinal: usize) -> Option<usize> {
        fn find(nodes: &[Node], offset: &mut usize, remaining: &mut usize) -> bool {
            for node in nodes {
                match node {
                    Node::Blank(_) if *remaining == 0 => return true,
                    Node::Blank(_) => *remaining -= 1,
                    Node::Span(span) => {
                        if find(&span.children, offset, remaining) {
                            return true;
                        }
                        continue;
                    }
                    Node::Text(_) | Node::LineBreak => {}
                }
                *offset += node.units();
            }
            false
        }
        let mut offset = 0;
        let mut remaining = ordinal;
        find(&self.nodes, &mut offset, &mut remaining).then_some(offset)
    }

    /// Font size in effect at unit `offset`, taken from the innermost element
    /// that sets one. `None` means the region default.
    pub fn font_size_at(&self, offset: usize) -> Option<FontSize> {
        fn walk(nodes: &[Node], mut offset: usize, inherited: Option<FontSize>) -> Option<FontSize> {
            for node in nodes {
                let len = node.units();
                if offset >= len {
                    offset -= len;
                    continue;
                }
                return match node {
                    Node::Span(span) => walk(&span.children, offset, span.style.font_size.or(inherited)),
                    Node::Blank(widget) => widget.style.font_size.or(inherited),
                    Node::Text(_) | Node::LineBreak => inherited,
                };
            }
            None
        }
        walk(&self.nodes, offset, None)
    }

    /// Merge adjacent text, re-join split spans, drop empty or style-less wrappers.
    pub fn normalize(&mut self) {
        self.nodes = normalize(std::mem::take(&mut self.nodes));
    }
}

fn normalize(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        push_normalized(&mut out, node);
    }
    out
}

fn push_normalized(out: &mut Vec<Node>, node: Node) {
    match node {
        Node::Text(text) => {
            if text.is_empty() {
                return;
            }
            if let Some(Node::Text(prev)) = out.last_mut() {
                prev.push_str(&text);
            } else {
                out.push(Node::Text(text));
            }
        }
        Node::Span(mut span) => {
            span.children = normalize(span.children);
            if span.children.is_empty() {
                return;
            }
            if span.style.is_empty() && span.key.is_none() {
                for child in span.children {
                    push_normalized(out, child);
                }
                return;
            }
            if let Some(Node::Span(prev)) = out.last_mut() {
                if prev.style == span.style && prev.key == span.key {
                    let mut joined = std::mem::take(&mut prev.children);
                    joined.extend(span.children);
                    prev.children = normalize(joined);
                    return;
                }
            }
            out.push(Node::Span(span));
        }
        other => out.push(other),
    }
}

/// Split `nodes` so the left side holds exactly `at` units.
///
/// Spans cut in two are cloned on both sides with the same style and key.
pub fn split_at(nodes: Vec<Node>, at: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut remaining = at;
    for node in nodes {
        let len = node.units();
        if remaining == 0 {
            right.push(node);
        } else if len <= remaining {
            remaining -= len;
            left.push(node);
        } else {
            match node {
                Node::Text(text) => {
                    let byte = text
                        .char_indices()
                        .nth(remaining)
                        .map_or(text.len(), |(idx, _)| idx);
                    left.push(Node::Text(text[..byte].to_string()));
                    right.push(Node::Text(text[byte..].to_string()));
                }
                Node::Span(span) => {
                    let (l, r) = split_at(span.children, remaining);
                    left.push(Node::Span(StyledSpan {
                        style: span.style.clone(),
                        key: span.key.clone(),
                        children: l,
                    }));
                    right.push(Node::Span(StyledSpan {
                        style: span.style,
                        key: span.key,
                        children: r,
                    }));
                }
                // Atomic nodes are one unit wide, so they always fit above.
                atomic => right.push(atomic),
            }
            remaining = 0;
        }
    }
    (left, right)
}

/// Split into the nodes before, inside, and after `range`.
pub fn split_range(nodes: Vec<Node>, range: Range<usize>) -> (Vec<Node>, Vec<Node>, Vec<Node>) {
    let (before, rest) = split_at(nodes, range.start);
    let (middle, after) = split_at(rest, range.end.saturating_sub(range.start));
    (before, middle, after)
}

#[cfg(test)]
mod tests;
