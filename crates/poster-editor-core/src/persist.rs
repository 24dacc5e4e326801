//! Canonicalization of region markup before it is stored on a card.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::markup::{Node, Region};

/// Runs of two or more literal whitespace characters. U+00A0 is excluded so
/// deliberate spacing around blanks survives.
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n\r]{2,}").expect("valid whitespace regex"));

/// Canonical copy of `region`, ready to become a card's markup field.
///
/// Collapses literal whitespace runs, removes widgets whose display text is
/// empty, and fills in `token` for widgets that lost their display element.
pub fn canonicalize(region: &Region, token: &str) -> Region {
    Region::new(canonical_nodes(&region.nodes, token))
}

/// Canonical markup for `region`.
pub fn canonical_markup(region: &Region, token: &str) -> String {
    canonicalize(region, token).to_html()
}

fn canonical_nodes(nodes: &[Node], token: &str) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => match WHITESPACE_RUN.replace_all(text, " ") {
                Cow::Borrowed(_) => out.push(node.clone()),
                Cow::Owned(collapsed) => out.push(Node::Text(collapsed)),
            },
            Node::Span(span) => {
                let mut span = span.clone();
                span.children = canonical_nodes(&span.children, token);
                out.push(Node::Span(span));
            }
            Node::Blank(widget) => match &widget.token {
                Some(text) if text.trim().is_empty() => {
                    tracing::trace!(target: "poster::persist", "dropping empty widget");
                }
                Some(_) => out.push(node.clone()),
                None => {
                    let mut widget = widget.clone();
                    widget.token = Some(token.to_string());
                    out.push(Node::Blank(widget));
                }
            },
            Node::LineBreak => out.push(Node::LineBreak),
        }
    }
    out
}
