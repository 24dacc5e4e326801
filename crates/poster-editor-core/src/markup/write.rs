//! Markup serialization. Output is always well-formed.

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{BlankWidget, Node, StyledSpan};
use crate::blank::{BLANK_BOX_CLASS, BLANK_TEXT_CLASS};

pub(super) fn nodes_to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => write_text(text, out),
            Node::Span(span) => write_span(span, out),
            Node::Blank(widget) => write_widget(widget, out),
            Node::LineBreak => out.push_str("<br>"),
        }
    }
}

/// Escape text; non-breaking spaces stay visible as `&nbsp;`.
fn write_text(text: &str, out: &mut String) {
    for (i, part) in encode_text(text).split('\u{a0}').enumerate() {
        if i > 0 {
            out.push_str("&nbsp;");
        }
        out.push_str(part);
    }
}

fn write_attr(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(value));
    out.push('"');
}

fn write_span(span: &StyledSpan, out: &mut String) {
    out.push_str("<span");
    if !span.style.is_empty() {
        write_attr("style", &span.style.to_css(false), out);
    }
    if let Some(key) = &span.key {
        write_attr("data-element-id", key.as_str(), out);
    }
    out.push('>');
    write_nodes(&span.children, out);
    out.push_str("</span>");
}

fn write_widget(widget: &BlankWidget, out: &mut String) {
    out.push_str("<span");
    write_attr(
        "class",
        &format!("{BLANK_BOX_CLASS} {}", widget.size.class_name()),
        out,
    );
    write_attr("data-blank-box", "true", out);
    write_attr("data-selectable", "true", out);
    if let Some(key) = &widget.key {
        write_attr("data-element-id", key.as_str(), out);
    }
    if widget.styled {
        write_attr("data-styled", "true", out);
    }
    if !widget.style.is_empty() {
        write_attr("style", &widget.style.to_css(true), out);
    }
    out.push('>');
    if let Some(token) = &widget.token {
        out.push_str("<span class=\"");
        out.push_str(BLANK_TEXT_CLASS);
        out.push_str("\">");
        write_text(token, out);
        out.push_str("</span>");
    }
    out.push_str("</span>");
}
