//! Markup parsing via the html5ever tokenizer.
//!
//! Only the shapes the engine writes are recognised: styled spans,
//! placeholder widgets and `<br>`. Any other element is transparent (its text
//! survives, the element does not).

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use super::{BlankWidget, InlineStyle, Node, StyledSpan};
use crate::blank::{BLANK_BOX_CLASS, BLANK_TEXT_CLASS, BlankSize};
use crate::registry::ElementKey;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug)]
enum HtmlToken {
    StartTag(String, Vec<(String, String)>),
    EndTag(String),
    Text(String),
}

struct HtmlSink {
    tokens: RefCell<Vec<HtmlToken>>,
}

impl TokenSink for HtmlSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => {
                let name = tag.name.to_string();
                let attrs: Vec<(String, String)> = tag
                    .attrs
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                match tag.kind {
                    TagKind::StartTag => self
                        .tokens
                        .borrow_mut()
                        .push(HtmlToken::StartTag(name, attrs)),
                    TagKind::EndTag => self.tokens.borrow_mut().push(HtmlToken::EndTag(name)),
                }
            }
            Token::CharacterTokens(s) => {
                self.tokens.borrow_mut().push(HtmlToken::Text(s.to_string()));
            }
            Token::ParseError(err) => {
                tracing::trace!(target: "poster::markup", %err, "markup parse error");
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

fn tokenize(html: &str) -> Vec<HtmlToken> {
    let sink = HtmlSink {
        tokens: RefCell::new(Vec::new()),
    };
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let mut queue = BufferQueue::default();
    queue.push_back(StrTendril::from(html));
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();
    tokenizer.sink.tokens.into_inner()
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn has_class(attrs: &[(String, String)], class: &str) -> bool {
    attr(attrs, "class").is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
}

/// Structural check: does `html` contain a placeholder widget element?
pub fn has_widget_markup(html: &str) -> bool {
    tokenize(html).iter().any(|token| match token {
        HtmlToken::StartTag(name, attrs) => name == "span" && has_class(attrs, BLANK_BOX_CLASS),
        _ => false,
    })
}

enum Frame {
    Root(Vec<Node>),
    Span(StyledSpan),
    Blank(BlankWidget),
    BlankText(String),
    /// Unknown element: children are handed to the parent on close.
    Transparent { tag: String, children: Vec<Node> },
}

impl Frame {
    fn tag(&self) -> Option<&str> {
        match self {
            Frame::Root(_) => None,
            Frame::Span(_) | Frame::Blank(_) | Frame::BlankText(_) => Some("span"),
            Frame::Transparent { tag, .. } => Some(tag),
        }
    }

    fn push(&mut self, node: Node) {
        let children = match self {
            Frame::Root(children)
            | Frame::Transparent { children, .. }
            | Frame::Span(StyledSpan { children, .. }) => children,
            Frame::BlankText(text) => {
                if let Node::Text(t) = node {
                    text.push_str(&t);
                }
                return;
            }
            // Widgets are atomic; stray content inside them is dropped.
            Frame::Blank(_) => return,
        };
        if let (Node::Text(t), Some(Node::Text(prev))) = (&node, children.last_mut()) {
            prev.push_str(t);
            return;
        }
        children.push(node);
    }
}

fn close(frame: Frame, parent: &mut Frame) {
    match frame {
        Frame::Root(children) | Frame::Transparent { children, .. } => {
            for child in children {
                parent.push(child);
            }
        }
        Frame::Span(span) => parent.push(Node::Span(span)),
        Frame::Blank(widget) => parent.push(Node::Blank(widget)),
        Frame::BlankText(text) => {
            if let Frame::Blank(widget) = parent {
                widget.token.get_or_insert_with(String::new).push_str(&text);
            }
        }
    }
}

fn open_span(attrs: &[(String, String)], parent: &Frame) -> Frame {
    if matches!(parent, Frame::Blank(_)) {
        if has_class(attrs, BLANK_TEXT_CLASS) {
            return Frame::BlankText(String::new());
        }
        return Frame::Transparent {
            tag: "span".to_string(),
            children: Vec::new(),
        };
    }
    let style = attr(attrs, "style")
        .map(InlineStyle::parse_css)
        .unwrap_or_default();
    let key = attr(attrs, "data-element-id")
        .filter(|key| !key.is_empty())
        .map(ElementKey::new);
    if has_class(attrs, BLANK_BOX_CLASS) {
        let size = attr(attrs, "class")
            .and_then(|classes| classes.split_ascii_whitespace().find_map(BlankSize::from_class))
            .unwrap_or(BlankSize::One);
        return Frame::Blank(BlankWidget {
            size,
            style,
            key,
            styled: attr(attrs, "data-styled") == Some("true"),
            token: None,
        });
    }
    Frame::Span(StyledSpan {
        style,
        key,
        children: Vec::new(),
    })
}

pub(super) fn parse_nodes(html: &str) -> Vec<Node> {
    let mut stack = vec![Frame::Root(Vec::new())];
    for token in tokenize(html) {
        match token {
            HtmlToken::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.push(Node::Text(text));
                }
            }
            HtmlToken::StartTag(name, attrs) => {
                let Some(top) = stack.last_mut() else {
                    continue;
                };
                if name == "br" {
                    top.push(Node::LineBreak);
                } else if name == "span" {
                    let frame = open_span(&attrs, top);
                    stack.push(frame);
                } else if !VOID_ELEMENTS.contains(&name.as_str()) {
                    stack.push(Frame::Transparent {
                        tag: name,
                        children: Vec::new(),
                    });
                }
            }
            HtmlToken::EndTag(name) => {
                // Close everything above the nearest matching element; stray
                // end tags are ignored.
                let Some(depth) = stack.iter().rposition(|f| f.tag() == Some(name.as_str())) else {
                    continue;
                };
                while stack.len() > depth {
                    let Some(frame) = stack.pop() else { break };
                    let Some(parent) = stack.last_mut() else { break };
                    close(frame, parent);
                }
            }
        }
    }
    while stack.len() > 1 {
        let Some(frame) = stack.pop() else { break };
        let Some(parent) = stack.last_mut() else { break };
        close(frame, parent);
    }
    match stack.pop() {
        Some(Frame::Root(children)) => children,
        _ => Vec::new(),
    }
}
