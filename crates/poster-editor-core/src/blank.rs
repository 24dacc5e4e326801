//! Blank transformer: `[ ]` micro-syntax to placeholder-widget markup.
//!
//! A bracket pair with zero or more interior whitespace characters becomes a
//! widget sized by that count. Markup that already holds a widget passes
//! through untouched, which keeps repeated renders idempotent.

use crate::markup::{BlankWidget, Node, Region, has_widget_markup};
use crate::sanitize::{MAX_INPUT_LEN, sanitize_with_limit};

pub const BLANK_BOX_CLASS: &str = "blank-box";
pub const BLANK_TEXT_CLASS: &str = "blank-text";
pub const DEFAULT_BLANK_TOKEN: &str = "____";

/// Discrete widget size, keyed by interior whitespace count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlankSize {
    /// `[]`
    One,
    /// `[ ]`
    Two,
    /// two or three spaces
    Three,
    /// four or five spaces
    Four,
    /// six or more
    FivePlus,
}

impl BlankSize {
    pub fn from_interior_spaces(count: usize) -> Self {
        match count {
            0 => BlankSize::One,
            1 => BlankSize::Two,
            2 | 3 => BlankSize::Three,
            4 | 5 => BlankSize::Four,
            _ => BlankSize::FivePlus,
        }
    }

    /// Bucket number, 1 through 5.
    pub fn bucket(self) -> u8 {
        match self {
            BlankSize::One => 1,
            BlankSize::Two => 2,
            BlankSize::Three => 3,
            BlankSize::Four => 4,
            BlankSize::FivePlus => 5,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            BlankSize::One => "space-1",
            BlankSize::Two => "space-2",
            BlankSize::Three => "space-3",
            BlankSize::Four => "space-4",
            BlankSize::FivePlus => "space-5-plus",
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "space-1" => Some(BlankSize::One),
            "space-2" => Some(BlankSize::Two),
            "space-3" => Some(BlankSize::Three),
            "space-4" => Some(BlankSize::Four),
            "space-5-plus" => Some(BlankSize::FivePlus),
            _ => None,
        }
    }
}

/// Transformer settings.
#[derive(Clone, Debug)]
pub struct BlankTransformer {
    pub max_input_len: usize,
    pub token: String,
}

impl Default for BlankTransformer {
    fn default() -> Self {
        Self {
            max_input_len: MAX_INPUT_LEN,
            token: DEFAULT_BLANK_TOKEN.to_string(),
        }
    }
}

/// Transform with default settings.
pub fn transform(text: &str, is_title: bool) -> String {
    BlankTransformer::default().transform(text, is_title)
}

impl BlankTransformer {
    pub fn transform(&self, text: &str, is_title: bool) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        if is_title {
            return html_escape::encode_text(text).into_owned();
        }
        if has_widget_markup(text) {
            return text.to_string();
        }
        let clean = sanitize_with_limit(text, self.max_input_len);
        let plain = html_escape::decode_html_entities(&clean);
        Region::new(self.blank_nodes(&plain)).to_html()
    }

    /// Split plain text into text runs, widgets and line breaks.
    ///
    /// Remaining spaces become non-breaking so runs of spaces survive HTML
    /// whitespace collapsing.
    fn blank_nodes(&self, text: &str) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut run = String::new();
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '[' {
                let interior = chars[i + 1..]
                    .iter()
                    .take_while(|c| c.is_whitespace())
                    .count();
                if chars.get(i + 1 + interior) == Some(&']') {
                    flush_run(&mut run, &mut nodes);
                    nodes.push(Node::Blank(BlankWidget::new(
                        BlankSize::from_interior_spaces(interior),
                        self.token.as_str(),
                    )));
                    i += interior + 2;
                    continue;
                }
            }
            match c {
                ' ' => run.push('\u{a0}'),
                '\n' => {
                    flush_run(&mut run, &mut nodes);
                    nodes.push(Node::LineBreak);
                }
                '\r' => {}
                other => run.push(other),
            }
            i += 1;
        }
        flush_run(&mut run, &mut nodes);
        nodes
    }
}

fn flush_run(run: &mut String, nodes: &mut Vec<Node>) {
    if !run.is_empty() {
        nodes.push(Node::Text(std::mem::take(run)));
    }
}
