//! Tracing setup and the in-memory log buffer attached to bug reports.
//!
//! Console output goes through `tracing_wasm::WASMLayer`. Alongside it,
//! [`LogCaptureLayer`] keeps the most recent editor events in a bounded
//! buffer so the host page can offer them for copy-paste.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

const MAX_ENTRIES: usize = 100;

/// Target prefixes that are buffered. Everything else only reaches the console.
const CAPTURED_PREFIXES: &[&str] = &["poster::", "poster_editor"];

const BUFFER_MIN_LEVEL: Level = Level::DEBUG;

thread_local! {
    static LOG_BUFFER: RefCell<VecDeque<String>> =
        RefCell::new(VecDeque::with_capacity(MAX_ENTRIES));
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_tracing() {
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let reg = Registry::default().with(wasm_layer).with(LogCaptureLayer);

    let _ = set_global_default(reg);
}

/// Layer that copies editor events into the bug-report buffer.
pub struct LogCaptureLayer;

impl<S: Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        if level > BUFFER_MIN_LEVEL || !is_captured(target) {
            return;
        }

        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));

        push(format_line(level, target, &message));
    }
}

fn is_captured(target: &str) -> bool {
    CAPTURED_PREFIXES
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

fn format_line(level: Level, target: &str, message: &str) -> String {
    format!("[{level}] {target}: {message}")
}

fn push(line: String) {
    LOG_BUFFER.with(|buf| {
        let mut buf = buf.borrow_mut();
        if buf.len() >= MAX_ENTRIES {
            buf.pop_front();
        }
        buf.push_back(line);
    });
}

/// Flattens an event's fields into `message, key=value, ...`.
struct MessageVisitor<'a>(&'a mut String);

impl MessageVisitor<'_> {
    fn separate(&mut self) {
        if !self.0.is_empty() {
            self.0.push_str(", ");
        }
    }
}

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, "{:?}", value);
        } else {
            self.separate();
            let _ = write!(self.0, "{}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        } else {
            self.separate();
            let _ = write!(self.0, "{}={}", field.name(), value);
        }
    }
}

/// All buffered entries, oldest first, one per line.
pub fn get_logs() -> String {
    LOG_BUFFER.with(|buf| {
        buf.borrow()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn clear_logs() {
    LOG_BUFFER.with(|buf| buf.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_editor_targets_are_captured() {
        assert!(is_captured("poster::apply"));
        assert!(is_captured("poster_editor_browser::events"));
        assert!(!is_captured("html5ever::tokenizer"));
    }

    #[test]
    fn buffer_drops_oldest_entries() {
        clear_logs();
        for i in 0..MAX_ENTRIES + 5 {
            push(format_line(Level::INFO, "poster::engine", &format!("entry {i}")));
        }
        let logs = get_logs();
        assert_eq!(logs.lines().count(), MAX_ENTRIES);
        assert!(logs.starts_with("[INFO] poster::engine: entry 5"));
        clear_logs();
        assert!(get_logs().is_empty());
    }
}
