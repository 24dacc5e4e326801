//! Native selection reads and writes, in region units.
//!
//! A display element's units are its text characters, plus one per
//! `.blank-box` widget and one per `<br>`. DOM boundary points are mapped in
//! both directions by walking the display subtree in document order.

use poster_editor_core::{PlatformError, RawSelection, Selection};
use wasm_bindgen::JsCast;

use crate::dom_sync::{DISPLAY_SELECTOR, WIDGET_SELECTOR, region_for_display, widget_ordinal};

fn as_element(node: &web_sys::Node) -> Option<&web_sys::Element> {
    node.dyn_ref::<web_sys::Element>()
}

/// Widgets and line breaks count as a single unit and are never entered.
fn is_atomic(node: &web_sys::Node) -> bool {
    as_element(node).is_some_and(|el| {
        el.class_list().contains("blank-box") || el.tag_name().eq_ignore_ascii_case("br")
    })
}

fn is_text(node: &web_sys::Node) -> bool {
    node.node_type() == web_sys::Node::TEXT_NODE
}

fn children(node: &web_sys::Node) -> impl Iterator<Item = web_sys::Node> {
    let list = node.child_nodes();
    (0..list.length()).filter_map(move |i| list.item(i))
}

fn node_units(node: &web_sys::Node) -> usize {
    if is_text(node) {
        node.text_content().map_or(0, |t| t.chars().count())
    } else if is_atomic(node) {
        1
    } else {
        children(node).map(|child| node_units(&child)).sum()
    }
}

/// Chars covered by the first `utf16` code units of `text`.
fn chars_in_utf16_prefix(text: &str, utf16: usize) -> usize {
    let mut seen = 0;
    text.chars()
        .take_while(|c| {
            if seen >= utf16 {
                return false;
            }
            seen += c.len_utf16();
            true
        })
        .count()
}

fn utf16_len_of_chars(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

/// Unit offset of the DOM boundary point `(target, offset)` inside `root`.
pub fn unit_offset(root: &web_sys::Node, target: &web_sys::Node, offset: u32) -> Option<usize> {
    if !root.contains(Some(target)) {
        return None;
    }
    let mut acc = 0;
    walk_to(root, target, offset as usize, &mut acc).then_some(acc)
}

fn walk_to(node: &web_sys::Node, target: &web_sys::Node, offset: usize, acc: &mut usize) -> bool {
    if node.is_same_node(Some(target)) {
        if is_text(node) {
            let text = node.text_content().unwrap_or_default();
            *acc += chars_in_utf16_prefix(&text, offset);
        } else if is_atomic(node) {
            *acc += usize::from(offset > 0);
        } else {
            *acc += children(node)
                .take(offset)
                .map(|child| node_units(&child))
                .sum::<usize>();
        }
        return true;
    }
    if is_atomic(node) {
        // Points inside a widget collapse to its start.
        if node.contains(Some(target)) {
            return true;
        }
        *acc += 1;
        return false;
    }
    if is_text(node) {
        *acc += node_units(node);
        return false;
    }
    children(node).any(|child| walk_to(&child, target, offset, acc))
}

/// DOM boundary point for a unit offset inside `root`.
pub fn dom_position(root: &web_sys::Node, unit: usize) -> Option<(web_sys::Node, u32)> {
    let mut acc = 0;
    locate(root, unit, &mut acc).or_else(|| {
        (unit == acc).then(|| (root.clone(), root.child_nodes().length()))
    })
}

fn locate(node: &web_sys::Node, unit: usize, acc: &mut usize) -> Option<(web_sys::Node, u32)> {
    for (index, child) in children(node).enumerate() {
        if is_text(&child) {
            let text = child.text_content().unwrap_or_default();
            let len = text.chars().count();
            if unit <= *acc + len {
                let utf16 = utf16_len_of_chars(&text, unit - *acc);
                return Some((child, utf16 as u32));
            }
            *acc += len;
        } else if is_atomic(&child) {
            if unit == *acc {
                return Some((node.clone(), index as u32));
            }
            *acc += 1;
        } else if let Some(found) = locate(&child, unit, acc) {
            return Some(found);
        }
    }
    None
}

fn input_is_active(document: &web_sys::Document) -> bool {
    document.active_element().is_some_and(|el| {
        let tag = el.tag_name();
        tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea")
    })
}

fn enclosing_element(node: &web_sys::Node) -> Option<web_sys::Element> {
    match as_element(node) {
        Some(el) => Some(el.clone()),
        None => node.parent_element(),
    }
}

/// Read the document selection and map it onto a region.
pub fn read_selection() -> RawSelection {
    let Some(window) = web_sys::window() else {
        return RawSelection::Empty;
    };
    let Some(document) = window.document() else {
        return RawSelection::Empty;
    };
    if input_is_active(&document) {
        return RawSelection::InputField;
    }
    let Some(selection) = window.get_selection().ok().flatten() else {
        return RawSelection::Empty;
    };
    if selection.range_count() == 0 {
        return RawSelection::Empty;
    }
    let (Some(anchor), Some(focus)) = (selection.anchor_node(), selection.focus_node()) else {
        return RawSelection::Empty;
    };
    // The nearest element holding both ends decides the target, so a drag
    // that leaves a widget is a text selection.
    let common = selection
        .get_range_at(0)
        .and_then(|range| range.common_ancestor_container())
        .ok();
    let Some(common_el) = common.as_ref().and_then(enclosing_element) else {
        return RawSelection::Outside;
    };

    if let Some(widget) = common_el.closest(WIDGET_SELECTOR).ok().flatten() {
        let display = widget.closest(DISPLAY_SELECTOR).ok().flatten();
        let mapped = display.and_then(|display| {
            let region = region_for_display(&display)?;
            let ordinal = widget_ordinal(&display, &widget)?;
            Some(RawSelection::Widget { region, ordinal })
        });
        return mapped.unwrap_or(RawSelection::Outside);
    }

    if selection.is_collapsed() {
        return RawSelection::Empty;
    }

    let Some(display) = common_el.closest(DISPLAY_SELECTOR).ok().flatten() else {
        return RawSelection::Outside;
    };
    let Some(region) = region_for_display(&display) else {
        return RawSelection::Outside;
    };
    let root: &web_sys::Node = display.as_ref();
    let anchor_unit = unit_offset(root, &anchor, selection.anchor_offset());
    let head_unit = unit_offset(root, &focus, selection.focus_offset());
    let (Some(anchor_unit), Some(head_unit)) = (anchor_unit, head_unit) else {
        // Selection crosses out of the display.
        return RawSelection::Outside;
    };

    RawSelection::Text {
        region,
        range: Selection::new(anchor_unit, head_unit),
        text: String::from(selection.to_string()),
    }
}

/// Select `range` inside `display` again after its content was replaced.
pub fn restore_selection(display: &web_sys::Element, range: Selection) -> Result<(), PlatformError> {
    let window = web_sys::window().ok_or("no window")?;
    let selection = window
        .get_selection()
        .map_err(|e| format!("get_selection failed: {:?}", e))?
        .ok_or("no selection object")?;
    let root: &web_sys::Node = display.as_ref();
    let (anchor, anchor_offset) =
        dom_position(root, range.anchor).ok_or("anchor out of bounds")?;
    let (focus, focus_offset) = dom_position(root, range.head).ok_or("head out of bounds")?;
    selection
        .set_base_and_extent(&anchor, anchor_offset, &focus, focus_offset)
        .map_err(|e| format!("set_base_and_extent failed: {:?}", e))?;
    Ok(())
}

/// Drop the document selection, unless the user is typing in an input.
pub fn clear_native_selection() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if window.document().is_some_and(|doc| input_is_active(&doc)) {
        return;
    }
    if let Some(selection) = window.get_selection().ok().flatten() {
        let _ = selection.remove_all_ranges();
    }
}
