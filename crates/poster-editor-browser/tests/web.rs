//! WASM browser tests for poster-editor-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use poster_editor_browser::cursor::{dom_position, unit_offset};
use poster_editor_browser::{
    BrowserSurface, CardId, EditorChrome, Field, PointerTarget, RawSelection, RegionId,
    RegionSurface, Selection, apply_chrome, classify_target, read_selection, restore_selection,
};

const WIDGET: &str = r#"<span class="blank-box space-3" data-blank-box="true" data-selectable="true"><span class="blank-text">____</span></span>"#;

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// One card whose pattern reads `I love [W] to` with `love` colored.
fn mount_fixture() -> web_sys::Element {
    let body = document().body().unwrap();
    body.set_inner_html(&format!(
        r#"<div id="text-editor-toolbar"><button id="toolbar-color-btn">Color</button></div>
        <div id="color-palette"></div>
        <div class="pattern-card" id="pattern-1">
          <div class="pattern-display">I <span style="color: red;">love</span> {WIDGET} to</div>
          <div class="examples-display empty"></div>
        </div>
        <p id="outside">elsewhere</p>"#
    ));
    document()
        .query_selector("#pattern-1 .pattern-display")
        .unwrap()
        .unwrap()
}

fn pattern() -> RegionId {
    RegionId::new(CardId(1), Field::Pattern)
}

fn child(node: &web_sys::Node, index: u32) -> web_sys::Node {
    node.child_nodes().item(index).unwrap()
}

// === Unit mapping ===

#[wasm_bindgen_test]
fn test_unit_offset_counts_widget_as_one() {
    let display = mount_fixture();
    let root: &web_sys::Node = display.as_ref();

    // "I " | <span>love</span> | " " | widget | " to"
    let lead = child(root, 0);
    let love = child(&child(root, 1), 0);
    let tail = child(root, 4);

    assert_eq!(unit_offset(root, &lead, 2), Some(2));
    assert_eq!(unit_offset(root, &love, 3), Some(5));
    assert_eq!(unit_offset(root, &tail, 1), Some(9));
    // Container boundary after the widget.
    assert_eq!(unit_offset(root, root, 4), Some(8));
    // A point inside the widget collapses to its start.
    let inside = child(&child(&child(root, 3), 0), 0);
    assert_eq!(unit_offset(root, &inside, 2), Some(7));

    let outside = document().get_element_by_id("outside").unwrap();
    assert_eq!(unit_offset(root, outside.as_ref(), 0), None);
}

#[wasm_bindgen_test]
fn test_dom_position_inverts_unit_offset() {
    let display = mount_fixture();
    let root: &web_sys::Node = display.as_ref();
    for unit in [0, 2, 4, 6, 7, 8, 11] {
        let (node, offset) = dom_position(root, unit).unwrap();
        assert_eq!(unit_offset(root, &node, offset), Some(unit), "unit {unit}");
    }
    assert!(dom_position(root, 12).is_none());
}

// === Selection API ===

#[wasm_bindgen_test]
fn test_read_selection_maps_text_range() {
    let display = mount_fixture();
    restore_selection(&display, Selection::new(2, 6)).unwrap();
    match read_selection() {
        RawSelection::Text {
            region,
            range,
            text,
        } => {
            assert_eq!(region, pattern());
            assert_eq!(range, Selection::new(2, 6));
            assert_eq!(text, "love");
        }
        other => panic!("expected text selection, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn test_read_selection_inside_widget() {
    let display = mount_fixture();
    let widget = display.query_selector(".blank-box").unwrap().unwrap();
    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    selection.select_all_children(&widget).unwrap();
    assert_eq!(
        read_selection(),
        RawSelection::Widget {
            region: pattern(),
            ordinal: 0
        }
    );
}

#[wasm_bindgen_test]
fn test_read_selection_drag_out_of_widget_is_text() {
    let display = mount_fixture();
    let root: &web_sys::Node = display.as_ref();
    let inside = child(&child(&child(root, 3), 0), 0);
    let tail = child(root, 4);
    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    selection
        .set_base_and_extent(&inside, 1, &tail, 2)
        .unwrap();
    match read_selection() {
        RawSelection::Text { region, range, .. } => {
            assert_eq!(region, pattern());
            // The widget start through " t".
            assert_eq!(range, Selection::new(7, 10));
        }
        other => panic!("expected text selection, got {other:?}"),
    }
}

// === Surface ===

#[wasm_bindgen_test]
fn test_surface_mount_and_replace() {
    mount_fixture();
    let mut surface = BrowserSurface::new().unwrap();
    let examples = RegionId::new(CardId(1), Field::Examples);
    assert!(surface.is_attached(pattern()));
    assert!(!surface.is_attached(RegionId::new(CardId(2), Field::Pattern)));

    surface.mount_markup(examples, "a&nbsp;b").unwrap();
    let element = surface.region_element(examples).unwrap();
    assert!(!element.class_list().contains("empty"));
    assert_eq!(element.text_content().unwrap(), "a\u{a0}b");

    surface
        .mount_placeholder(examples, Field::Examples.placeholder())
        .unwrap();
    assert!(element.class_list().contains("empty"));

    surface.replace_region(pattern(), "x").unwrap();
    assert_eq!(
        surface.region_element(pattern()).unwrap().inner_html(),
        "x"
    );

    let card = document().get_element_by_id("pattern-1").unwrap();
    card.remove();
    assert!(!surface.is_attached(pattern()));
    assert!(surface.replace_region(pattern(), "y").is_err());
}

#[wasm_bindgen_test]
fn test_apply_chrome_toggles_controls() {
    mount_fixture();
    let document = document();
    let chrome = EditorChrome {
        toolbar: true,
        palette: true,
        font_controls: false,
    };
    apply_chrome(&document, chrome);
    let toolbar = document.get_element_by_id("text-editor-toolbar").unwrap();
    let palette = document.get_element_by_id("color-palette").unwrap();
    assert!(toolbar.class_list().contains("active"));
    assert!(palette.class_list().contains("show"));

    apply_chrome(&document, EditorChrome::default());
    assert!(!toolbar.class_list().contains("active"));
    assert!(!palette.class_list().contains("show"));
}

// === Targets ===

#[wasm_bindgen_test]
fn test_classify_targets() {
    let display = mount_fixture();
    let document = document();
    let target = |el: &web_sys::Element| classify_target(el.unchecked_ref());

    let widget_text = display.query_selector(".blank-text").unwrap().unwrap();
    assert_eq!(
        target(&widget_text),
        PointerTarget::Widget {
            region: pattern(),
            ordinal: 0
        }
    );
    let love = display.query_selector("span").unwrap().unwrap();
    assert_eq!(target(&love), PointerTarget::Region(pattern()));

    let button = document.get_element_by_id("toolbar-color-btn").unwrap();
    assert_eq!(target(&button), PointerTarget::Chrome);

    let outside = document.get_element_by_id("outside").unwrap();
    assert_eq!(target(&outside), PointerTarget::Elsewhere);
}
