//! Document and toolbar listeners that drive the engine.
//!
//! Every handler reaches the engine through `try_borrow_mut`; an event that
//! arrives while another handler holds the engine is dropped. Font-size
//! changes go through a [`LatestWins`] gate so a burst of slider events never
//! overlaps an apply in progress.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use poster_editor_core::{
    EditorEngine, EditorError, LatestWins, PlatformError, PointerTarget, RawSelection,
    SnapshotKind,
};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, HtmlInputElement, KeyboardEvent};

use crate::cursor::{clear_native_selection, read_selection, restore_selection};
use crate::dom_sync::{
    BrowserSurface, DISPLAY_SELECTOR, FONT_CONTROLS_ID, PALETTE_ID, WIDGET_SELECTOR,
    apply_chrome, region_for_display, widget_ordinal,
};

pub type SharedEngine = Rc<RefCell<EditorEngine<BrowserSurface>>>;

const CHROME_SELECTOR: &str = "#text-editor-toolbar, #color-palette, #font-size-controls";
const SLIDER_ID: &str = "font-size-slider";
const FIELD_ID: &str = "font-size-input";

fn target_element(target: &EventTarget) -> Option<Element> {
    if let Some(element) = target.dyn_ref::<Element>() {
        return Some(element.clone());
    }
    target
        .dyn_ref::<web_sys::Node>()
        .and_then(|node| node.parent_element())
}

fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

/// Classify what a pointer or key event landed on.
pub fn classify_target(target: &EventTarget) -> PointerTarget {
    let Some(element) = target_element(target) else {
        return PointerTarget::Elsewhere;
    };
    if closest(&element, CHROME_SELECTOR).is_some() {
        return PointerTarget::Chrome;
    }
    if closest(&element, "input, textarea").is_some() {
        return PointerTarget::InputField;
    }
    let Some(display) = closest(&element, DISPLAY_SELECTOR) else {
        return PointerTarget::Elsewhere;
    };
    let Some(region) = region_for_display(&display) else {
        return PointerTarget::Elsewhere;
    };
    closest(&element, WIDGET_SELECTOR)
        .and_then(|widget| widget_ordinal(&display, &widget))
        .map_or(PointerTarget::Region(region), |ordinal| {
            PointerTarget::Widget { region, ordinal }
        })
}

fn event_target(event: &Event) -> PointerTarget {
    event
        .target()
        .map_or(PointerTarget::Elsewhere, |target| classify_target(&target))
}

/// Run `f` on the engine, then mirror its chrome onto the page.
fn with_engine<R>(
    engine: &SharedEngine,
    f: impl FnOnce(&mut EditorEngine<BrowserSurface>) -> R,
) -> Option<R> {
    let Ok(mut engine) = engine.try_borrow_mut() else {
        tracing::trace!(target: "poster::events", "engine busy, event dropped");
        return None;
    };
    let result = f(&mut engine);
    apply_chrome(engine.surface().document(), engine.chrome());
    Some(result)
}

fn report(err: &EditorError) {
    let _ = gloo_utils::window().alert_with_message(&err.notice());
}

fn report_result<T>(result: Option<Result<T, EditorError>>) {
    if let Some(Err(err)) = result {
        report(&err);
    }
}

/// Put the native selection back over the snapshot after its region was
/// rewritten.
fn restore_snapshot(engine: &EditorEngine<BrowserSurface>) {
    let Some(snapshot) = engine.snapshot() else {
        return;
    };
    let SnapshotKind::Text { range } = snapshot.kind else {
        return;
    };
    let Some(display) = engine.surface().region_element(snapshot.region.id) else {
        return;
    };
    if let Err(err) = restore_selection(&display, range) {
        tracing::debug!(target: "poster::events", %err, "selection not restored");
    }
}

fn apply_color(engine: &SharedEngine, name: &str) {
    report_result(with_engine(engine, |e| {
        let result = e.apply_color(name);
        restore_snapshot(e);
        result
    }));
}

fn apply_font_size(engine: &SharedEngine, scale: f64) {
    report_result(with_engine(engine, |e| {
        let result = e.apply_font_size(scale);
        restore_snapshot(e);
        result
    }));
}

fn input_by_id(id: &str) -> Option<HtmlInputElement> {
    gloo_utils::document()
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
}

/// Write the controls' state into the slider and numeric field.
fn sync_font_inputs(engine: &EditorEngine<BrowserSurface>) {
    let controls = engine.font_controls();
    if let Some(slider) = input_by_id(SLIDER_ID) {
        slider.set_value_as_number(controls.slider());
    }
    if let Some(field) = input_by_id(FIELD_ID) {
        field.set_value_as_number(controls.field());
    }
}

fn input_value(event: &Event) -> Option<f64> {
    event
        .target()
        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value_as_number())
}

/// Listeners installed for the lifetime of the editor. Dropping this
/// detaches all of them.
pub struct EditorEvents {
    _listeners: Vec<EventListener>,
    _settle: Rc<RefCell<Option<Timeout>>>,
}

impl EditorEvents {
    pub fn attach(engine: &SharedEngine) -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let settle: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
        let font_gate: Rc<LatestWins<f64>> = Rc::new(LatestWins::new());
        let mut listeners = Vec::new();

        let e = engine.clone();
        listeners.push(EventListener::new(&document, "mousedown", move |event| {
            let target = event_target(event);
            with_engine(&e, |engine| engine.pointer_down(target));
        }));

        for kind in ["mouseup", "keyup"] {
            let e = engine.clone();
            let slot = settle.clone();
            listeners.push(EventListener::new(&document, kind, move |event| {
                let target = event_target(event);
                let delay = with_engine(&e, |engine| {
                    engine
                        .selection_gesture_end(target)
                        .then(|| engine.config().selection_debounce_ms)
                })
                .flatten();
                if let Some(delay) = delay {
                    schedule_settle(&e, &slot, delay);
                }
            }));
        }

        let e = engine.clone();
        listeners.push(EventListener::new(&document, "click", move |event| {
            if let PointerTarget::Widget { region, ordinal } = event_target(event) {
                with_engine(&e, |engine| engine.widget_clicked(region, ordinal));
            }
        }));

        let e = engine.clone();
        listeners.push(EventListener::new_with_options(
            &document,
            "contextmenu",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let raw = match event_target(event) {
                    PointerTarget::Widget { region, ordinal } => {
                        RawSelection::Widget { region, ordinal }
                    }
                    PointerTarget::Region(_) => read_selection(),
                    _ => return,
                };
                if with_engine(&e, |engine| engine.context_menu(raw)) == Some(true) {
                    event.prevent_default();
                }
            },
        ));

        let e = engine.clone();
        listeners.push(EventListener::new(&document, "keydown", move |event| {
            let is_escape = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|key| key.key() == "Escape");
            if is_escape {
                with_engine(&e, |engine| engine.escape());
                clear_native_selection();
            }
        }));

        let buttons: [(&str, fn(&SharedEngine)); 3] = [
            ("toolbar-color-btn", |e| {
                report_result(with_engine(e, |engine| engine.show_palette()));
            }),
            ("toolbar-size-btn", |e| {
                report_result(with_engine(e, |engine| {
                    let live = Some(read_selection());
                    let shown = engine.show_font_controls(live);
                    sync_font_inputs(engine);
                    shown
                }));
            }),
            ("toolbar-reset-btn", |e| {
                report_result(with_engine(e, |engine| engine.reset()));
            }),
        ];
        for (id, action) in buttons {
            let Some(button) = document.get_element_by_id(id) else {
                tracing::debug!(target: "poster::events", id, "toolbar button missing");
                continue;
            };
            let e = engine.clone();
            listeners.push(EventListener::new_with_options(
                &button,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    event.stop_propagation();
                    event.prevent_default();
                    action(&e);
                },
            ));
        }

        if let Some(palette) = document.get_element_by_id(PALETTE_ID) {
            let e = engine.clone();
            listeners.push(EventListener::new(&palette, "click", move |event| {
                event.stop_propagation();
                let option = event
                    .target()
                    .and_then(|t| target_element(&t))
                    .and_then(|el| closest(&el, ".color-option"));
                let Some(option) = option else {
                    return;
                };
                let name = e.try_borrow().ok().and_then(|engine| {
                    engine
                        .config()
                        .palette
                        .iter()
                        .find(|entry| option.class_list().contains(&entry.name))
                        .map(|entry| entry.name.clone())
                });
                if let Some(name) = name {
                    apply_color(&e, &name);
                }
            }));
        }

        if let Some(slider) = input_by_id(SLIDER_ID) {
            let e = engine.clone();
            let gate = font_gate.clone();
            listeners.push(EventListener::new(&slider, "input", move |event| {
                let Some(value) = input_value(event) else {
                    return;
                };
                let scale = with_engine(&e, |engine| {
                    engine.snapshot()?;
                    engine.font_controls().on_slider_input(value, |v| {
                        if let Some(field) = input_by_id(FIELD_ID) {
                            field.set_value_as_number(v);
                        }
                    })
                })
                .flatten();
                if let Some(scale) = scale {
                    gate.submit(scale, |scale| apply_font_size(&e, scale));
                }
            }));
        }

        if let Some(field) = input_by_id(FIELD_ID) {
            let e = engine.clone();
            let gate = font_gate.clone();
            listeners.push(EventListener::new(&field, "input", move |event| {
                let Some(value) = input_value(event) else {
                    return;
                };
                let scale = with_engine(&e, |engine| {
                    engine.snapshot()?;
                    engine.font_controls().on_field_input(value, |v| {
                        if let Some(slider) = input_by_id(SLIDER_ID) {
                            slider.set_value_as_number(v);
                        }
                    })
                })
                .flatten();
                if let Some(scale) = scale {
                    if scale != value {
                        if let Some(field) = input_by_id(FIELD_ID) {
                            field.set_value_as_number(scale);
                        }
                    }
                    gate.submit(scale, |scale| apply_font_size(&e, scale));
                }
            }));
        }

        if let Some(controls) = document.get_element_by_id(FONT_CONTROLS_ID) {
            let e = engine.clone();
            let gate = font_gate.clone();
            listeners.push(EventListener::new(&controls, "click", move |event| {
                let preset = event
                    .target()
                    .and_then(|t| target_element(&t))
                    .and_then(|el| closest(&el, ".preset-btn"));
                let Some(size) = preset
                    .and_then(|btn| btn.get_attribute("data-size"))
                    .and_then(|size| size.parse::<f64>().ok())
                else {
                    return;
                };
                event.stop_propagation();
                let captured = with_engine(&e, |engine| {
                    engine.font_controls().on_preset(size);
                    sync_font_inputs(engine);
                    engine.snapshot().is_some()
                });
                if captured == Some(true) {
                    gate.submit(size, |scale| apply_font_size(&e, scale));
                }
            }));
        }

        tracing::debug!(target: "poster::events", count = listeners.len(), "listeners attached");
        Ok(Self {
            _listeners: listeners,
            _settle: settle,
        })
    }
}

/// Replace any pending settle with a new one `delay_ms` from now.
fn schedule_settle(engine: &SharedEngine, slot: &Rc<RefCell<Option<Timeout>>>, delay_ms: u32) {
    let e = engine.clone();
    let timeout = Timeout::new(delay_ms, move || {
        with_engine(&e, |engine| {
            if let Some(snapshot) = engine.settle_live() {
                tracing::trace!(target: "poster::events", region = %snapshot.region.id, "selection settled");
            }
        });
    });
    // Dropping the previous timeout cancels it.
    *slot.borrow_mut() = Some(timeout);
}
