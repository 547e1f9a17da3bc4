use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use pinmap_shared::category::Category;
use pinmap_shared::coords::{ImageRect, Point, Size};
use pinmap_shared::models::{MapInfo, Position};
use pinmap_shared::store::PinFilter;

use crate::config::{DOUBLE_TAP_MS, FALLBACK_MAP_SIZE};
use crate::coords::{self, ElementBox};
use crate::storage::Controller;

const MAP_CONTAINER_ID: &str = "pin-map-container";

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Place the image layer over the rendered image rectangle. Markers inside
/// it are positioned in percent, so they follow pan and zoom for free.
fn layer_style(rect: Option<ImageRect>) -> String {
    match rect {
        Some(r) => format!(
            "left: {}px; top: {}px; width: {}px; height: {}px;",
            r.left, r.top, r.width, r.height
        ),
        None => "visibility: hidden;".to_string(),
    }
}

fn marker_style(position: Position, color: &str) -> String {
    format!(
        "left: {}%; top: {}%; --pin-color: {};",
        position.x, position.y, color
    )
}

fn marker_class(selected: bool, completed: bool, interactive: bool) -> String {
    let mut class = String::from("pin-marker");
    if selected {
        class.push_str(" selected");
    }
    if completed {
        class.push_str(" completed");
    }
    if !interactive {
        class.push_str(" inert");
    }
    class
}

/// Recognizes a double tap on a marker, since mobile browsers do not
/// reliably turn one into `dblclick`.
#[derive(Debug, Clone, Default, PartialEq)]
struct TapTracker {
    last: Option<(String, i64)>,
}

impl TapTracker {
    /// Record a tap on `id` at `now_ms`. True when it completes a double tap;
    /// the pair is then consumed so a third tap starts over.
    fn tap(&mut self, id: &str, now_ms: i64) -> bool {
        let double = matches!(
            &self.last,
            Some((last_id, at)) if last_id == id && (0..=DOUBLE_TAP_MS).contains(&(now_ms - at))
        );
        self.last = if double {
            None
        } else {
            Some((id.to_string(), now_ms))
        };
        double
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq)]
struct MarkerView {
    id: String,
    title: String,
    class: String,
    style: String,
}

// ---------------------------------------------------------------------------
// DOM glue
// ---------------------------------------------------------------------------

/// Refresh the viewport's container size from the DOM.
fn sync_container(controller: &mut Signal<Controller>) -> Option<ElementBox> {
    let b = coords::element_box(MAP_CONTAINER_ID)?;
    if controller.read().viewport().container() != b.size {
        controller.write().viewport_mut().set_container(b.size);
    }
    Some(b)
}

fn release(controller: &mut Signal<Controller>, on_error: &EventHandler<String>, at: Point) {
    let result = controller.write().pointer_up(at);
    if let Err(e) = result {
        on_error.call(e.to_string());
    }
}

fn image_ready(controller: &mut Signal<Controller>, size: Size) {
    sync_container(controller);
    let mut ctrl = controller.write();
    ctrl.viewport_mut().set_image_size(size);
    ctrl.viewport_mut().reset_to_fit();
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(
    controller: Signal<Controller>,
    map: MapInfo,
    filter: PinFilter,
    read_only: bool,
    on_error: EventHandler<String>,
) -> Element {
    let mut controller = controller;
    let mut image_failed = use_signal(|| false);
    let mut last_touch = use_signal(|| None::<Point>);
    let mut taps = use_signal(TapTracker::default);

    let (rect, markers, pending, cursor, loaded) = {
        let ctrl = controller.read();
        let interactive = ctrl.mode().markers_interactive();
        let selected = ctrl.store().selected_id();
        let markers: Vec<MarkerView> = ctrl
            .store()
            .list(&filter)
            .into_iter()
            .map(|pin| MarkerView {
                id: pin.id.clone(),
                title: pin.title.clone(),
                class: marker_class(
                    selected == Some(pin.id.as_str()),
                    pin.is_completed(),
                    interactive,
                ),
                style: marker_style(pin.position, pin.category().color()),
            })
            .collect();
        (
            ctrl.viewport().image_rect(),
            markers,
            ctrl.pending_position(),
            ctrl.cursor(),
            ctrl.viewport().image_ready(),
        )
    };

    let failed = *image_failed.read();
    let layer = layer_style(rect);
    let natural = Size::new(map.width, map.height);
    let image_url = map.image_path.clone();

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "map-container",
            style: "cursor: {cursor};",

            onmounted: move |_| {
                sync_container(&mut controller);
            },

            onresize: move |_| {
                sync_container(&mut controller);
            },

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let delta_y = wheel_delta_y(evt.data().delta());
                let Some(b) = sync_container(&mut controller) else { return };
                let client = evt.data().client_coordinates();
                controller.write().wheel(delta_y, b.local(client.x, client.y));
            },

            onmousedown: move |evt: Event<MouseData>| {
                // Only track drag/click for left mouse button
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let Some(b) = sync_container(&mut controller) else { return };
                let client = evt.client_coordinates();
                controller.write().pointer_down(b.local(client.x, client.y));
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !controller.read().viewport().is_pressed() {
                    return;
                }
                let Some(b) = coords::element_box(MAP_CONTAINER_ID) else { return };
                let client = evt.client_coordinates();
                controller.write().pointer_move(b.local(client.x, client.y));
            },

            onmouseup: move |evt: Event<MouseData>| {
                if !controller.read().viewport().is_pressed() {
                    return;
                }
                let Some(b) = coords::element_box(MAP_CONTAINER_ID) else { return };
                let client = evt.client_coordinates();
                release(&mut controller, &on_error, b.local(client.x, client.y));
            },

            onmouseleave: move |_| {
                if controller.read().viewport().is_pressed() {
                    controller.write().pointer_leave();
                }
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                if !controller.read().mode().suppresses_pan() {
                    controller.write().viewport_mut().reset_to_fit();
                }
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                if touches.len() == 1 {
                    let Some(b) = sync_container(&mut controller) else { return };
                    let client = touches[0].client_coordinates();
                    let at = b.local(client.x, client.y);
                    last_touch.set(Some(at));
                    controller.write().touch_down(at);
                } else {
                    // A second finger is never a tap.
                    last_touch.set(None);
                    controller.write().pointer_leave();
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                if touches.len() != 1 || last_touch.read().is_none() {
                    return;
                }
                let Some(b) = coords::element_box(MAP_CONTAINER_ID) else { return };
                let client = touches[0].client_coordinates();
                let at = b.local(client.x, client.y);
                last_touch.set(Some(at));
                controller.write().pointer_move(at);
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                if !evt.data().touches().is_empty() {
                    return;
                }
                let last = *last_touch.read();
                if let Some(at) = last {
                    last_touch.set(None);
                    release(&mut controller, &on_error, at);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                last_touch.set(None);
                controller.write().pointer_leave();
            },

            div {
                class: "map-layer",
                style: "{layer}",

                if failed {
                    div { class: "map-placeholder" }
                } else {
                    img {
                        src: "{image_url}",
                        alt: "{map.display_name}",
                        draggable: "false",
                        onload: move |_| {
                            image_ready(&mut controller, natural);
                        },
                        onerror: {
                            let image_url = image_url.clone();
                            move |_| {
                                image_failed.set(true);
                                image_ready(&mut controller, FALLBACK_MAP_SIZE);
                                on_error.call(format!(
                                    "Could not load map image {image_url}, showing a placeholder"
                                ));
                            }
                        },
                    }
                }

                for m in markers {
                    div {
                        key: "{m.id}",
                        class: "{m.class}",
                        style: "{m.style}",
                        title: "{m.title}",
                        onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                        ontouchstart: move |evt: Event<TouchData>| evt.stop_propagation(),
                        ontouchend: {
                            let id = m.id.clone();
                            move |evt: Event<TouchData>| {
                                // Handled here; no emulated click follows.
                                evt.stop_propagation();
                                evt.prevent_default();
                                let double = taps.write().tap(&id, now_ms());
                                let result = if double && !read_only {
                                    controller.write().toggle_completion(&id).map(|_| ())
                                } else {
                                    controller.write().select_pin(&id).map(|_| ())
                                };
                                if let Err(e) = result {
                                    on_error.call(e.to_string());
                                }
                            }
                        },
                        // Selecting leaves the map still so a second click
                        // lands on the same marker.
                        onclick: {
                            let id = m.id.clone();
                            move |evt: Event<MouseData>| {
                                evt.stop_propagation();
                                let result = controller.write().select_pin(&id);
                                if let Err(e) = result {
                                    on_error.call(e.to_string());
                                }
                            }
                        },
                        ondoubleclick: {
                            let id = m.id.clone();
                            move |evt: Event<MouseData>| {
                                evt.stop_propagation();
                                if read_only {
                                    return;
                                }
                                let result = controller.write().toggle_completion(&id);
                                if let Err(e) = result {
                                    on_error.call(e.to_string());
                                }
                            }
                        },
                        span { class: "pin-label", "{m.title}" }
                    }
                }

                if let Some(p) = pending {
                    div {
                        class: "pin-marker pending",
                        style: marker_style(p, Category::Default.color()),
                    }
                }
            }

            if !loaded && !failed {
                div { class: "map-notice", "Loading map…" }
            }

            // Zoom controls (outside the layer so they stay fixed)
            div {
                class: "zoom-controls",
                onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                ondoubleclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                button {
                    title: "Zoom in",
                    onclick: move |_| {
                        controller.write().viewport_mut().zoom_in();
                    },
                    "+"
                }
                button {
                    title: "Zoom out",
                    onclick: move |_| {
                        controller.write().viewport_mut().zoom_out();
                    },
                    "−"
                }
                button {
                    title: "Fit map",
                    onclick: move |_| {
                        controller.write().viewport_mut().reset_to_fit();
                    },
                    "⤢"
                }
            }
        }
    }
}
