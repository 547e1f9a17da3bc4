use dioxus::prelude::*;
use pinmap_shared::mode::InteractionMode;
use pinmap_shared::models::Pin;
use pinmap_shared::share;
use pinmap_shared::store::PinFilter;

use crate::api;
use crate::components::map_view::MapView;
use crate::components::pin_form::{PinDraft, PinForm};
use crate::components::pin_list::PinList;
use crate::components::share_panel::SharePanel;
use crate::storage;

/// One-line status shown above the sidebar.
pub fn mode_hint(mode: &InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Idle => "Drag to pan, scroll to zoom, double-click to fit.",
        InteractionMode::Placing { pending: None } => "Click on the map to place the pin. Esc cancels.",
        InteractionMode::Placing { pending: Some(_) } => {
            "Fill in the details, or click again to move the pin."
        }
        InteractionMode::Editing(_) => "Editing pin.",
        InteractionMode::Relocating(_) => "Click the new position on the map. Esc cancels.",
    }
}

/// A generated link together with the pins it encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub pins: Vec<Pin>,
    pub url: String,
}

/// The link, as long as it still describes `current`. Any later add, edit,
/// toggle or delete makes it stale.
pub fn current_link(link: Option<&ShareLink>, current: &[Pin]) -> Option<String> {
    link.filter(|l| l.pins.as_slice() == current)
        .map(|l| l.url.clone())
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[component]
pub fn MapPage() -> Element {
    let map_resource = use_resource(api::fetch_map);

    let mut controller = use_signal(storage::local_controller);
    let filter = use_signal(PinFilter::default);
    let grouped = use_signal(|| false);
    let mut notice = use_signal(|| None::<String>);
    let mut share_link = use_signal(|| None::<ShareLink>);

    let on_error = use_callback(move |message: String| {
        tracing::warn!(%message, "Map action failed");
        notice.set(Some(message));
    });

    let (map, fetch_notice) = match &*map_resource.read() {
        Some(fetched) => {
            let (map, n) = api::settle_map(fetched.clone());
            (Some(map), n)
        }
        None => (None, None),
    };

    let (mode, form, pin_count, image_ready, persistent, share_url) = {
        let ctrl = controller.read();
        let mode = ctrl.mode().clone();
        let form = match &mode {
            InteractionMode::Placing { .. } => Some(("new".to_string(), PinDraft::default(), false)),
            InteractionMode::Editing(id) | InteractionMode::Relocating(id) => ctrl
                .store()
                .get(id)
                .map(|pin| (id.clone(), PinDraft::from_pin(pin), true)),
            InteractionMode::Idle => None,
        };
        (
            mode,
            form,
            ctrl.store().len(),
            ctrl.viewport().image_ready(),
            ctrl.store().repository().store().is_persistent(),
            current_link(share_link.read().as_ref(), ctrl.store().pins()),
        )
    };
    let banner = notice.read().clone().or(fetch_notice);
    let title = map
        .as_ref()
        .map(|m| m.display_name.clone())
        .unwrap_or_else(|| "Pin Map".to_string());
    let map_view = match map {
        Some(map) => rsx! {
            MapView {
                controller,
                map,
                filter: filter.read().clone(),
                read_only: false,
                on_error,
            }
        },
        None => rsx! {
            div { class: "map-notice", "Loading map…" }
        },
    };

    rsx! {
        div {
            class: "app",
            tabindex: "0",
            onkeydown: move |evt: Event<KeyboardData>| {
                if evt.key() == Key::Escape {
                    controller.write().cancel();
                }
            },

            div { class: "header",
                h1 { "{title}" }
                span { class: "mode-hint", "{mode_hint(&mode)}" }
            }

            div { class: "sidebar",
                if let Some(message) = banner {
                    div { class: "notice",
                        span { "{message}" }
                        button {
                            class: "icon",
                            onclick: move |_| notice.set(None),
                            "×"
                        }
                    }
                }
                if !persistent {
                    div { class: "notice", "Browser storage is unavailable. Pins will be lost on reload." }
                }

                div { class: "panel",
                    button {
                        disabled: !image_ready || mode.is_placing(),
                        onclick: move |_| {
                            let result = controller.write().request_add();
                            if let Err(e) = result {
                                on_error.call(e.to_string());
                            }
                        },
                        "Add pin"
                    }
                }

                if let Some((key, initial, editing)) = form {
                    PinForm {
                        key: "{key}",
                        controller,
                        initial,
                        editing,
                        on_error,
                    }
                }

                PinList {
                    controller,
                    filter,
                    grouped,
                    read_only: false,
                    on_error,
                }

                SharePanel {
                    share_url,
                    pin_count,
                    on_share: move |_| {
                        let Some(origin) = api::page_origin() else {
                            on_error.call("No page origin to build a link from".to_string());
                            return;
                        };
                        let pins = controller.read().store().pins().to_vec();
                        match share::share_url(&origin, &pins) {
                            Ok(url) => share_link.set(url.map(|url| ShareLink { pins, url })),
                            Err(e) => on_error.call(e.to_string()),
                        }
                    },
                }

                div { class: "panel",
                    button {
                        class: "danger",
                        disabled: pin_count == 0,
                        onclick: move |_| {
                            if confirm("Delete every pin? This cannot be undone.") {
                                controller.write().clear_all();
                                share_link.set(None);
                            }
                        },
                        "Clear all"
                    }
                }
            }

            div { class: "map-area", {map_view} }
        }
    }
}
