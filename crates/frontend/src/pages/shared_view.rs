use dioxus::prelude::*;
use pinmap_shared::models::Pin;
use pinmap_shared::share;
use pinmap_shared::store::PinFilter;

use crate::api;
use crate::components::map_view::MapView;
use crate::components::pin_list::PinList;
use crate::storage;
use crate::Route;

/// Pins carried by a share link. A broken payload shows an empty map with a
/// notice rather than an error page.
pub fn decode_payload(payload: &str) -> (Vec<Pin>, Option<String>) {
    if payload.trim().is_empty() {
        return (Vec::new(), Some("This link does not contain any pins.".to_string()));
    }
    match share::decode(payload) {
        Ok(pins) => (pins, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode shared pins");
            (Vec::new(), Some("This share link is damaged and could not be read.".to_string()))
        }
    }
}

#[component]
pub fn SharedView(pins: String) -> Element {
    let map_resource = use_resource(api::fetch_map);

    let (decoded, decode_notice) = use_hook(move || decode_payload(&pins));
    let controller = use_signal(move || storage::shared_controller(&decoded));
    let filter = use_signal(PinFilter::default);
    let grouped = use_signal(|| false);
    let mut notice = use_signal(move || decode_notice);

    let on_error = use_callback(move |message: String| {
        tracing::warn!(%message, "Shared view action failed");
        notice.set(Some(message));
    });

    let (map, fetch_notice) = match &*map_resource.read() {
        Some(fetched) => {
            let (map, n) = api::settle_map(fetched.clone());
            (Some(map), n)
        }
        None => (None, None),
    };
    let banner = notice.read().clone().or(fetch_notice);
    let title = map
        .as_ref()
        .map(|m| format!("{} (shared)", m.display_name))
        .unwrap_or_else(|| "Shared pins".to_string());
    let map_view = match map {
        Some(map) => rsx! {
            MapView {
                controller,
                map,
                filter: filter.read().clone(),
                read_only: true,
                on_error,
            }
        },
        None => rsx! {
            div { class: "map-notice", "Loading map…" }
        },
    };

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "{title}" }
                span { class: "mode-hint", "Read-only view. Changes here are not saved." }
                Link { class: "header-link", to: Route::Home {}, "Open my map" }
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

                PinList {
                    controller,
                    filter,
                    grouped,
                    read_only: true,
                    on_error,
                }
            }

            div { class: "map-area", {map_view} }
        }
    }
}
