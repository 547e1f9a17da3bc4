use chrono::{DateTime, Local};
use dioxus::prelude::*;
use pinmap_shared::category::Category;
use pinmap_shared::models::Pin;
use pinmap_shared::store::PinFilter;

use crate::storage::Controller;

/// Short local date for the list, or the raw value if it does not parse.
pub fn format_created_at(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Local).format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// "3 of 10 pins" while filtering, "10 pins" otherwise.
pub fn count_label(shown: usize, total: usize) -> String {
    let noun = if total == 1 { "pin" } else { "pins" };
    if shown == total {
        format!("{total} {noun}")
    } else {
        format!("{shown} of {total} {noun}")
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    id: String,
    title: String,
    description: String,
    color: &'static str,
    label: &'static str,
    created: String,
    completed: bool,
    selected: bool,
}

impl Entry {
    fn new(pin: &Pin, selected: Option<&str>) -> Self {
        let category = pin.category();
        Self {
            id: pin.id.clone(),
            title: pin.title.clone(),
            description: pin.description.clone(),
            color: category.color(),
            label: category.label(),
            created: format_created_at(&pin.created_at),
            completed: pin.is_completed(),
            selected: selected == Some(pin.id.as_str()),
        }
    }
}

#[component]
pub fn PinList(
    controller: Signal<Controller>,
    filter: Signal<PinFilter>,
    grouped: Signal<bool>,
    read_only: bool,
    on_error: EventHandler<String>,
) -> Element {
    let mut controller = controller;
    let mut filter = filter;
    let mut grouped = grouped;

    let (total, groups) = {
        let ctrl = controller.read();
        let store = ctrl.store();
        let selected = store.selected_id();
        let current = filter.read();
        let groups: Vec<(Option<Category>, Vec<Entry>)> = if *grouped.read() {
            store
                .group_by_category(&current)
                .into_iter()
                .map(|(c, pins)| {
                    (Some(c), pins.into_iter().map(|p| Entry::new(p, selected)).collect())
                })
                .collect()
        } else {
            vec![(
                None,
                store
                    .list(&current)
                    .into_iter()
                    .map(|p| Entry::new(p, selected))
                    .collect(),
            )]
        };
        (store.len(), groups)
    };
    let shown: usize = groups.iter().map(|(_, entries)| entries.len()).sum();
    let query = filter.read().query.clone();

    rsx! {
        div { class: "panel pin-list",
            div { class: "pin-list-header",
                h3 { "Pins" }
                span { class: "count", "{count_label(shown, total)}" }
            }

            div { class: "search",
                input {
                    r#type: "search",
                    placeholder: "Search pins...",
                    value: "{query}",
                    oninput: move |evt: Event<FormData>| {
                        filter.write().query = evt.value().to_string();
                    },
                }
                if !query.is_empty() {
                    button {
                        class: "secondary",
                        title: "Clear search",
                        onclick: move |_| filter.write().query.clear(),
                        "×"
                    }
                }
            }

            div { class: "category-chips",
                for c in Category::ALL {
                    button {
                        class: if filter.read().active.contains(&c) { "chip active" } else { "chip" },
                        style: "--pin-color: {c.color()};",
                        onclick: move |_| filter.write().toggle_category(c),
                        "{c.label()}"
                    }
                }
            }

            label { class: "group-toggle",
                input {
                    r#type: "checkbox",
                    checked: *grouped.read(),
                    onchange: move |evt: Event<FormData>| grouped.set(evt.checked()),
                }
                "Group by category"
            }

            if total == 0 {
                p { class: "empty",
                    if read_only { "This link has no pins." } else { "No pins yet. Use Add pin to place one." }
                }
            } else if shown == 0 {
                p { class: "empty", "No pins match the current filters." }
            }

            for (category, entries) in groups {
                if let Some(c) = category {
                    h4 {
                        class: "group-heading",
                        style: "--pin-color: {c.color()};",
                        "{c.label()} ({entries.len()})"
                    }
                }
                ul {
                    for e in entries.iter() {
                        li {
                            key: "{e.id}",
                            class: if e.selected { "pin-entry selected" } else { "pin-entry" },
                            onclick: {
                                let id = e.id.clone();
                                move |_| {
                                    let result = controller.write().focus_pin(&id);
                                    if let Err(err) = result {
                                        on_error.call(err.to_string());
                                    }
                                }
                            },
                            span { class: "dot", style: "background: {e.color};" }
                            div { class: "pin-entry-body",
                                div {
                                    class: if e.completed { "title completed" } else { "title" },
                                    "{e.title}"
                                }
                                if !e.description.is_empty() {
                                    div { class: "description", "{e.description}" }
                                }
                                div { class: "meta", "{e.label} · {e.created}" }
                            }
                            if !read_only {
                                button {
                                    class: "icon",
                                    title: if e.completed { "Mark as not done" } else { "Mark as done" },
                                    onclick: {
                                        let id = e.id.clone();
                                        move |evt: Event<MouseData>| {
                                            evt.stop_propagation();
                                            let result = controller.write().toggle_completion(&id);
                                            if let Err(err) = result {
                                                on_error.call(err.to_string());
                                            }
                                        }
                                    },
                                    if e.completed { "↺" } else { "✓" }
                                }
                                button {
                                    class: "icon danger",
                                    title: "Delete",
                                    onclick: {
                                        let id = e.id.clone();
                                        move |evt: Event<MouseData>| {
                                            evt.stop_propagation();
                                            controller.write().delete_pin(&id);
                                        }
                                    },
                                    "🗑"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(0, 0), "0 pins");
        assert_eq!(count_label(1, 1), "1 pin");
        assert_eq!(count_label(4, 4), "4 pins");
        assert_eq!(count_label(2, 9), "2 of 9 pins");
        assert_eq!(count_label(0, 1), "0 of 1 pin");
    }

    #[test]
    fn test_format_created_at_falls_back_to_raw() {
        assert_eq!(format_created_at("yesterday"), "yesterday");
        assert_eq!(format_created_at(""), "");
    }

    #[test]
    fn test_format_created_at_parses_rfc3339() {
        let formatted = format_created_at("2024-06-15T12:00:00.000Z");
        assert!(formatted.contains("2024"), "{formatted}");
        assert!(formatted.starts_with("Jun"), "{formatted}");
    }
}
