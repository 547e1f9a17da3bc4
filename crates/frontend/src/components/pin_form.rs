use dioxus::prelude::*;
use pinmap_shared::category::Category;
use pinmap_shared::models::{Pin, PinPatch};

use crate::storage::Controller;

/// Form contents before they reach the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
}

impl PinDraft {
    pub fn from_pin(pin: &Pin) -> Self {
        Self {
            title: pin.title.clone(),
            description: pin.description.clone(),
            category: pin.category(),
        }
    }

    /// Title is the only required field.
    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Patch holding only the fields edited since `initial`, so untouched
    /// stored values (such as a legacy category slug) are left as they are.
    pub fn changes_from(&self, initial: &PinDraft) -> PinPatch {
        let mut patch = PinPatch::default();
        let title = self.title.trim();
        if title != initial.title {
            patch = patch.title(title);
        }
        if self.description != initial.description {
            patch = patch.description(self.description.clone());
        }
        if self.category != initial.category {
            patch = patch.category(self.category);
        }
        patch
    }
}

/// Create/edit form. Mount it with a `key` per target so the draft is reset
/// when the target changes.
#[component]
pub fn PinForm(
    controller: Signal<Controller>,
    initial: PinDraft,
    editing: bool,
    on_error: EventHandler<String>,
) -> Element {
    let mut controller = controller;
    let original = use_hook(|| initial.clone());
    let mut draft = use_signal(move || initial);

    let has_position = controller.read().pending_position().is_some();
    let relocating = controller.read().mode().relocating_id().is_some();
    let can_submit = draft.read().is_submittable() && (editing || has_position) && !relocating;

    let submit = move |_: Event<MouseData>| {
        let current = draft.read().clone();
        let result = if editing {
            controller
                .write()
                .save_edits(current.changes_from(&original))
                .map(|_| ())
        } else {
            controller
                .write()
                .submit_pin(&current.title, &current.description, current.category)
                .map(|_| ())
        };
        if let Err(e) = result {
            on_error.call(e.to_string());
        }
    };

    rsx! {
        div { class: "panel pin-form",
            h3 { if editing { "Edit pin" } else { "New pin" } }

            if !editing && !has_position {
                p { class: "hint", "Click on the map to choose a position." }
            }
            if relocating {
                p { class: "hint", "Click on the map to move this pin." }
            }

            label { "Title" }
            input {
                r#type: "text",
                placeholder: "Name this place...",
                value: "{draft.read().title}",
                oninput: move |evt: Event<FormData>| {
                    draft.write().title = evt.value().to_string();
                },
            }

            label { "Description" }
            textarea {
                rows: "3",
                value: "{draft.read().description}",
                oninput: move |evt: Event<FormData>| {
                    draft.write().description = evt.value().to_string();
                },
            }

            label { "Category" }
            select {
                "aria-label": "Select category",
                onchange: move |evt: Event<FormData>| {
                    if let Some(category) = Category::parse(&evt.value()) {
                        draft.write().category = category;
                    }
                },
                for c in Category::ALL {
                    option {
                        value: "{c.as_str()}",
                        selected: draft.read().category == c,
                        "{c.label()}"
                    }
                }
            }

            div { class: "form-actions",
                button {
                    disabled: !can_submit,
                    onclick: submit,
                    if editing { "Save" } else { "Add pin" }
                }
                button {
                    class: "secondary",
                    onclick: move |_| controller.write().cancel(),
                    "Cancel"
                }
            }

            if editing {
                div { class: "form-actions",
                    button {
                        class: "secondary",
                        disabled: relocating,
                        onclick: move |_| {
                            controller.write().request_relocate();
                        },
                        "Move"
                    }
                    button {
                        class: "danger",
                        onclick: move |_| {
                            controller.write().delete_selected();
                        },
                        "Delete"
                    }
                }
            }
        }
    }
}
