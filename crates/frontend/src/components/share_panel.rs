use std::time::Duration;

use dioxus::prelude::*;

/// Share link for the current pins, with a copy-to-clipboard button.
#[component]
pub fn SharePanel(
    share_url: Option<String>,
    pin_count: usize,
    on_share: EventHandler<()>,
) -> Element {
    let mut copied = use_signal(|| false);

    rsx! {
        div { class: "panel",
            h3 { "Share" }
            p { class: "hint", "Anyone with the link sees a read-only copy of your pins." }
            div { style: "margin-top: 8px;",
                button {
                    disabled: pin_count == 0,
                    onclick: move |_| {
                        copied.set(false);
                        on_share.call(());
                    },
                    "Create link"
                }
            }
            if let Some(url) = &share_url {
                div { class: "share-url",
                    input {
                        r#type: "text",
                        readonly: true,
                        value: "{url}",
                    }
                    button {
                        class: "secondary",
                        onclick: {
                            let url = url.clone();
                            move |_| {
                                let url = url.clone();
                                wasm_bindgen_futures::spawn_local(async move {
                                    let Some(window) = web_sys::window() else { return };
                                    let clipboard = window.navigator().clipboard();
                                    match wasm_bindgen_futures::JsFuture::from(clipboard.write_text(&url)).await {
                                        Ok(_) => {
                                            copied.set(true);
                                            gloo_timers::future::sleep(Duration::from_secs(2)).await;
                                            copied.set(false);
                                        }
                                        Err(e) => tracing::warn!(error = ?e, "Clipboard write failed"),
                                    }
                                });
                            }
                        },
                        if *copied.read() { "Copied" } else { "Copy" }
                    }
                }
            }
        }
    }
}
