mod api;
mod components;
mod config;
mod coords;
mod pages;
mod storage;

use dioxus::prelude::*;

use pages::map_page::MapPage;
use pages::shared_view::SharedView;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/shared?:pins")]
    Shared { pins: String },
}

#[component]
fn Home() -> Element {
    rsx! {
        MapPage {}
    }
}

#[component]
fn Shared(pins: String) -> Element {
    rsx! {
        SharedView { pins }
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
