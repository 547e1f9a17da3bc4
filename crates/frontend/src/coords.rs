use pinmap_shared::coords::{client_to_container, Point, Size};

/// Left/top offset and size of an element, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBox {
    pub left: f64,
    pub top: f64,
    pub size: Size,
}

impl ElementBox {
    /// Client coordinates to coordinates relative to this box.
    pub fn local(&self, client_x: f64, client_y: f64) -> Point {
        client_to_container(client_x, client_y, self.left, self.top)
    }
}

/// Bounding box of the element with `id`, or `None` before it is mounted.
pub fn element_box(id: &str) -> Option<ElementBox> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(id)?;
    let rect = element.get_bounding_client_rect();
    Some(ElementBox {
        left: rect.left(),
        top: rect.top(),
        size: Size::new(rect.width(), rect.height()),
    })
}
