//! Routes pointer and keyboard gestures to the viewport, the mode machine and
//! the pin store.

use crate::category::Category;
use crate::coords::Point;
use crate::error::{PinError, Result};
use crate::mode::{ClickOutcome, InteractionMode};
use crate::models::{Pin, PinPatch, Position};
use crate::persist::KeyValueStore;
use crate::store::PinStore;
use crate::viewport::{Gesture, Viewport};

pub struct MapController<S> {
    store: PinStore<S>,
    viewport: Viewport,
    mode: InteractionMode,
}

impl<S: KeyValueStore> MapController<S> {
    pub fn new(store: PinStore<S>, viewport: Viewport) -> Self {
        Self {
            store,
            viewport,
            mode: InteractionMode::Idle,
        }
    }

    pub fn store(&self) -> &PinStore<S> {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Container/image sizing and zoom controls. Pan goes through the
    /// pointer methods so clicks can be told apart from drags.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn cursor(&self) -> &'static str {
        self.mode.cursor(self.viewport.is_panning())
    }

    /// Position chosen for the pin being placed, if any.
    pub fn pending_position(&self) -> Option<Position> {
        self.mode.pending_position()
    }

    /// Enter placement. Refused until the map image has a size, since a
    /// click could not be mapped to a position.
    pub fn request_add(&mut self) -> Result<()> {
        if !self.viewport.image_ready() {
            return Err(PinError::AssetLoad("map image is not loaded yet".to_string()));
        }
        self.viewport.cancel_drag();
        self.store.clear_selection();
        self.mode.request_add();
        tracing::debug!("Placing new pin");
        Ok(())
    }

    pub fn pointer_down(&mut self, pointer: Point) {
        self.viewport.begin_drag(pointer, &self.mode);
    }

    pub fn touch_down(&mut self, pointer: Point) {
        self.viewport.begin_touch_drag(pointer, &self.mode);
    }

    /// Returns true if the map moved.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        self.viewport.continue_drag(pointer)
    }

    /// Release. Only a press that stayed under the drag threshold is
    /// treated as a map click.
    pub fn pointer_up(&mut self, pointer: Point) -> Result<Option<ClickOutcome>> {
        match self.viewport.end_drag(pointer) {
            Gesture::Click(at) => self.map_click(at),
            Gesture::Pan | Gesture::None => Ok(None),
        }
    }

    pub fn pointer_leave(&mut self) {
        self.viewport.cancel_drag();
    }

    /// Interpret a click at container point `at`. Nothing happens until the
    /// image has a rendered rectangle.
    pub fn map_click(&mut self, at: Point) -> Result<Option<ClickOutcome>> {
        let Some(position) = self.viewport.unproject(at) else {
            return Ok(None);
        };
        let outcome = self.mode.map_click(position);
        match &outcome {
            ClickOutcome::Deselect => self.store.clear_selection(),
            ClickOutcome::Pending(position) => {
                tracing::debug!(x = position.x, y = position.y, "Pending pin position");
            }
            ClickOutcome::Relocate { id, position } => {
                if let Err(e) = self
                    .store
                    .update(id, PinPatch::default().position(*position))
                {
                    self.mode.cancel();
                    return Err(e);
                }
            }
        }
        Ok(Some(outcome))
    }

    /// Create a pin at the pending position and go back to idle with the new
    /// pin selected. Validation failures leave placement untouched so the
    /// form can be corrected.
    pub fn submit_pin(&mut self, title: &str, description: &str, category: Category) -> Result<Pin> {
        let position = self
            .mode
            .pending_position()
            .ok_or_else(|| PinError::Validation("no position chosen on the map".to_string()))?;
        let pin = self.store.create(position, title, description, category)?;
        self.mode = InteractionMode::Idle;
        Ok(pin)
    }

    /// Start editing pin `id`. Ignored (false) while a position is being
    /// picked.
    pub fn select_pin(&mut self, id: &str) -> Result<bool> {
        if !self.mode.markers_interactive() {
            return Ok(false);
        }
        if let Err(e) = self.store.select(id) {
            if self.mode.target_id() == Some(id) {
                self.mode.cancel();
            }
            return Err(e);
        }
        Ok(self.mode.select(id))
    }

    /// Select pin `id` and pan so it sits at the center of the map.
    pub fn focus_pin(&mut self, id: &str) -> Result<bool> {
        if !self.select_pin(id)? {
            return Ok(false);
        }
        if let Some(pin) = self.store.get(id) {
            self.viewport.center_on(pin.position);
        }
        Ok(true)
    }

    /// Apply form edits to the pin being edited and close the form. The pin
    /// stays selected.
    pub fn save_edits(&mut self, patch: PinPatch) -> Result<Pin> {
        let id = self
            .mode
            .editing_id()
            .ok_or_else(|| PinError::Validation("no pin is being edited".to_string()))?
            .to_string();
        match self.store.update(&id, patch) {
            Ok(pin) => {
                self.mode = InteractionMode::Idle;
                Ok(pin)
            }
            Err(PinError::NotFound(id)) => {
                self.mode.cancel();
                Err(PinError::NotFound(id))
            }
            Err(e) => Err(e),
        }
    }

    /// Next map click moves the pin being edited.
    pub fn request_relocate(&mut self) -> bool {
        self.viewport.cancel_drag();
        self.mode.request_relocate().is_some()
    }

    pub fn delete_pin(&mut self, id: &str) -> bool {
        if self.mode.target_id() == Some(id) {
            self.mode.cancel();
        }
        self.store.delete(id)
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.mode.editing_id().map(str::to_string) {
            Some(id) => self.delete_pin(&id),
            None => false,
        }
    }

    pub fn toggle_completion(&mut self, id: &str) -> Result<Pin> {
        self.store.toggle_completion(id)
    }

    pub fn clear_all(&mut self) {
        self.mode.cancel();
        self.store.clear();
    }

    /// Back to idle: pending position, selection and any press are dropped.
    pub fn cancel(&mut self) {
        self.mode.cancel();
        self.store.clear_selection();
        self.viewport.cancel_drag();
    }

    /// Wheel zoom around `anchor`. Scrolling up zooms in by half a step.
    pub fn wheel(&mut self, delta_y: f64, anchor: Point) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let step = self.viewport.config().zoom_step / 2.0;
        let delta = if delta_y < 0.0 { step } else { -step };
        self.viewport.zoom_by(delta, Some(anchor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Size;
    use crate::persist::{MemoryStore, PinRepository};

    fn controller() -> MapController<MemoryStore> {
        let store = PinStore::open(PinRepository::new(MemoryStore::new(), "pins"));
        let mut viewport = Viewport::default();
        viewport.set_container(Size::new(1000.0, 1000.0));
        viewport.set_image_size(Size::new(1000.0, 1000.0));
        MapController::new(store, viewport)
    }

    fn click(c: &mut MapController<MemoryStore>, x: f64, y: f64) -> Option<ClickOutcome> {
        c.pointer_down(Point::new(x, y));
        c.pointer_up(Point::new(x, y)).unwrap()
    }

    fn place(c: &mut MapController<MemoryStore>, x: f64, y: f64, title: &str) -> Pin {
        c.request_add().unwrap();
        click(c, x, y);
        c.submit_pin(title, "", Category::Default).unwrap()
    }

    #[test]
    fn test_add_requires_image() {
        let store = PinStore::open(PinRepository::new(MemoryStore::new(), "pins"));
        let mut c = MapController::new(store, Viewport::default());
        assert!(matches!(c.request_add(), Err(PinError::AssetLoad(_))));
        assert!(c.mode().is_idle());
        assert_eq!(c.map_click(Point::new(5.0, 5.0)).unwrap(), None);
    }

    #[test]
    fn test_place_pin_with_deferred_creation() {
        let mut c = controller();
        c.request_add().unwrap();
        assert_eq!(c.cursor(), "crosshair");

        let outcome = click(&mut c, 250.0, 750.0);
        assert_eq!(outcome, Some(ClickOutcome::Pending(Position::new(25.0, 75.0))));
        // Nothing is created until the form is submitted.
        assert!(c.store().is_empty());

        let pin = c.submit_pin("Camp Site", "", Category::Camp).unwrap();
        assert_eq!(pin.position, Position::new(25.0, 75.0));
        assert!(c.mode().is_idle());
        assert_eq!(c.store().selected_id(), Some(pin.id.as_str()));
        assert_eq!(c.store().len(), 1);
    }

    #[test]
    fn test_cancel_placement_leaves_no_pin() {
        let mut c = controller();
        c.request_add().unwrap();
        click(&mut c, 100.0, 100.0);
        c.cancel();
        assert!(c.mode().is_idle());
        assert_eq!(c.pending_position(), None);
        assert!(c.store().is_empty());
        assert!(c.store().repository().try_load().unwrap().is_empty());
    }

    #[test]
    fn test_blank_title_keeps_form_open() {
        let mut c = controller();
        c.request_add().unwrap();
        click(&mut c, 100.0, 100.0);
        assert!(matches!(
            c.submit_pin("  ", "", Category::Default),
            Err(PinError::Validation(_))
        ));
        assert_eq!(c.pending_position(), Some(Position::new(10.0, 10.0)));
    }

    #[test]
    fn test_submit_without_position_fails() {
        let mut c = controller();
        c.request_add().unwrap();
        assert!(matches!(
            c.submit_pin("x", "", Category::Default),
            Err(PinError::Validation(_))
        ));
    }

    #[test]
    fn test_drag_after_press_is_not_a_click() {
        let mut c = controller();
        c.pointer_down(Point::new(100.0, 100.0));
        assert!(c.pointer_move(Point::new(160.0, 130.0)));
        assert_eq!(c.cursor(), "grabbing");
        assert_eq!(c.pointer_up(Point::new(160.0, 130.0)).unwrap(), None);
        assert_eq!(c.viewport().offset(), Point::new(60.0, 30.0));
    }

    #[test]
    fn test_drag_while_placing_neither_pans_nor_places() {
        let mut c = controller();
        c.request_add().unwrap();
        c.pointer_down(Point::new(100.0, 100.0));
        assert!(!c.pointer_move(Point::new(200.0, 200.0)));
        assert_eq!(c.pointer_up(Point::new(200.0, 200.0)).unwrap(), None);
        assert_eq!(c.viewport().offset(), Point::default());
        assert_eq!(c.pending_position(), None);
    }

    #[test]
    fn test_touch_wobble_still_places() {
        let mut c = controller();
        c.request_add().unwrap();
        c.touch_down(Point::new(500.0, 500.0));
        c.pointer_move(Point::new(505.0, 503.0));
        let outcome = c.pointer_up(Point::new(505.0, 503.0)).unwrap();
        assert_eq!(outcome, Some(ClickOutcome::Pending(Position::new(50.0, 50.0))));
    }

    #[test]
    fn test_idle_click_deselects() {
        let mut c = controller();
        let pin = place(&mut c, 500.0, 500.0, "a");
        assert_eq!(c.store().selected_id(), Some(pin.id.as_str()));
        assert_eq!(click(&mut c, 10.0, 10.0), Some(ClickOutcome::Deselect));
        assert_eq!(c.store().selected_id(), None);
        assert_eq!(c.store().len(), 1);
    }

    #[test]
    fn test_relocate_flow() {
        let mut c = controller();
        let pin = place(&mut c, 500.0, 500.0, "a");
        assert!(c.select_pin(&pin.id).unwrap());
        assert!(c.request_relocate());
        assert_eq!(c.cursor(), "crosshair");
        // Markers are not clickable now, so the click lands on the map.
        assert!(!c.select_pin(&pin.id).unwrap());

        let outcome = click(&mut c, 900.0, 100.0);
        assert!(matches!(outcome, Some(ClickOutcome::Relocate { .. })));
        assert_eq!(c.mode().editing_id(), Some(pin.id.as_str()));
        let moved = c.store().get(&pin.id).unwrap();
        assert_eq!(moved.position, Position::new(90.0, 10.0));
        assert_eq!(moved.title, "a");
    }

    #[test]
    fn test_relocate_of_deleted_pin_is_recovered() {
        let mut c = controller();
        let pin = place(&mut c, 500.0, 500.0, "a");
        c.select_pin(&pin.id).unwrap();
        c.request_relocate();
        // Deleted behind the mode's back.
        c.store.delete(&pin.id);
        c.pointer_down(Point::new(10.0, 10.0));
        assert!(matches!(
            c.pointer_up(Point::new(10.0, 10.0)),
            Err(PinError::NotFound(_))
        ));
        assert!(c.mode().is_idle());
    }

    #[test]
    fn test_select_stale_pin_clears_selection() {
        let mut c = controller();
        place(&mut c, 500.0, 500.0, "a");
        assert!(matches!(c.select_pin("gone"), Err(PinError::NotFound(_))));
        assert_eq!(c.store().selected_id(), None);
        assert!(c.mode().is_idle());
    }

    #[test]
    fn test_switching_selection_while_editing() {
        let mut c = controller();
        let a = place(&mut c, 100.0, 100.0, "a");
        let b = place(&mut c, 200.0, 200.0, "b");
        c.select_pin(&a.id).unwrap();
        c.select_pin(&b.id).unwrap();
        assert!(c.request_relocate());
        assert_eq!(c.mode().relocating_id(), Some(b.id.as_str()));
        assert_eq!(c.mode().editing_id(), None);
    }

    #[test]
    fn test_save_edits_keeps_selection() {
        let mut c = controller();
        let pin = place(&mut c, 100.0, 100.0, "a");
        c.select_pin(&pin.id).unwrap();
        let saved = c
            .save_edits(PinPatch::default().title("b").category(Category::Mission))
            .unwrap();
        assert_eq!(saved.title, "b");
        assert_eq!(saved.category(), Category::Mission);
        assert!(c.mode().is_idle());
        assert_eq!(c.store().selected_id(), Some(pin.id.as_str()));
    }

    #[test]
    fn test_delete_selected_returns_to_idle() {
        let mut c = controller();
        let pin = place(&mut c, 100.0, 100.0, "a");
        c.select_pin(&pin.id).unwrap();
        assert!(c.delete_selected());
        assert!(c.mode().is_idle());
        assert!(c.store().is_empty());
        assert!(!c.delete_selected());
        assert!(!c.delete_pin(&pin.id));
    }

    #[test]
    fn test_focus_pin_centers_viewport() {
        let mut c = controller();
        let pin = place(&mut c, 900.0, 200.0, "a");
        c.viewport_mut().zoom_in();
        assert!(c.focus_pin(&pin.id).unwrap());
        let at = c.viewport().project(pin.position).unwrap();
        assert!((at.x - 500.0).abs() < 1e-6);
        assert!((at.y - 500.0).abs() < 1e-6);
        assert_eq!(c.mode().editing_id(), Some(pin.id.as_str()));
    }

    #[test]
    fn test_select_pin_keeps_marker_under_pointer() {
        let mut c = controller();
        let pin = place(&mut c, 900.0, 100.0, "a");
        c.cancel();
        let before = c.viewport().project(pin.position).unwrap();

        // Two clicks on the marker: neither may move the map.
        assert!(c.select_pin(&pin.id).unwrap());
        assert_eq!(c.viewport().project(pin.position).unwrap(), before);
        assert!(c.select_pin(&pin.id).unwrap());
        assert_eq!(c.viewport().project(pin.position).unwrap(), before);
        assert_eq!(c.store().selected_id(), Some(pin.id.as_str()));

        // The double-click that follows toggles in place.
        assert!(c.toggle_completion(&pin.id).unwrap().is_completed());
        assert_eq!(c.store().selected_id(), Some(pin.id.as_str()));
        assert_eq!(c.mode().editing_id(), Some(pin.id.as_str()));
    }

    #[test]
    fn test_title_only_edit_keeps_raw_category() {
        let stored = r#"[{"id":"t","position":{"x":10.0,"y":10.0},"title":"Cache","description":"","category":"treasure","createdAt":"2024-01-01T00:00:00.000Z"},{"id":"n","position":{"x":20.0,"y":20.0},"title":"Old","description":"","createdAt":"2024-01-02T00:00:00.000Z"}]"#;
        let store = PinStore::open(PinRepository::new(
            MemoryStore::new().with_entry("pins", stored),
            "pins",
        ));
        let mut c = MapController::new(store, Viewport::default());

        for id in ["t", "n"] {
            c.select_pin(id).unwrap();
            c.save_edits(PinPatch::default().title("Renamed")).unwrap();
        }
        let reloaded = c.store().repository().try_load().unwrap();
        assert_eq!(reloaded[0].category.as_deref(), Some("treasure"));
        assert_eq!(reloaded[1].category, None);
        assert!(reloaded.iter().all(|p| p.title == "Renamed"));
    }

    #[test]
    fn test_toggle_completion_does_not_change_mode() {
        let mut c = controller();
        let pin = place(&mut c, 100.0, 100.0, "a");
        c.select_pin(&pin.id).unwrap();
        assert!(c.toggle_completion(&pin.id).unwrap().is_completed());
        assert_eq!(c.mode().editing_id(), Some(pin.id.as_str()));
    }

    #[test]
    fn test_clear_all() {
        let mut c = controller();
        place(&mut c, 100.0, 100.0, "a");
        place(&mut c, 200.0, 100.0, "b");
        c.clear_all();
        assert!(c.store().is_empty());
        assert!(c.mode().is_idle());
        assert_eq!(c.store().repository().store().get("pins").unwrap(), None);
    }

    #[test]
    fn test_wheel_zoom_direction() {
        let mut c = controller();
        let before = c.viewport().scale();
        assert!(c.wheel(-120.0, Point::new(300.0, 300.0)));
        assert!(c.viewport().scale() > before);
        assert!(c.wheel(120.0, Point::new(300.0, 300.0)));
        assert!((c.viewport().scale() - before).abs() < 1e-9);
        assert!(!c.wheel(0.0, Point::new(300.0, 300.0)));
    }
}
