//! Pan and zoom state for the map image.
//!
//! Frame: all points are container-relative pixels. The image is centered in
//! the container, shifted by `offset`, and drawn at `natural size * scale`.
//! `offset` is unclamped, so the image may be dragged past its edges.

use crate::coords::{self, ImageRect, Point, Size};
use crate::mode::InteractionMode;
use crate::models::Position;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Largest scale change a single zoom gesture may apply.
    pub zoom_step: f64,
    /// Pointer travel (px) below which a press/release is a click, not a pan.
    pub drag_threshold: f64,
    /// Same for touch, where fingers wobble more.
    pub touch_drag_threshold: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 5.0,
            zoom_step: 0.2,
            drag_threshold: 4.0,
            touch_drag_threshold: 8.0,
        }
    }
}

/// How a pointer press/release pair resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// No press was in progress.
    None,
    /// Travel stayed under the threshold; eligible for placement/relocation.
    Click(Point),
    /// The pointer travelled; the gesture was a pan (or an aborted one).
    Pan,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    press: Point,
    threshold: f64,
    /// Pointer minus offset at press time.
    anchor: Point,
    travel: f64,
    pan_enabled: bool,
    panning: bool,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    config: ViewportConfig,
    scale: f64,
    offset: Point,
    container: Size,
    image: Option<Size>,
    drag: Option<Drag>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            scale: 1.0_f64.clamp(config.min_scale, config.max_scale),
            offset: Point::default(),
            container: Size::default(),
            image: None,
            drag: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn image_size(&self) -> Option<Size> {
        self.image
    }

    /// True once the map image has a usable natural size.
    pub fn image_ready(&self) -> bool {
        self.image.is_some()
    }

    /// True between a press and its release or cancellation.
    pub fn is_pressed(&self) -> bool {
        self.drag.is_some()
    }

    /// True while a pan is actually moving the image.
    pub fn is_panning(&self) -> bool {
        self.drag.is_some_and(|d| d.panning)
    }

    pub fn set_container(&mut self, container: Size) {
        self.container = container;
    }

    /// Record the natural image size. Empty sizes are treated as "not loaded".
    pub fn set_image_size(&mut self, size: Size) {
        self.image = if size.is_empty() { None } else { Some(size) };
    }

    /// Rendered image rectangle in container coordinates.
    pub fn image_rect(&self) -> Option<ImageRect> {
        let image = self.image?;
        let width = image.width * self.scale;
        let height = image.height * self.scale;
        Some(ImageRect {
            left: self.container.width / 2.0 + self.offset.x - width / 2.0,
            top: self.container.height / 2.0 + self.offset.y - height / 2.0,
            width,
            height,
        })
    }

    /// Container point to normalized image position.
    pub fn unproject(&self, point: Point) -> Option<Position> {
        coords::pointer_to_percent(point.x, point.y, &self.image_rect()?)
    }

    /// Normalized image position to container point.
    pub fn project(&self, position: Position) -> Option<Point> {
        Some(coords::percent_to_pointer(position, &self.image_rect()?))
    }

    /// Start tracking a press. The press is always recorded so a click can be
    /// recognised on release, but panning stays off while `mode` is picking
    /// a position.
    pub fn begin_drag(&mut self, pointer: Point, mode: &InteractionMode) {
        self.start_drag(pointer, mode, self.config.drag_threshold);
    }

    /// [`Self::begin_drag`] with the touch threshold.
    pub fn begin_touch_drag(&mut self, pointer: Point, mode: &InteractionMode) {
        self.start_drag(pointer, mode, self.config.touch_drag_threshold);
    }

    fn start_drag(&mut self, pointer: Point, mode: &InteractionMode, threshold: f64) {
        self.drag = Some(Drag {
            press: pointer,
            threshold,
            anchor: pointer - self.offset,
            travel: 0.0,
            pan_enabled: !mode.suppresses_pan(),
            panning: false,
        });
    }

    /// Follow the pointer. Returns true if the offset changed. Moves after
    /// [`Self::end_drag`] are ignored.
    pub fn continue_drag(&mut self, pointer: Point) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        drag.travel = drag.travel.max(pointer.distance(drag.press));
        if drag.pan_enabled && !drag.panning && drag.travel >= drag.threshold {
            drag.panning = true;
        }
        if !drag.panning {
            return false;
        }
        self.offset = pointer - drag.anchor;
        true
    }

    /// Finish the press and classify it.
    pub fn end_drag(&mut self, pointer: Point) -> Gesture {
        let Some(mut drag) = self.drag.take() else {
            return Gesture::None;
        };
        drag.travel = drag.travel.max(pointer.distance(drag.press));
        if drag.travel < drag.threshold {
            Gesture::Click(drag.press)
        } else {
            Gesture::Pan
        }
    }

    /// Abandon the press without producing a click (pointer left the map).
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Change the scale by `delta`, limited to one zoom step and the scale
    /// range. With an anchor, the content under it stays put. Returns true
    /// if the scale changed.
    pub fn zoom_by(&mut self, delta: f64, anchor: Option<Point>) -> bool {
        let step = self.config.zoom_step;
        let delta = delta.clamp(-step, step);
        let old = self.scale;
        let new = (old + delta).clamp(self.config.min_scale, self.config.max_scale);
        if (new - old).abs() < 1e-12 {
            return false;
        }
        if let Some(anchor) = anchor {
            let center = Point::new(self.container.width / 2.0, self.container.height / 2.0);
            let from_image_center = anchor - center - self.offset;
            let fraction = new / old - 1.0;
            self.offset = Point::new(
                self.offset.x - from_image_center.x * fraction,
                self.offset.y - from_image_center.y * fraction,
            );
        }
        self.scale = new;
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.config.zoom_step, None)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(-self.config.zoom_step, None)
    }

    /// Scale at which the whole image fits the container (1.0 until both
    /// sizes are known), limited to the scale range.
    pub fn baseline_scale(&self) -> f64 {
        let fit = match self.image {
            Some(image) if !self.container.is_empty() => (self.container.width / image.width)
                .min(self.container.height / image.height),
            _ => 1.0,
        };
        fit.clamp(self.config.min_scale, self.config.max_scale)
    }

    pub fn reset_to_fit(&mut self) {
        self.scale = self.baseline_scale();
        self.offset = Point::default();
        self.drag = None;
        tracing::debug!(scale = self.scale, "Viewport reset to fit");
    }

    /// Pan so that `position` lands at the container center, keeping the
    /// current scale. No-op until the image size is known.
    pub fn center_on(&mut self, position: Position) -> bool {
        let Some(image) = self.image else {
            return false;
        };
        self.offset = Point::new(
            -(position.x / 100.0 - 0.5) * image.width * self.scale,
            -(position.y / 100.0 - 0.5) * image.height * self.scale,
        );
        true
    }
}
