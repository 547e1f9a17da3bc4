use pinmap_shared::coords::Size;
use pinmap_shared::viewport::ViewportConfig;

/// `localStorage` key holding the pin list.
pub const STORAGE_KEY: &str = "image-map-pins";

/// Key for the in-memory copy of pins opened from a share link.
pub const SHARED_KEY: &str = "shared-pins";

/// Movement below this is treated as a click.
pub const DRAG_THRESHOLD: f64 = 4.0;

/// Larger than mouse because touch is less precise.
pub const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// Two taps on the same pin within this window count as a double tap.
pub const DOUBLE_TAP_MS: i64 = 300;

pub const ZOOM_MIN: f64 = 0.2;
pub const ZOOM_MAX: f64 = 5.0;
pub const ZOOM_STEP: f64 = 0.2;

/// Stand-in size when the map image cannot be loaded, so pins can still be
/// placed on the placeholder.
pub const FALLBACK_MAP_SIZE: Size = Size {
    width: 2000.0,
    height: 1500.0,
};

pub fn viewport_config() -> ViewportConfig {
    ViewportConfig {
        min_scale: ZOOM_MIN,
        max_scale: ZOOM_MAX,
        zoom_step: ZOOM_STEP,
        drag_threshold: DRAG_THRESHOLD,
        touch_drag_threshold: TOUCH_DRAG_THRESHOLD,
    }
}
