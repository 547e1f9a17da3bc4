use crate::models::Position;

/// A point in screen space (client or container pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or NaN.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Where the image currently renders, after pan and zoom, in the same frame
/// as the pointer coordinates handed to [`pointer_to_percent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(client_x: f64, client_y: f64, rect_left: f64, rect_top: f64) -> Point {
    Point::new(client_x - rect_left, client_y - rect_top)
}

/// Pointer position to image-relative percentages.
///
/// No clamping: points outside the rendered image give values outside
/// `[0, 100]`. Returns `None` for a zero-sized rectangle (image not loaded).
pub fn pointer_to_percent(pointer_x: f64, pointer_y: f64, rect: &ImageRect) -> Option<Position> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    Some(Position::new(
        (pointer_x - rect.left) / rect.width * 100.0,
        (pointer_y - rect.top) / rect.height * 100.0,
    ))
}

/// Inverse of [`pointer_to_percent`].
pub fn percent_to_pointer(position: Position, rect: &ImageRect) -> Point {
    Point::new(
        rect.left + position.x / 100.0 * rect.width,
        rect.top + position.y / 100.0 * rect.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: f64, top: f64, width: f64, height: f64) -> ImageRect {
        ImageRect {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn test_client_to_container_offset() {
        let p = client_to_container(450.0, 350.0, 320.0, 50.0);
        assert!((p.x - 130.0).abs() < 1e-9);
        assert!((p.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_to_percent_center() {
        let pos = pointer_to_percent(600.0, 400.0, &rect(100.0, 100.0, 1000.0, 600.0)).unwrap();
        assert!((pos.x - 50.0).abs() < 1e-9);
        assert!((pos.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_to_percent_origin_and_corner() {
        let r = rect(-200.0, 30.0, 400.0, 200.0);
        let origin = pointer_to_percent(-200.0, 30.0, &r).unwrap();
        assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);
        let corner = pointer_to_percent(200.0, 230.0, &r).unwrap();
        assert!((corner.x - 100.0).abs() < 1e-9);
        assert!((corner.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_outside_image_is_not_clamped() {
        let pos = pointer_to_percent(90.0, 720.0, &rect(100.0, 100.0, 1000.0, 600.0)).unwrap();
        assert!((pos.x - (-1.0)).abs() < 1e-9);
        assert!(pos.y > 100.0);
    }

    #[test]
    fn test_zero_sized_rect_is_rejected() {
        assert!(pointer_to_percent(10.0, 10.0, &rect(0.0, 0.0, 0.0, 500.0)).is_none());
        assert!(pointer_to_percent(10.0, 10.0, &rect(0.0, 0.0, 500.0, 0.0)).is_none());
        assert!(pointer_to_percent(10.0, 10.0, &rect(0.0, 0.0, f64::NAN, 500.0)).is_none());
    }

    #[test]
    fn test_percent_pointer_inverse_over_grid() {
        let rects = [
            rect(0.0, 0.0, 2048.0, 2048.0),
            rect(-731.25, 88.5, 409.6, 307.2),
            rect(12.0, -4000.0, 10240.0, 7680.0),
        ];
        for r in &rects {
            for i in 0..=20 {
                for j in 0..=20 {
                    let original = Position::new(i as f64 * 5.0, j as f64 * 5.0);
                    let screen = percent_to_pointer(original, r);
                    let back = pointer_to_percent(screen.x, screen.y, r).unwrap();
                    assert!((back.x - original.x).abs() < 1e-6);
                    assert!((back.y - original.y).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_size_is_empty() {
        assert!(Size::default().is_empty());
        assert!(Size::new(10.0, 0.0).is_empty());
        assert!(!Size::new(10.0, 5.0).is_empty());
    }

    #[test]
    fn test_point_distance() {
        let d = Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-9);
    }
}
