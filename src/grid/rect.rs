use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two corner points
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            width: (a.0 - b.0).abs(),
            height: (a.1 - b.1).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Overlap test; rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Strict interior test, points on the border are outside
    pub fn contains_point(&self, point: (f32, f32)) -> bool {
        let (x, y) = point;
        self.x < x && x < self.right() && self.y < y && y < self.bottom()
    }

    /// Inside `0..width` and `0..height` of an image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= width as f32 && self.bottom() <= height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_normalize() {
        let rect = Rect::from_corners((10.0, 4.0), (2.0, 12.0));
        assert_eq!(rect, Rect::new(2.0, 4.0, 8.0, 8.0));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 8.0, 8.0);
        let b = Rect::new(8.0, 0.0, 8.0, 8.0);
        let c = Rect::new(7.0, 7.0, 2.0, 2.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(b.intersects(&c));
    }

    #[test]
    fn test_border_points_are_outside() {
        let rect = Rect::new(0.0, 0.0, 8.0, 8.0);
        assert!(rect.contains_point((4.0, 4.0)));
        assert!(!rect.contains_point((0.0, 4.0)));
        assert!(!rect.contains_point((8.0, 4.0)));
        assert!(!rect.contains_point((4.0, 8.0)));
    }

    #[test]
    fn test_fits_within() {
        assert!(Rect::new(56.0, 56.0, 8.0, 8.0).fits_within(64, 64));
        assert!(!Rect::new(60.0, 0.0, 8.0, 8.0).fits_within(64, 64));
    }
}
