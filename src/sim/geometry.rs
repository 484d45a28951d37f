//! Overlap tests used by the damage resolver
//!
//! Projectiles and enemies collide as axis-aligned boxes. Area effects
//! (explosions, shatter waves) test the enemy center against a radius.

use glam::Vec2;

/// Axis-aligned rectangle, `pos` is the top-left corner (screen space, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        aabb_overlap(self, other)
    }

    /// Point containment (inclusive of the top-left edge)
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x < self.right()
            && point.y >= self.pos.y
            && point.y < self.bottom()
    }
}

/// Axis-aligned bounding-box overlap test
#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// Radial containment: is `point` strictly inside the circle?
#[inline]
pub fn within_radius(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) < radius * radius
}

/// True when `pos` lies outside the `[0, width] x [0, height]` play area
#[inline]
pub fn out_of_bounds(pos: Vec2, width: f32, height: f32) -> bool {
    pos.x < 0.0 || pos.x > width || pos.y < 0.0 || pos.y > height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(aabb_overlap(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(aabb_overlap(&a, &Rect::new(2.0, 2.0, 2.0, 2.0)));
        // Touching edges are not an overlap
        assert!(!aabb_overlap(&a, &Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!aabb_overlap(&a, &Rect::new(0.0, 10.0, 5.0, 5.0)));
        assert!(!aabb_overlap(&a, &Rect::new(20.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = Rect::new(3.0, 4.0, 8.0, 2.0);
        let b = Rect::new(9.0, 5.0, 4.0, 4.0);
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn test_within_radius_is_strict() {
        let c = Vec2::new(100.0, 100.0);
        assert!(within_radius(c, 10.0, Vec2::new(105.0, 100.0)));
        assert!(!within_radius(c, 10.0, Vec2::new(110.0, 100.0)));
        assert!(!within_radius(c, 0.0, c));
    }

    #[test]
    fn test_out_of_bounds() {
        assert!(!out_of_bounds(Vec2::new(0.0, 0.0), 100.0, 100.0));
        assert!(!out_of_bounds(Vec2::new(100.0, 100.0), 100.0, 100.0));
        assert!(out_of_bounds(Vec2::new(-0.1, 50.0), 100.0, 100.0));
        assert!(out_of_bounds(Vec2::new(50.0, 100.5), 100.0, 100.0));
    }

    #[test]
    fn test_rect_center_and_contains() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
        assert!(r.contains(Vec2::new(10.0, 20.0)));
        assert!(!r.contains(Vec2::new(40.0, 60.0)));
    }
}
