//! Overlap probes for circles and axis-aligned rectangles
//!
//! Every collision check in the game funnels through these. Rectangles come
//! in two flavors: top-left anchored (`Rect`) and center anchored (the
//! `*_centered` entry points), which normalize and delegate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Build from a center point and full size
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Zero or negative extent on either axis
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }
}

/// Visible play area, origin at the top-left, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp `x` so a body of half-width `half` stays inside horizontally
    #[inline]
    pub fn clamp_x(&self, x: f32, half: f32) -> f32 {
        x.clamp(half, (self.width - half).max(half))
    }

    /// Clamp `y` so a body of half-height `half` stays inside vertically
    #[inline]
    pub fn clamp_y(&self, y: f32, half: f32) -> f32 {
        y.clamp(half, (self.height - half).max(half))
    }
}

/// Two circles overlap when the squared center distance is strictly below
/// the squared radius sum. Touching circles do not overlap.
#[inline]
pub fn circles_overlap(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    let reach = r1 + r2;
    c1.distance_squared(c2) < reach * reach
}

/// Separating-axis test for top-left anchored rectangles.
///
/// Edges that exactly touch count as overlapping; degenerate rectangles
/// never overlap anything.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    let (a_max, b_max) = (a.max(), b.max());
    if a.min.x > b_max.x || a_max.x < b.min.x {
        return false; // No horizontal projection overlap
    }
    if a.min.y > b_max.y || a_max.y < b.min.y {
        return false; // No vertical projection overlap
    }
    true
}

/// `rects_overlap` for center anchored rectangles
pub fn rects_overlap_centered(c1: Vec2, size1: Vec2, c2: Vec2, size2: Vec2) -> bool {
    rects_overlap(&Rect::from_center(c1, size1), &Rect::from_center(c2, size2))
}

/// Circle vs top-left anchored rectangle.
///
/// Clamps the circle center into the rectangle and compares the squared
/// distance from that closest point against the squared radius.
pub fn circle_rect_overlap(rect: &Rect, center: Vec2, radius: f32) -> bool {
    if rect.is_degenerate() {
        return false;
    }
    let closest = center.clamp(rect.min, rect.max());
    closest.distance_squared(center) < radius * radius
}

/// `circle_rect_overlap` for a center anchored rectangle
pub fn circle_rect_overlap_centered(
    rect_center: Vec2,
    rect_size: Vec2,
    center: Vec2,
    radius: f32,
) -> bool {
    circle_rect_overlap(&Rect::from_center(rect_center, rect_size), center, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_touching_circles_do_not_overlap() {
        // 3-4-5 triangle: distance exactly equals r1 + r2
        assert!(!circles_overlap(Vec2::ZERO, 2.0, Vec2::new(3.0, 4.0), 3.0));
        assert!(circles_overlap(Vec2::ZERO, 2.1, Vec2::new(3.0, 4.0), 3.0));
    }

    #[test]
    fn test_zero_radius_circles_never_overlap() {
        assert!(!circles_overlap(Vec2::ONE, 0.0, Vec2::ONE, 0.0));
    }

    #[test]
    fn test_rects_overlap_and_separation() {
        let a = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Rect::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        let c = Rect::new(Vec2::new(20.0, 0.0), Vec2::new(5.0, 5.0));
        assert!(rects_overlap(&a, &b));
        assert!(!rects_overlap(&a, &c));

        // Shared edge counts as overlap
        let d = Rect::new(Vec2::new(10.0, 0.0), Vec2::new(5.0, 5.0));
        assert!(rects_overlap(&a, &d));
    }

    #[test]
    fn test_degenerate_rect_never_overlaps() {
        let a = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let point = Rect::new(Vec2::new(5.0, 5.0), Vec2::ZERO);
        assert!(!rects_overlap(&a, &point));
        assert!(!circle_rect_overlap(&point, Vec2::new(5.0, 5.0), 3.0));
    }

    #[test]
    fn test_centered_rects_match_top_left_form() {
        assert!(rects_overlap_centered(
            Vec2::new(10.0, 10.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(13.0, 10.0),
            Vec2::new(4.0, 4.0),
        ));
        assert!(!rects_overlap_centered(
            Vec2::new(10.0, 10.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(15.0, 10.0),
            Vec2::new(4.0, 4.0),
        ));
    }

    #[test]
    fn test_circle_rect_overlap() {
        let rect = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));

        // Center inside the rectangle
        assert!(circle_rect_overlap(&rect, Vec2::new(5.0, 5.0), 1.0));
        // Near the right edge
        assert!(circle_rect_overlap(&rect, Vec2::new(12.0, 5.0), 2.5));
        assert!(!circle_rect_overlap(&rect, Vec2::new(12.0, 5.0), 2.0));
        // Diagonal from the corner: distance sqrt(8) ~ 2.83
        assert!(!circle_rect_overlap(&rect, Vec2::new(12.0, 12.0), 2.8));
        assert!(circle_rect_overlap(&rect, Vec2::new(12.0, 12.0), 2.9));
    }

    #[test]
    fn test_circle_rect_centered() {
        // Projectile hitbox vs enemy circle
        assert!(circle_rect_overlap_centered(
            Vec2::new(100.0, 50.0),
            Vec2::new(6.0, 12.0),
            Vec2::new(100.0, 55.0),
            15.0,
        ));
        assert!(!circle_rect_overlap_centered(
            Vec2::new(100.0, 50.0),
            Vec2::new(6.0, 12.0),
            Vec2::new(140.0, 55.0),
            15.0,
        ));
    }

    proptest! {
        #[test]
        fn prop_circles_overlap_iff_strictly_closer(
            x1 in -200i32..200, y1 in -200i32..200,
            x2 in -200i32..200, y2 in -200i32..200,
            r1 in 0i32..100, r2 in 0i32..100,
        ) {
            // Integer inputs keep every intermediate exact in f32
            let d2 = i64::from(x1 - x2).pow(2) + i64::from(y1 - y2).pow(2);
            let reach2 = i64::from(r1 + r2).pow(2);
            let hit = circles_overlap(
                Vec2::new(x1 as f32, y1 as f32),
                r1 as f32,
                Vec2::new(x2 as f32, y2 as f32),
                r2 as f32,
            );
            prop_assert_eq!(hit, d2 < reach2);
        }

        #[test]
        fn prop_rects_overlap_is_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            aw in 0.0f32..50.0, ah in 0.0f32..50.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            bw in 0.0f32..50.0, bh in 0.0f32..50.0,
        ) {
            let a = Rect::new(Vec2::new(ax, ay), Vec2::new(aw, ah));
            let b = Rect::new(Vec2::new(bx, by), Vec2::new(bw, bh));
            prop_assert_eq!(rects_overlap(&a, &b), rects_overlap(&b, &a));
        }
    }
}
