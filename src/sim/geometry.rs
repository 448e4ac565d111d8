//! Axis-aligned rectangles
//!
//! Every entity, platform and ladder is a `Rect`. Edges are half-open: the
//! right and bottom edges are exclusive, so two rectangles that only share an
//! edge do not intersect.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::LANDING_TOLERANCE;

/// An axis-aligned box in world pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.center_y())
    }

    /// Top-left corner
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.width;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.height;
    }

    /// True iff the two rectangles overlap on both axes
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.overlaps_horizontally(other)
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// True iff the horizontal extents overlap
    #[inline]
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.left() < other.right() && other.left() < self.right()
    }

    /// True iff `x` lies within `[left, right)`
    #[inline]
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left() && x < self.right()
    }

    /// True iff the point lies inside the rectangle
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.contains_x(p.x) && p.y >= self.top() && p.y < self.bottom()
    }
}

/// Free-function form of [`Rect::intersects`]
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

/// Whether an entity moving with vertical velocity `vy` lands on top of `platform`.
///
/// The entity must overlap the platform horizontally, be moving downward, and
/// have its bottom edge at or at most [`LANDING_TOLERANCE`] below the platform
/// top. Anything deeper is a side contact and is ignored.
pub fn landing_allowed(entity: &Rect, vy: f32, platform: &Rect) -> bool {
    vy > 0.0
        && entity.overlaps_horizontally(platform)
        && entity.bottom() >= platform.top()
        && entity.bottom() <= platform.top() + LANDING_TOLERANCE
}

/// The platform an entity is standing on, if any.
///
/// "Standing" means overlapping horizontally with the bottom edge within a
/// pixel of the platform top.
pub fn platform_under<'a>(entity: &Rect, platforms: &'a [Rect]) -> Option<&'a Rect> {
    platforms
        .iter()
        .find(|p| entity.overlaps_horizontally(p) && (entity.bottom() - p.top()).abs() <= 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_edges_and_center() {
        let r = Rect::new(100.0, 500.0, 30.0, 40.0);
        assert_eq!(r.right(), 130.0);
        assert_eq!(r.bottom(), 540.0);
        assert_eq!(r.center(), Vec2::new(115.0, 520.0));
    }

    #[test]
    fn test_shared_edge_is_not_an_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.intersects(&Rect::new(9.5, 9.5, 1.0, 1.0)));
    }

    #[test]
    fn test_landing_requires_downward_motion() {
        let platform = Rect::new(100.0, 450.0, 600.0, 20.0);
        let mut entity = Rect::new(200.0, 0.0, 25.0, 25.0);
        entity.set_bottom(455.0);
        assert!(landing_allowed(&entity, 1.0, &platform));
        assert!(!landing_allowed(&entity, 0.0, &platform));
        assert!(!landing_allowed(&entity, -3.0, &platform));
    }

    #[test]
    fn test_landing_rejects_side_contact() {
        let platform = Rect::new(100.0, 450.0, 600.0, 20.0);
        let mut entity = Rect::new(200.0, 0.0, 25.0, 25.0);
        entity.set_bottom(450.0 + LANDING_TOLERANCE + 1.0);
        assert!(!landing_allowed(&entity, 5.0, &platform));

        // Not over the platform at all
        let mut beside = Rect::new(60.0, 0.0, 25.0, 25.0);
        beside.set_bottom(452.0);
        assert!(!landing_allowed(&beside, 5.0, &platform));
    }

    #[test]
    fn test_platform_under() {
        let platforms = [Rect::new(0.0, 550.0, 800.0, 50.0), Rect::new(100.0, 450.0, 600.0, 20.0)];
        let mut entity = Rect::new(300.0, 0.0, 25.0, 25.0);
        entity.set_bottom(450.0);
        assert_eq!(platform_under(&entity, &platforms), Some(&platforms[1]));
        entity.set_bottom(400.0);
        assert_eq!(platform_under(&entity, &platforms), None);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.0f32..200.0, 0.0f32..200.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_intersects_is_symmetric(a in arb_rect(), b in arb_rect()) {
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }

        #[test]
        fn prop_nonempty_rect_intersects_itself(r in arb_rect()) {
            prop_assume!(r.width > 1.0 && r.height > 1.0);
            prop_assert!(r.intersects(&r));
        }
    }
}
