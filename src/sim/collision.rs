//! Axis-aligned bounding box overlap
//!
//! Boxes are inclusive: a box at `pos` with `size` covers pixels
//! `pos ..= pos + size - 1` on each axis. Two boxes touch unless one's far
//! edge lies strictly before the other's near edge on either axis.

use glam::Vec2;

/// An entity's footprint on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Last covered pixel on each axis
    #[inline]
    pub fn far_edge(&self) -> Vec2 {
        self.pos + self.size - Vec2::ONE
    }

    /// Inclusive overlap test; symmetric in its arguments
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_far = self.far_edge();
        let b_far = other.far_edge();
        !(a_far.y < other.pos.y
            || self.pos.y > b_far.y
            || a_far.x < other.pos.x
            || self.pos.x > b_far.x)
    }
}
