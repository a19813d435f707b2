//! Axis-aligned geometry helpers shared by movement, perception and combat.
//!
//! Everything in the arena is either a point (agents, bullets, supplies) or a
//! static axis-aligned rectangle (obstacles). The helpers here cover the few
//! tests the resolvers need:
//!
//! - point-in-rectangle, optionally with the rectangle inflated by a radius
//! - nearest point on a rectangle and the distance to it
//! - rectangle overlap with a separating margin
//! - clamping a point into the playable map area

use glam::Vec2;
use serde::{Deserialize, Serialize};

// =============================================================================
// Rect
// =============================================================================

/// An axis-aligned rectangle stored as its minimum corner plus extent.
///
/// `(x, y)` is the corner with the smallest coordinates; the rectangle spans
/// `[x, x + w] × [y, y + h]`. Edges are inclusive for every containment test.
///
/// # Example
///
/// ```
/// use skirmish_core::geometry::Rect;
/// use glam::Vec2;
///
/// let wall = Rect::new(10.0, 10.0, 6.0, 4.0);
/// assert!(wall.contains(Vec2::new(12.0, 12.0)));
/// assert!(!wall.contains(Vec2::new(9.0, 12.0)));
/// assert!(wall.inflated(2.0).contains(Vec2::new(9.0, 12.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum x coordinate.
    pub x: f32,
    /// Minimum y coordinate.
    pub y: f32,
    /// Width along x.
    pub w: f32,
    /// Height along y.
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle from its minimum corner and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Maximum x coordinate.
    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.x + self.w
    }

    /// Maximum y coordinate.
    #[must_use]
    pub fn max_y(&self) -> f32 {
        self.y + self.h
    }

    /// Returns the rectangle grown by `radius` on every side.
    #[must_use]
    pub fn inflated(&self, radius: f32) -> Self {
        Self {
            x: self.x - radius,
            y: self.y - radius,
            w: self.w + 2.0 * radius,
            h: self.h + 2.0 * radius,
        }
    }

    /// Returns true if `point` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.max_x() && point.y >= self.y && point.y <= self.max_y()
    }

    /// Returns the point of the rectangle closest to `point`.
    ///
    /// Points inside the rectangle map to themselves.
    #[must_use]
    pub fn nearest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.x, self.max_x()),
            point.y.clamp(self.y, self.max_y()),
        )
    }

    /// Euclidean distance from `point` to the rectangle (0 when inside).
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        point.distance(self.nearest_point(point))
    }

    /// Returns true unless the two rectangles are separated by more than
    /// `margin` along at least one axis.
    #[must_use]
    pub fn overlaps_with_margin(&self, other: &Rect, margin: f32) -> bool {
        !(self.max_x() + margin < other.x
            || other.max_x() + margin < self.x
            || self.max_y() + margin < other.y
            || other.max_y() + margin < self.y)
    }

    /// Returns the rectangle as `[x, y, w, h]`.
    #[must_use]
    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.w, self.h]
    }
}

// =============================================================================
// Map bounds
// =============================================================================

/// Clamps `point` into the movement area `[0, width - 1] × [0, height - 1]`.
///
/// The one-unit inset keeps every resolved position strictly inside the
/// half-open map `[0, width) × [0, height)`.
#[must_use]
pub fn clamp_to_map(point: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        point.x.clamp(0.0, (width - 1.0).max(0.0)),
        point.y.clamp(0.0, (height - 1.0).max(0.0)),
    )
}

/// Returns true if `point` lies within the half-open map `[0, width) × [0, height)`.
#[must_use]
pub fn in_map(point: Vec2, width: f32, height: f32) -> bool {
    point.x >= 0.0 && point.x < width && point.y >= 0.0 && point.y < height
}
