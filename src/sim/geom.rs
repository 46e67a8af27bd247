//! Collision detection and response for axis-aligned geometry
//!
//! Every moving body (player, props, hostiles, boss) collides the same way:
//! move along one axis, then push the body back out of whatever it overlaps
//! along that same axis. Resolving x and y separately keeps corner cases
//! (walking into a wall while landing) stable without contact manifolds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{GROUND_EPSILON, SWEEP_STEP};

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Build a rectangle; negative extents collapse to zero
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w: if w < 0.0 { 0.0 } else { w },
            h: if h < 0.0 { 0.0 } else { h },
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Same rectangle shifted by `delta`
    #[inline]
    pub fn translated(&self, delta: Vec2) -> Self {
        Self { x: self.x + delta.x, y: self.y + delta.y, ..*self }
    }

    /// True if the point lies inside (half-open on the far edges)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Which axis a resolution pass works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Result of resolving a body along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisHit {
    /// Whether any solid was overlapped
    pub hit: bool,
    /// Vertical axis only: pushed up onto a solid's top
    pub ground: bool,
    /// Vertical axis only: pushed down from a solid's underside
    pub ceiling: bool,
}

impl AxisHit {
    pub fn miss() -> Self {
        Self::default()
    }

    fn merge(&mut self, other: AxisHit) {
        self.hit |= other.hit;
        self.ground |= other.ground;
        self.ceiling |= other.ceiling;
    }
}

/// Half-open AABB intersection: touching edges do not overlap
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Check whether a disc overlaps a rectangle
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = Vec2::new(
        center.x.clamp(rect.x, rect.right()),
        center.y.clamp(rect.y, rect.bottom()),
    );
    (center - closest).length_squared() < radius * radius
}

/// Push `rect` out of every overlapping solid along `axis`
///
/// The push direction follows the sign of `velocity`. With zero velocity the
/// side with the smaller penetration wins. Up to three passes handle a body
/// wedged between several solids.
pub fn resolve_axis(rect: &mut Rect, solids: &[Rect], axis: Axis, velocity: f32) -> AxisHit {
    let mut result = AxisHit::miss();

    for _ in 0..3 {
        let mut moved = false;
        for solid in solids {
            if !rects_overlap(rect, solid) {
                continue;
            }
            moved = true;
            result.hit = true;

            match axis {
                Axis::X => {
                    let to_left = solid.x - rect.right();
                    let to_right = solid.right() - rect.x;
                    rect.x = if pick_push(velocity, to_left, to_right) <= 0.0 {
                        solid.x - rect.w
                    } else {
                        solid.right()
                    };
                }
                Axis::Y => {
                    let to_top = solid.y - rect.bottom();
                    let to_bottom = solid.bottom() - rect.y;
                    if pick_push(velocity, to_top, to_bottom) <= 0.0 {
                        rect.y = solid.y - rect.h;
                        result.ground = true;
                    } else {
                        rect.y = solid.bottom();
                        result.ceiling = true;
                    }
                }
            }
        }
        if !moved {
            break;
        }
    }

    result
}

/// Choose the negative or positive push for one overlap
#[inline]
fn pick_push(velocity: f32, negative: f32, positive: f32) -> f32 {
    if velocity > 0.0 {
        negative
    } else if velocity < 0.0 {
        positive
    } else if negative.abs() <= positive.abs() {
        negative
    } else {
        positive
    }
}

/// Move `rect` by `delta` along `axis`, resolving after every chunk
///
/// Chunks are at most `SWEEP_STEP` long so thin platforms cannot be skipped
/// by fast or small bodies. Stops at the first chunk that hits something.
pub fn sweep_axis(rect: &mut Rect, solids: &[Rect], axis: Axis, delta: f32) -> AxisHit {
    if delta == 0.0 {
        return resolve_axis(rect, solids, axis, 0.0);
    }

    let chunks = (delta.abs() / SWEEP_STEP).ceil().max(1.0) as u32;
    let step = delta / chunks as f32;
    let mut result = AxisHit::miss();

    for _ in 0..chunks {
        match axis {
            Axis::X => rect.x += step,
            Axis::Y => rect.y += step,
        }
        let hit = resolve_axis(rect, solids, axis, step);
        result.merge(hit);
        if hit.hit {
            break;
        }
    }

    result
}

/// True if the rect's bottom edge rests on a horizontally overlapping solid
pub fn is_grounded(rect: &Rect, solids: &[Rect]) -> bool {
    solids.iter().any(|solid| {
        rect.x < solid.right()
            && rect.right() > solid.x
            && (rect.bottom() - solid.y).abs() <= GROUND_EPSILON
    })
}

/// True if `rect` overlaps any solid
pub fn overlaps_any(rect: &Rect, solids: &[Rect]) -> bool {
    solids.iter().any(|solid| rects_overlap(rect, solid))
}
