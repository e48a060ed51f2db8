//! Collision helpers for the arcade prototypes
//!
//! Axis-aligned boxes and line segments only. Degenerate input (parallel or
//! zero-length segments) reports no hit instead of dividing by zero.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Below this the segment cross product is treated as zero
const PARALLEL_EPSILON: f32 = 1e-6;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(width, height))
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Strict overlap; rectangles that only touch do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.max().x > other.min().x
            && self.min().x < other.max().x
            && self.max().y > other.min().y
            && self.min().y < other.max().y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min().x
            && point.x <= self.max().x
            && point.y >= self.min().y
            && point.y <= self.max().y
    }

    /// Edges clockwise from the top edge
    pub fn edges(&self) -> [Segment; 4] {
        let (min, max) = (self.min(), self.max());
        let top_right = Vec2::new(max.x, min.y);
        let bottom_left = Vec2::new(min.x, max.y);
        [
            Segment::new(min, top_right),
            Segment::new(top_right, max),
            Segment::new(max, bottom_left),
            Segment::new(bottom_left, min),
        ]
    }
}

/// Line segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }
}

/// Intersection point of two segments, endpoints included
pub fn segment_intersection(a: &Segment, b: &Segment) -> Option<Vec2> {
    let da = a.direction();
    let db = b.direction();
    let denominator = db.y * da.x - db.x * da.y;
    if denominator.abs() < PARALLEL_EPSILON {
        return None; // Parallel, collinear or degenerate
    }

    let offset = a.start - b.start;
    let ua = (db.x * offset.y - db.y * offset.x) / denominator;
    let ub = (da.x * offset.y - da.y * offset.x) / denominator;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(a.start + da * ua)
    } else {
        None
    }
}

/// First point where `line` crosses the rectangle outline, nearest to `line.start`
pub fn rect_segment_intersection(rect: &Rect, line: &Segment) -> Option<Vec2> {
    rect.edges()
        .iter()
        .filter_map(|edge| segment_intersection(edge, line))
        .min_by(|p, q| {
            p.distance_squared(line.start)
                .total_cmp(&q.distance_squared(line.start))
        })
}

/// Mirror `point` across the infinite line through `line`
pub fn reflect_across_line(point: Vec2, line: &Segment) -> Option<Vec2> {
    let dir = line.direction();
    let len_sq = dir.length_squared();
    if len_sq < PARALLEL_EPSILON {
        return None; // Degenerate line
    }

    let t = (point - line.start).dot(dir) / len_sq;
    let foot = line.start + dir * t;
    Some(point + 2.0 * (foot - point))
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
