//! Display-space geometry for annotations.
//!
//! Everything here is pure: functions take an annotation by reference and
//! return derived values or a new annotation.

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;

/// Distance (display units) within which a pointer grabs a corner handle.
pub const HANDLE_RADIUS: f64 = 10.0;

/// Shapes smaller than this on both axes are never persisted.
pub const MIN_SHAPE_SIZE: f64 = 5.0;

/// A point in display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// This point shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// This point multiplied by a uniform scale factor.
    pub fn scaled(&self, scale: f64) -> Point {
        Point {
            x: self.x * scale,
            y: self.y * scale,
        }
    }
}

/// An axis-aligned box with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Build from two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        let max_x = a.x.max(b.x);
        let max_y = a.y.max(b.y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Inclusive containment.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Position of a named corner.
    pub fn corner(&self, handle: CornerHandle) -> Point {
        match handle {
            CornerHandle::TopLeft => Point::new(self.min_x, self.min_y),
            CornerHandle::TopRight => Point::new(self.max_x, self.min_y),
            CornerHandle::BottomLeft => Point::new(self.min_x, self.max_y),
            CornerHandle::BottomRight => Point::new(self.max_x, self.max_y),
        }
    }

    /// The same box in another space, multiplied by `scale`.
    pub fn scaled(&self, scale: f64) -> Bounds {
        Bounds::from_corners(
            Point::new(self.min_x, self.min_y).scaled(scale),
            Point::new(self.max_x, self.max_y).scaled(scale),
        )
    }
}

/// One of the four corner grab targets of a selected annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CornerHandle {
    /// Corners in hit-test order. The first match wins when handles overlap.
    pub const CHECK_ORDER: [CornerHandle; 4] = [
        CornerHandle::TopLeft,
        CornerHandle::TopRight,
        CornerHandle::BottomLeft,
        CornerHandle::BottomRight,
    ];
}

/// Bounding box of an annotation regardless of which corner `start` is.
pub fn normalized_bounds(annotation: &Annotation) -> Bounds {
    Bounds::from_corners(annotation.start, annotation.end)
}

/// Whether `point` lies inside the annotation's bounding box (inclusive).
pub fn hit_test(point: Point, annotation: &Annotation) -> bool {
    normalized_bounds(annotation).contains(point)
}

/// The corner handle under `point`, if any.
pub fn resize_handle_at(point: Point, annotation: &Annotation) -> Option<CornerHandle> {
    let bounds = normalized_bounds(annotation);
    CornerHandle::CHECK_ORDER
        .into_iter()
        .find(|handle| bounds.corner(*handle).distance_to(&point) <= HANDLE_RADIUS)
}

/// A copy of `annotation` shifted by `(dx, dy)`.
pub fn translate(annotation: &Annotation, dx: f64, dy: f64) -> Annotation {
    Annotation {
        start: annotation.start.offset(dx, dy),
        end: annotation.end.offset(dx, dy),
        ..annotation.clone()
    }
}

/// A copy of `annotation` with the coordinates owned by `handle` moved to
/// `new_point`.
///
/// `start` owns the top/left coordinates and `end` the bottom/right ones, so
/// the two corners not named by `handle` keep their exact values.
pub fn resize_corner(
    annotation: &Annotation,
    handle: CornerHandle,
    new_point: Point,
) -> Annotation {
    let mut start = annotation.start;
    let mut end = annotation.end;
    match handle {
        CornerHandle::TopLeft => start = new_point,
        CornerHandle::TopRight => {
            end.x = new_point.x;
            start.y = new_point.y;
        }
        CornerHandle::BottomLeft => {
            start.x = new_point.x;
            end.y = new_point.y;
        }
        CornerHandle::BottomRight => end = new_point,
    }
    Annotation {
        start,
        end,
        ..annotation.clone()
    }
}

/// Factor mapping display-space lengths into render space.
pub fn compute_scale(display_width: f64, render_width: f64) -> f64 {
    render_width / display_width
}

/// Whether a dragged-out shape is too small to keep.
pub fn is_degenerate(start: Point, end: Point) -> bool {
    (end.x - start.x).abs() < MIN_SHAPE_SIZE && (end.y - start.y).abs() < MIN_SHAPE_SIZE
}
