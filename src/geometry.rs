use serde::Serialize;

use crate::error::GeometryError;

/// Axis-aligned rectangle in pixel space, stored as two corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    /// Build a rectangle from two corners. The corners are ordered so that
    /// `x1 <= x2` and `y1 <= y2` always hold.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// The region covering a whole `width` x `height` image, `(0, 0, w-1, h-1)`.
    pub fn from_image_size(width: u32, height: u32) -> Self {
        Self::new(
            0.0,
            0.0,
            width.saturating_sub(1) as f64,
            height.saturating_sub(1) as f64,
        )
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Area shared with `other`; zero when the rectangles do not overlap.
    pub fn intersection_area(&self, other: &Rectangle) -> f64 {
        let left = self.x1.max(other.x1);
        let top = self.y1.max(other.y1);
        let right = self.x2.min(other.x2);
        let bottom = self.y2.min(other.y2);

        (right - left).max(0.0) * (bottom - top).max(0.0)
    }

    /// Drop the fractional part of every coordinate (toward zero).
    pub fn truncate(&self) -> Self {
        Self::new(
            self.x1.trunc(),
            self.y1.trunc(),
            self.x2.trunc(),
            self.y2.trunc(),
        )
    }
}

/// Intersection over union of two rectangles.
///
/// Returns `0.0` when the union has no area, so degenerate boxes never
/// divide by zero.
pub fn iou(a: &Rectangle, b: &Rectangle) -> f64 {
    let intersection = a.intersection_area(b);
    let union = a.area() + b.area() - intersection;

    if union == 0.0 {
        return 0.0;
    }

    intersection / union
}

/// Convert a normalized centre-form box (`cx`, `cy`, `w`, `h` in 0..1) into
/// absolute pixel corners.
///
/// Each edge is truncated to a whole pixel and clamped to `[0, image_w]` or
/// `[0, image_h]`, so boxes that stick out of the frame are cut at the
/// border and boxes entirely outside it collapse onto the border.
pub fn from_normalized_box(
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
    image_w: u32,
    image_h: u32,
) -> Rectangle {
    let (iw, ih) = (image_w as f64, image_h as f64);

    let left = ((cx - w / 2.0) * iw).trunc().clamp(0.0, iw);
    let top = ((cy - h / 2.0) * ih).trunc().clamp(0.0, ih);
    let right = ((cx + w / 2.0) * iw).trunc().clamp(0.0, iw);
    let bottom = ((cy + h / 2.0) * ih).trunc().clamp(0.0, ih);

    Rectangle::new(left, top, right, bottom)
}

/// Find the candidate overlapping `target` the most.
///
/// Returns the index and IoU of the best candidate. On ties the earliest
/// candidate is kept.
pub fn closest_by_iou(
    target: &Rectangle,
    candidates: &[Rectangle],
) -> Result<(usize, f64), GeometryError> {
    let (first, rest) = candidates.split_first().ok_or(GeometryError::EmptyInput)?;

    let mut best = (0, iou(target, first));
    for (idx, candidate) in rest.iter().enumerate() {
        let score = iou(target, candidate);
        if score > best.1 {
            best = (idx + 1, score);
        }
    }

    Ok(best)
}
