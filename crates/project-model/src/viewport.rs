//! Viewport and region types for camera framing.
//!
//! All coordinates are normalized to `[0.0, 1.0]` range.

use serde::{Deserialize, Serialize};

/// A rectangular viewport within the capture region.
///
/// Coordinates are normalized: `(0.0, 0.0)` is top-left,
/// `(1.0, 1.0)` is bottom-right of the full capture area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge (normalized).
    pub x: f64,
    /// Top edge (normalized).
    pub y: f64,
    /// Width (normalized).
    pub w: f64,
    /// Height (normalized).
    pub h: f64,
}

impl Viewport {
    /// Full-screen viewport (no zoom).
    pub const FULL: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// Create a new viewport, clamping values to valid range.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            w: w.clamp(0.01, 1.0), // minimum 1% width
            h: h.clamp(0.01, 1.0), // minimum 1% height
        }
    }

    /// Create a viewport centered at `(cx, cy)` with given dimensions.
    /// Automatically clamps to stay within [0, 1] bounds.
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        let w = w.clamp(0.01, 1.0);
        let h = h.clamp(0.01, 1.0);

        let x = (cx - w / 2.0).clamp(0.0, 1.0 - w);
        let y = (cy - h / 2.0).clamp(0.0, 1.0 - h);

        Self { x, y, w, h }
    }

    /// The center point of this viewport.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        (self.x + self.w).min(1.0)
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        (self.y + self.h).min(1.0)
    }

    /// Effective zoom factor (1.0 = no zoom, 2.0 = 200% zoom).
    pub fn zoom_factor(&self) -> f64 {
        1.0 / self.w.min(self.h)
    }

    /// Check if a normalized point is within this viewport.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Linearly interpolate between two viewports.
    pub fn lerp(a: &Viewport, b: &Viewport, t: f64) -> Viewport {
        let t = t.clamp(0.0, 1.0);
        Viewport {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            w: a.w + (b.w - a.w) * t,
            h: a.h + (b.h - a.h) * t,
        }
    }

    /// Area of the viewport (0.0 to 1.0).
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Convert a point from capture-space to viewport-local coordinates.
    /// Returns `None` if the point is outside the viewport.
    pub fn to_local(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        if !self.contains(px, py) {
            return None;
        }
        Some(((px - self.x) / self.w, (py - self.y) / self.h))
    }

    /// Create a 9:16 vertical viewport centered at the given point.
    pub fn vertical_centered(cx: f64, cy: f64, height: f64) -> Self {
        let w = height * 9.0 / 16.0;
        Self::centered(cx, cy, w, height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FULL
    }
}

/// A 2D normalized point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Point2D, b: &Point2D, t: f64) -> Point2D {
        let t = t.clamp(0.0, 1.0);
        Point2D {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }
}
