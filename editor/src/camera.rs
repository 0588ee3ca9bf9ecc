//! Viewport: pan/zoom between screen (CSS pixel) space and image-pixel space.
//!
//! Everything here is pure math over a [`Viewport`] value. The engine owns the
//! live viewport and replaces it on fit, zoom, pan and pinch updates.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{MAX_ZOOM, MIN_ZOOM, PINCH_MIN_START_DIST_PX};

/// A point in either screen or image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Clamp a scale factor to the supported zoom range.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() { scale.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 }
}

/// Affine image→screen transform: `screen = image * scale + pan`.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `scale` is kept within [`MIN_ZOOM`]..=[`MAX_ZOOM`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

impl Viewport {
    /// Scale the whole image into the canvas and center it.
    #[must_use]
    pub fn fit(canvas_w: f64, canvas_h: f64, image_w: f64, image_h: f64) -> Self {
        if image_w <= 0.0 || image_h <= 0.0 {
            return Self::default();
        }
        let scale = clamp_scale((canvas_w / image_w).min(canvas_h / image_h));
        Self::centered(scale, canvas_w, canvas_h, image_w, image_h)
    }

    /// 100% zoom, image centered.
    #[must_use]
    pub fn actual_size(canvas_w: f64, canvas_h: f64, image_w: f64, image_h: f64) -> Self {
        Self::centered(1.0, canvas_w, canvas_h, image_w, image_h)
    }

    fn centered(scale: f64, canvas_w: f64, canvas_h: f64, image_w: f64, image_h: f64) -> Self {
        Self { scale, pan_x: (canvas_w - image_w * scale) / 2.0, pan_y: (canvas_h - image_h * scale) / 2.0 }
    }

    /// Convert a screen-space point (CSS pixels) to image coordinates.
    #[must_use]
    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.pan_x) / self.scale, y: (screen.y - self.pan_y) / self.scale }
    }

    /// Convert an image-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn image_to_screen(&self, image: Point) -> Point {
        Point { x: image.x * self.scale + self.pan_x, y: image.y * self.scale + self.pan_y }
    }

    /// Convert a screen-space distance (pixels) to an image-space distance.
    #[must_use]
    pub fn screen_dist_to_image(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Current zoom as a rounded percentage, as shown on the zoom label.
    #[must_use]
    pub fn zoom_percent(&self) -> f64 {
        (self.scale * 100.0).round()
    }

    /// Change scale while keeping the image point under `focal` fixed on screen.
    pub fn zoom_at(&mut self, focal: Point, scale: f64) {
        let anchor = self.screen_to_image(focal);
        self.scale = clamp_scale(scale);
        self.pan_x = focal.x - anchor.x * self.scale;
        self.pan_y = focal.y - anchor.y * self.scale;
    }

    /// Zoom to `percent` around the canvas center.
    pub fn zoom_to_percent(&mut self, percent: f64, canvas_w: f64, canvas_h: f64) {
        self.zoom_at(Point::new(canvas_w / 2.0, canvas_h / 2.0), percent / 100.0);
    }

    /// Shift the image on screen.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Re-center the image in a resized canvas, keeping the current scale.
    pub fn recenter(&mut self, canvas_w: f64, canvas_h: f64, image_w: f64, image_h: f64) {
        *self = Self::centered(self.scale, canvas_w, canvas_h, image_w, image_h);
    }
}

/// State captured when a two-finger gesture begins.
///
/// Updates are computed from the start state rather than incrementally, so
/// the image point that was under the starting midpoint stays under the
/// current midpoint for the whole gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchAnchor {
    pub start_mid: Point,
    pub start_dist: f64,
    pub start: Viewport,
}

impl PinchAnchor {
    #[must_use]
    pub fn new(a: Point, b: Point, viewport: Viewport) -> Self {
        Self { start_mid: a.midpoint(b), start_dist: a.distance(b).max(PINCH_MIN_START_DIST_PX), start: viewport }
    }

    /// Viewport for the current finger positions.
    #[must_use]
    pub fn apply(&self, a: Point, b: Point) -> Viewport {
        let mid = a.midpoint(b);
        let ratio = a.distance(b) / self.start_dist;
        let scale = clamp_scale(self.start.scale * ratio);
        let anchor = self.start.screen_to_image(self.start_mid);
        Viewport { scale, pan_x: mid.x - anchor.x * scale, pan_y: mid.y - anchor.y * scale }
    }
}
