use crate::foundation::core::{Affine, Canvas, Point, Vec2};

/// Coordinates outside this range are treated as corrupt rather than "off canvas".
const MAX_ABS_PERCENT: f64 = 10_000.0;

/// A position in percent of the working canvas (`0..=100` is on-canvas).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_px(self, canvas: Canvas) -> Point {
        let (w, h) = canvas.size();
        Point::new(self.x / 100.0 * w, self.y / 100.0 * h)
    }

    pub fn from_px(p: Point, canvas: Canvas) -> Self {
        let (w, h) = canvas.size();
        Self {
            x: p.x / w.max(1.0) * 100.0,
            y: p.y / h.max(1.0) * 100.0,
        }
    }

    /// Replace non-finite or absurd components with `fallback`'s.
    pub fn sanitized(self, fallback: Self) -> Self {
        Self {
            x: sanitize_percent(self.x, fallback.x),
            y: sanitize_percent(self.y, fallback.y),
        }
    }
}

/// A size in percent of the working canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PercentSize {
    pub width: f64,
    pub height: f64,
}

impl PercentSize {
    pub fn to_px(self, canvas: Canvas) -> Vec2 {
        let (w, h) = canvas.size();
        Vec2::new(self.width / 100.0 * w, self.height / 100.0 * h)
    }

    pub fn from_px(size: Vec2, canvas: Canvas) -> Self {
        let (w, h) = canvas.size();
        Self {
            width: size.x / w.max(1.0) * 100.0,
            height: size.y / h.max(1.0) * 100.0,
        }
    }
}

pub fn sanitize_percent(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v.clamp(-MAX_ABS_PERCENT, MAX_ABS_PERCENT)
    } else {
        fallback
    }
}

/// Transform for an element whose local box starts at `local_origin` relative to its anchor.
///
/// Canonical order: `T(anchor) * R(rotation) * T(local_origin)`, so rotation pivots on the
/// element's declared position rather than the canvas center.
pub fn anchored_transform(anchor: Point, rotation_deg: f64, local_origin: Vec2) -> Affine {
    Affine::translate(anchor.to_vec2())
        * Affine::rotate(rotation_deg.to_radians())
        * Affine::translate(local_origin)
}

/// Transform placing a `src_w x src_h` image on `canvas`.
///
/// The image is scaled to cover the canvas, zoomed about the canvas center and then shifted by
/// `position` (percent of the canvas).
pub fn base_image_transform(
    src_w: u32,
    src_h: u32,
    canvas: Canvas,
    zoom: f64,
    position: PercentPoint,
) -> Affine {
    let (cw, ch) = canvas.size();
    let (sw, sh) = (f64::from(src_w.max(1)), f64::from(src_h.max(1)));
    let cover = (cw / sw).max(ch / sh);
    let scale = cover * zoom;
    let (dw, dh) = (sw * scale, sh * scale);
    let x = (cw - dw) / 2.0 + position.x / 100.0 * cw;
    let y = (ch - dh) / 2.0 + position.y / 100.0 * ch;
    Affine::translate(Vec2::new(x, y)) * Affine::scale(scale)
}

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 3.0;

pub fn sanitize_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/units.rs"]
mod tests;
