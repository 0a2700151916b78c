use crate::foundation::error::{PadError, PadResult};
use crate::geometry::units::PercentPoint;

/// Crop rectangle in percent of the working image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, p: PercentPoint) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Force the rectangle inside `[0,100]²` with each edge at least `min` percent.
    ///
    /// Non-finite components fall back to the full image. The origin is pulled back when the
    /// minimum size would otherwise overflow the far edge.
    pub fn clamped(self, min: f64) -> Self {
        let min = if min.is_finite() {
            min.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Self::FULL;
        }

        fn axis(origin: f64, len: f64, min: f64) -> (f64, f64) {
            let len = len.clamp(min, 100.0);
            let origin = origin.clamp(0.0, 100.0 - len);
            (origin, len)
        }

        let (x, width) = axis(self.x, self.width, min);
        let (y, height) = axis(self.y, self.height, min);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Map onto a `w x h` pixel grid as `(x, y, width, height)`, always inside the image and at
    /// least one pixel in each direction.
    pub fn to_pixels(self, w: u32, h: u32) -> PadResult<(u32, u32, u32, u32)> {
        if w == 0 || h == 0 {
            return Err(PadError::geometry("cannot crop an empty image"));
        }

        fn axis(origin: f64, len: f64, size: u32) -> (u32, u32) {
            let s = f64::from(size);
            let start = ((origin / 100.0 * s).round() as u32).min(size - 1);
            let len = ((len / 100.0 * s).round() as u32).clamp(1, size - start);
            (start, len)
        }

        let (px, pw) = axis(self.x, self.width, w);
        let (py, ph) = axis(self.y, self.height, h);
        Ok((px, py, pw, ph))
    }

    /// Express a point given in percent of the uncropped image in percent of this crop.
    pub fn rebase_point(&self, p: PercentPoint) -> PercentPoint {
        PercentPoint {
            x: (p.x - self.x) / self.width.max(f64::EPSILON) * 100.0,
            y: (p.y - self.y) / self.height.max(f64::EPSILON) * 100.0,
        }
    }
}

/// One of the eight resize handles on the crop rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CropHandle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl CropHandle {
    pub const ALL: [Self; 8] = [
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
    ];

    pub fn position(self, r: &CropRect) -> PercentPoint {
        let cx = r.x + r.width / 2.0;
        let cy = r.y + r.height / 2.0;
        let (x, y) = match self {
            Self::NorthWest => (r.x, r.y),
            Self::North => (cx, r.y),
            Self::NorthEast => (r.right(), r.y),
            Self::East => (r.right(), cy),
            Self::SouthEast => (r.right(), r.bottom()),
            Self::South => (cx, r.bottom()),
            Self::SouthWest => (r.x, r.bottom()),
            Self::West => (r.x, cy),
        };
        PercentPoint::new(x, y)
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::NorthWest | Self::West | Self::SouthWest)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::NorthEast | Self::East | Self::SouthEast)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::NorthWest | Self::North | Self::NorthEast)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::SouthWest | Self::South | Self::SouthEast)
    }
}

/// Interaction mode chosen by where the pointer went down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CropMode {
    Select,
    Move,
    Resize(CropHandle),
}

/// Pick the interaction mode for a pointer-down at `p`.
///
/// Handles win over the interior so corners stay grabbable on small rectangles.
pub fn hit_test(rect: Option<&CropRect>, p: PercentPoint, handle_radius: f64) -> CropMode {
    let Some(rect) = rect else {
        return CropMode::Select;
    };
    for handle in CropHandle::ALL {
        let hp = handle.position(rect);
        if (hp.x - p.x).abs() <= handle_radius && (hp.y - p.y).abs() <= handle_radius {
            return CropMode::Resize(handle);
        }
    }
    if rect.contains(p) {
        CropMode::Move
    } else {
        CropMode::Select
    }
}

/// An in-progress pointer drag over the crop overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropDrag {
    pub mode: CropMode,
    start: PercentPoint,
    start_rect: CropRect,
    min: f64,
}

impl CropDrag {
    /// Begin a drag. `rect` is the committed rectangle, if any.
    pub fn begin(
        rect: Option<CropRect>,
        pointer: PercentPoint,
        handle_radius: f64,
        min: f64,
    ) -> Self {
        let min = if min.is_finite() {
            min.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let mode = hit_test(rect.as_ref(), pointer, handle_radius);
        let start_rect = match (mode, rect) {
            (CropMode::Select, _) | (_, None) => CropRect::new(pointer.x, pointer.y, 0.0, 0.0),
            (_, Some(r)) => r.clamped(min),
        };
        Self {
            mode,
            start: pointer,
            start_rect,
            min,
        }
    }

    /// Rectangle implied by the pointer now being at `pointer`.
    pub fn update(&self, pointer: PercentPoint) -> CropRect {
        let dx = pointer.x - self.start.x;
        let dy = pointer.y - self.start.y;
        let r = self.start_rect;
        let min = self.min;
        match self.mode {
            CropMode::Move => CropRect {
                x: (r.x + dx).clamp(0.0, 100.0 - r.width),
                y: (r.y + dy).clamp(0.0, 100.0 - r.height),
                ..r
            },
            CropMode::Resize(handle) => {
                let mut left = r.x;
                let mut right = r.right();
                let mut top = r.y;
                let mut bottom = r.bottom();
                if handle.moves_left() {
                    left = (left + dx).clamp(0.0, right - min);
                }
                if handle.moves_right() {
                    right = (right + dx).clamp(left + min, 100.0);
                }
                if handle.moves_top() {
                    top = (top + dy).clamp(0.0, bottom - min);
                }
                if handle.moves_bottom() {
                    bottom = (bottom + dy).clamp(top + min, 100.0);
                }
                CropRect::new(left, top, right - left, bottom - top)
            }
            CropMode::Select => {
                let px = pointer.x.clamp(0.0, 100.0);
                let py = pointer.y.clamp(0.0, 100.0);
                let sx = self.start.x.clamp(0.0, 100.0);
                let sy = self.start.y.clamp(0.0, 100.0);
                CropRect::new(sx.min(px), sy.min(py), (px - sx).abs(), (py - sy).abs())
                    .clamped(min)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/crop.rs"]
mod tests;
