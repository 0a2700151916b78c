use crate::foundation::error::{PadError, PadResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Largest edge length the CPU backend will allocate for a surface.
pub const MAX_CANVAS_DIM: u32 = 16_384;

/// Output pixel dimensions of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> PadResult<Self> {
        if width == 0 || height == 0 {
            return Err(PadError::validation("canvas width and height must be > 0"));
        }
        if width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
            return Err(PadError::validation(format!(
                "canvas {width}x{height} exceeds {MAX_CANVAS_DIM}x{MAX_CANVAS_DIM}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Clamp each edge into `1..=MAX_CANVAS_DIM`.
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(1, MAX_CANVAS_DIM),
            height: self.height.clamp(1, MAX_CANVAS_DIM),
        }
    }

    pub fn max_dim(self) -> u32 {
        self.width.max(self.height)
    }

    pub fn size(self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
