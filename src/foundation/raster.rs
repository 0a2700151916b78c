use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{PadError, PadResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_px};

/// An owned image in premultiplied RGBA8, row-major, tightly packed.
///
/// Every stage of the pipeline consumes and produces this type. `data.len()` is always
/// `width * height * 4` when built through the constructors.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

fn byte_len(width: u32, height: u32) -> PadResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| PadError::validation("raster buffer size overflow"))
}

impl Raster {
    pub fn new_transparent(width: u32, height: u32) -> PadResult<Self> {
        Ok(Self {
            width,
            height,
            data: vec![0; byte_len(width, height)?],
        })
    }

    pub fn filled(width: u32, height: u32, color: Rgba8Premul) -> PadResult<Self> {
        let px = color.to_array();
        let len = byte_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..(len / 4) {
            data.extend_from_slice(&px);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> PadResult<Self> {
        if data.len() != byte_len(width, height)? {
            return Err(PadError::validation(format!(
                "premultiplied buffer length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> PadResult<Self> {
        if data.len() != byte_len(width, height)? {
            return Err(PadError::validation(format!(
                "rgba buffer length {} does not match {width}x{height}",
                data.len()
            )));
        }
        premultiply_rgba8_in_place(&mut data);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Premultiplied pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight-alpha pixel at `(x, y)`.
    pub fn straight_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixel(x, y).map(unpremultiply_px)
    }

    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        crate::foundation::math::unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Copy out the exact pixel rectangle `[x, x+w) x [y, y+h)`.
    pub fn sub_rect(&self, x: u32, y: u32, w: u32, h: u32) -> PadResult<Self> {
        if w == 0 || h == 0 {
            return Err(PadError::geometry("sub-rectangle must have non-zero area"));
        }
        let in_bounds = x
            .checked_add(w)
            .zip(y.checked_add(h))
            .is_some_and(|(r, b)| r <= self.width && b <= self.height);
        if !in_bounds {
            return Err(PadError::geometry(format!(
                "sub-rectangle {x},{y} {w}x{h} exceeds {}x{}",
                self.width, self.height
            )));
        }
        let mut data = Vec::with_capacity(byte_len(w, h)?);
        let stride = self.width as usize * 4;
        for row in y..(y + h) {
            let start = row as usize * stride + x as usize * 4;
            data.extend_from_slice(&self.data[start..start + w as usize * 4]);
        }
        Ok(Self {
            width: w,
            height: h,
            data,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/raster.rs"]
mod tests;
