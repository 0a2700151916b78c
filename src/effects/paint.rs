//! Coverage-mask operations. A mask is a premultiplied surface whose alpha channel carries the
//! coverage of some shape (text glyphs, border band); color comes from a [`Fill`].

use crate::{
    foundation::{
        core::{Point, Rgba8Premul},
        error::{PadError, PadResult},
        math::mul_div255_u8,
    },
    scene::color::Color,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// Paint source used to color a coverage mask.
#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
    Solid(Color),
    /// Linear gradient in surface pixel coordinates. Stops must be sorted by offset.
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
}

impl Fill {
    pub fn two_stop(start: Point, end: Point, from: Color, to: Color) -> Self {
        Self::Linear {
            start,
            end,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: from,
                },
                GradientStop {
                    offset: 1.0,
                    color: to,
                },
            ],
        }
    }

    /// Full hue spectrum (red through violet back to red) from `start` to `end`.
    pub fn spectrum(start: Point, end: Point) -> Self {
        let stops = (0..=6)
            .map(|i| GradientStop {
                offset: i as f32 / 6.0,
                color: Color::from_hsl(f64::from(i) * 60.0, 1.0, 0.5),
            })
            .collect();
        Self::Linear { start, end, stops }
    }

    /// Straight color at a surface position.
    pub fn color_at(&self, p: Point) -> Color {
        match self {
            Self::Solid(c) => *c,
            Self::Linear { start, end, stops } => {
                let d = *end - *start;
                let len2 = d.hypot2();
                let t = if len2 > 0.0 {
                    ((p - *start).dot(d) / len2).clamp(0.0, 1.0) as f32
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
        }
    }
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Color {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Color::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let k = ((t - a.offset) / span).clamp(0.0, 1.0);
            let lerp = |x: u8, y: u8| -> u8 {
                (f32::from(x) + (f32::from(y) - f32::from(x)) * k).round() as u8
            };
            return Color::rgba(
                lerp(a.color.r, b.color.r),
                lerp(a.color.g, b.color.g),
                lerp(a.color.b, b.color.b),
                lerp(a.color.a, b.color.a),
            );
        }
    }
    last.color
}

fn check_len(buf: &[u8], width: u32, height: u32) -> PadResult<()> {
    if buf.len() != width as usize * height as usize * 4 {
        return Err(PadError::validation(
            "mask buffer does not match width*height*4",
        ));
    }
    Ok(())
}

/// Replace the color of every pixel by `fill`, keeping the alpha channel as coverage.
pub fn paint_coverage(buf: &mut [u8], width: u32, height: u32, fill: &Fill) -> PadResult<()> {
    check_len(buf, width, height)?;
    if let Fill::Solid(c) = fill {
        let p = c.to_premul();
        for px in buf.chunks_exact_mut(4) {
            let cov = u16::from(px[3]);
            px.copy_from_slice(&scale(p, cov));
        }
        return Ok(());
    }
    for (i, px) in buf.chunks_exact_mut(4).enumerate() {
        let cov = u16::from(px[3]);
        if cov == 0 {
            px.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let x = (i as u32 % width) as f64 + 0.5;
        let y = (i as u32 / width) as f64 + 0.5;
        let p = fill.color_at(Point::new(x, y)).to_premul();
        px.copy_from_slice(&scale(p, cov));
    }
    Ok(())
}

fn scale(p: Rgba8Premul, cov: u16) -> [u8; 4] {
    [
        mul_div255_u8(u16::from(p.r), cov),
        mul_div255_u8(u16::from(p.g), cov),
        mul_div255_u8(u16::from(p.b), cov),
        mul_div255_u8(u16::from(p.a), cov),
    ]
}

/// Grow the coverage of a mask by a disc of `radius` pixels (morphological dilation).
///
/// Only the bounding box of non-empty coverage (expanded by the radius) is visited.
pub fn dilate_coverage(src: &[u8], width: u32, height: u32, radius: f32) -> PadResult<Vec<u8>> {
    check_len(src, width, height)?;
    if !radius.is_finite() || radius <= 0.0 {
        return Ok(src.to_vec());
    }
    let Some((x0, y0, x1, y1)) = coverage_bounds(src, width, height) else {
        return Ok(src.to_vec());
    };

    let r = radius.ceil() as i64;
    let r2 = f64::from(radius) * f64::from(radius);
    let offsets: Vec<(i64, i64)> = (-r..=r)
        .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| (dx * dx + dy * dy) as f64 <= r2)
        .collect();

    let (w, h) = (i64::from(width), i64::from(height));
    let mut out = src.to_vec();
    for y in (i64::from(y0) - r).max(0)..=(i64::from(y1) + r).min(h - 1) {
        for x in (i64::from(x0) - r).max(0)..=(i64::from(x1) + r).min(w - 1) {
            let mut best = 0u8;
            for &(dx, dy) in &offsets {
                let (sx, sy) = (x + dx, y + dy);
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                best = best.max(src[((sy * w + sx) as usize) * 4 + 3]);
                if best == 255 {
                    break;
                }
            }
            let i = ((y * w + x) as usize) * 4;
            out[i..i + 4].copy_from_slice(&[best, best, best, best]);
        }
    }
    Ok(out)
}

/// Inclusive pixel bounds of all pixels with non-zero alpha.
pub fn coverage_bounds(buf: &[u8], width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..height {
        for x in 0..width {
            let i = ((y * width + x) as usize) * 4 + 3;
            if buf.get(i).copied().unwrap_or(0) == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((a, b, c, d)) => (a.min(x), b.min(y), c.max(x), d.max(y)),
            });
        }
    }
    bounds
}

#[cfg(test)]
#[path = "../../tests/unit/effects/paint.rs"]
mod tests;
