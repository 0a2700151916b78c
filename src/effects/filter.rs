use std::fmt::Write as _;

use crate::{
    foundation::{
        error::{PadError, PadResult},
        math::{premultiply_rgba8_in_place, unpremultiply_px},
        raster::Raster,
    },
    scene::layer_state::{Adjustments, FilterId},
};

/// One CSS filter primitive. Amounts are unit scalars (`1.0` = 100%).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    Grayscale(f32),
    Sepia(f32),
    HueRotate(f32),
    Opacity(f32),
    /// Gaussian standard deviation in design pixels.
    Blur(f32),
}

impl FilterOp {
    fn name(self) -> &'static str {
        match self {
            Self::Brightness(_) => "brightness",
            Self::Contrast(_) => "contrast",
            Self::Saturate(_) => "saturate",
            Self::Grayscale(_) => "grayscale",
            Self::Sepia(_) => "sepia",
            Self::HueRotate(_) => "hue-rotate",
            Self::Opacity(_) => "opacity",
            Self::Blur(_) => "blur",
        }
    }

    fn color_step(self) -> Option<ColorStep> {
        let step = match self {
            Self::Brightness(a) => ColorStep::linear(a, 0.0),
            Self::Contrast(a) => ColorStep::linear(a, 0.5 - 0.5 * a),
            Self::Saturate(s) => ColorStep::Matrix(saturate_matrix(s.max(0.0))),
            Self::Grayscale(g) => ColorStep::Matrix(grayscale_matrix(g.clamp(0.0, 1.0))),
            Self::Sepia(a) => ColorStep::Matrix(sepia_matrix(a.clamp(0.0, 1.0))),
            Self::HueRotate(deg) => ColorStep::Matrix(hue_rotate_matrix(deg)),
            Self::Opacity(a) => ColorStep::Alpha(a.clamp(0.0, 1.0)),
            Self::Blur(_) => return None,
        };
        Some(step)
    }
}

/// Ordered list of filter primitives, equivalent to a CSS `filter` property value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterChain {
    pub ops: Vec<FilterOp>,
}

impl FilterChain {
    /// Manual adjustments first, then the preset bundle.
    pub fn for_design(adjustments: &Adjustments, filter: FilterId) -> Self {
        let adj = adjustments.sanitized();
        let mut ops = Vec::new();
        if adj.brightness != 100.0 {
            ops.push(FilterOp::Brightness((adj.brightness / 100.0) as f32));
        }
        if adj.contrast != 100.0 {
            ops.push(FilterOp::Contrast((adj.contrast / 100.0) as f32));
        }
        if adj.saturation != 100.0 {
            ops.push(FilterOp::Saturate((adj.saturation / 100.0) as f32));
        }
        if adj.blur > 0.0 {
            ops.push(FilterOp::Blur(adj.blur as f32));
        }
        ops.extend(preset_ops(filter));
        Self { ops }
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// Combined blur standard deviation (successive Gaussians add in quadrature).
    pub fn blur_sigma(&self) -> f32 {
        self.ops
            .iter()
            .filter_map(|op| match op {
                FilterOp::Blur(s) if s.is_finite() && *s > 0.0 => Some(s * s),
                _ => None,
            })
            .sum::<f32>()
            .sqrt()
    }

    pub fn has_color_ops(&self) -> bool {
        self.ops.iter().any(|op| !matches!(op, FilterOp::Blur(_)))
    }

    /// Apply every color primitive in order. Blur is left to the compositor, which runs it in
    /// output pixel space.
    pub fn apply_color(&self, src: &Raster) -> Raster {
        let steps: Vec<ColorStep> = self.ops.iter().filter_map(|op| op.color_step()).collect();
        if steps.is_empty() {
            return src.clone();
        }

        let mut data = Vec::with_capacity(src.data.len());
        for px in src.data.chunks_exact(4) {
            let s = unpremultiply_px([px[0], px[1], px[2], px[3]]);
            let mut c = [
                f32::from(s[0]) / 255.0,
                f32::from(s[1]) / 255.0,
                f32::from(s[2]) / 255.0,
                f32::from(s[3]) / 255.0,
            ];
            for step in &steps {
                step.apply(&mut c);
            }
            data.extend(c.iter().map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8));
        }
        premultiply_rgba8_in_place(&mut data);
        Raster {
            width: src.width,
            height: src.height,
            data,
        }
    }

    pub fn to_css(&self) -> String {
        if self.ops.is_empty() {
            return "none".to_owned();
        }
        let mut out = String::new();
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = match *op {
                FilterOp::HueRotate(deg) => write!(out, "hue-rotate({}deg)", fmt_num(deg)),
                FilterOp::Blur(px) => write!(out, "blur({}px)", fmt_num(px)),
                FilterOp::Brightness(a)
                | FilterOp::Contrast(a)
                | FilterOp::Saturate(a)
                | FilterOp::Grayscale(a)
                | FilterOp::Sepia(a)
                | FilterOp::Opacity(a) => write!(out, "{}({}%)", op.name(), fmt_num(a * 100.0)),
            };
        }
        out
    }

    pub fn parse_css(css: &str) -> PadResult<Self> {
        let css = css.trim();
        if css.is_empty() || css.eq_ignore_ascii_case("none") {
            return Ok(Self::default());
        }

        let mut ops = Vec::new();
        let mut rest = css;
        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| PadError::validation(format!("expected '(' in filter \"{rest}\"")))?;
            let close = rest[open..]
                .find(')')
                .map(|i| open + i)
                .ok_or_else(|| PadError::validation(format!("unclosed filter \"{rest}\"")))?;
            let name = rest[..open].trim().to_ascii_lowercase();
            let arg = rest[open + 1..close].trim();
            ops.push(parse_op(&name, arg)?);
            rest = rest[close + 1..].trim_start();
        }
        Ok(Self { ops })
    }
}

impl std::fmt::Display for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Fixed primitive bundle behind each named preset.
pub fn preset_ops(filter: FilterId) -> Vec<FilterOp> {
    use FilterOp::*;
    match filter {
        FilterId::None => vec![],
        FilterId::Grayscale => vec![Grayscale(1.0)],
        FilterId::Sepia => vec![Sepia(1.0)],
        FilterId::Vintage => vec![Sepia(0.5), Contrast(1.2), Brightness(0.9)],
        FilterId::Cool => vec![Saturate(1.1), HueRotate(-20.0)],
        FilterId::Warm => vec![Sepia(0.3), Saturate(1.4)],
        FilterId::Dramatic => vec![Contrast(1.4), Brightness(0.9), Saturate(1.3)],
        FilterId::Fade => vec![Opacity(0.8), Saturate(0.7), Brightness(1.1)],
        FilterId::HighContrast => vec![Contrast(2.0)],
        FilterId::LowSaturation => vec![Saturate(0.5)],
    }
}

fn parse_op(name: &str, arg: &str) -> PadResult<FilterOp> {
    let bad = || PadError::validation(format!("invalid argument \"{arg}\" for {name}()"));

    let amount = || -> PadResult<f32> {
        if arg.is_empty() {
            return Ok(1.0);
        }
        let v = match arg.strip_suffix('%') {
            Some(p) => p.trim().parse::<f32>().map_err(|_| bad())? / 100.0,
            None => arg.parse::<f32>().map_err(|_| bad())?,
        };
        if v.is_finite() && v >= 0.0 {
            Ok(v)
        } else {
            Err(bad())
        }
    };

    let op = match name {
        "brightness" => FilterOp::Brightness(amount()?),
        "contrast" => FilterOp::Contrast(amount()?),
        "saturate" => FilterOp::Saturate(amount()?),
        "grayscale" => FilterOp::Grayscale(amount()?.min(1.0)),
        "sepia" => FilterOp::Sepia(amount()?.min(1.0)),
        "opacity" => FilterOp::Opacity(amount()?.min(1.0)),
        "hue-rotate" => {
            let deg = if arg.is_empty() || arg == "0" {
                0.0
            } else if let Some(v) = arg.strip_suffix("deg") {
                v.trim().parse::<f32>().map_err(|_| bad())?
            } else if let Some(v) = arg.strip_suffix("turn") {
                v.trim().parse::<f32>().map_err(|_| bad())? * 360.0
            } else if let Some(v) = arg.strip_suffix("rad") {
                v.trim().parse::<f32>().map_err(|_| bad())?.to_degrees()
            } else {
                return Err(bad());
            };
            FilterOp::HueRotate(deg)
        }
        "blur" => {
            let v = if arg.is_empty() {
                0.0
            } else {
                arg.strip_suffix("px")
                    .unwrap_or(arg)
                    .trim()
                    .parse::<f32>()
                    .map_err(|_| bad())?
            };
            if !v.is_finite() || v < 0.0 {
                return Err(bad());
            }
            FilterOp::Blur(v)
        }
        _ => {
            return Err(PadError::validation(format!(
                "unsupported filter function \"{name}\""
            )));
        }
    };
    Ok(op)
}

fn fmt_num(v: f32) -> String {
    let rounded = (f64::from(v) * 1000.0).round() / 1000.0;
    let s = format!("{rounded:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

#[derive(Clone, Copy, Debug)]
enum ColorStep {
    /// RGB' = M * RGB + offset (offset is added to every channel).
    Matrix([[f32; 4]; 3]),
    Alpha(f32),
}

impl ColorStep {
    fn linear(slope: f32, intercept: f32) -> Self {
        Self::Matrix([
            [slope, 0.0, 0.0, intercept],
            [0.0, slope, 0.0, intercept],
            [0.0, 0.0, slope, intercept],
        ])
    }

    fn apply(&self, c: &mut [f32; 4]) {
        match self {
            Self::Matrix(m) => {
                let [r, g, b, _] = *c;
                for (i, row) in m.iter().enumerate() {
                    c[i] = (row[0] * r + row[1] * g + row[2] * b + row[3]).clamp(0.0, 1.0);
                }
            }
            Self::Alpha(a) => c[3] = (c[3] * a).clamp(0.0, 1.0),
        }
    }
}

fn rows(m: [[f32; 3]; 3]) -> [[f32; 4]; 3] {
    m.map(|r| [r[0], r[1], r[2], 0.0])
}

fn saturate_matrix(s: f32) -> [[f32; 4]; 3] {
    rows([
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ])
}

fn grayscale_matrix(g: f32) -> [[f32; 4]; 3] {
    let k = 1.0 - g;
    rows([
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ])
}

fn sepia_matrix(a: f32) -> [[f32; 4]; 3] {
    let k = 1.0 - a;
    rows([
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ])
}

fn hue_rotate_matrix(deg: f32) -> [[f32; 4]; 3] {
    let (sin, cos) = deg.to_radians().sin_cos();
    rows([
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ])
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
