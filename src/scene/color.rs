use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8Premul;

/// Straight-alpha sRGB color as authored in a design.
///
/// Deserializes from CSS-ish strings (`#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`,
/// `hsl()`, `hsla()`, a few named colors), `{r,g,b,a?}` byte objects or `[r,g,b,a?]` arrays.
/// Always serializes back to a hex string, so a color survives a config round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from hue in degrees plus saturation and lightness in `0..=1`.
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let [r, g, b] = hsl_to_rgb(h, s, l);
        Self::rgb(unit(r), unit(g), unit(b))
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.starts_with('#') {
            return parse_hex(s);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = func_args(&lower, "rgba").or_else(|| func_args(&lower, "rgb")) {
            return parse_rgb_func(args);
        }
        if let Some(args) = func_args(&lower, "hsla").or_else(|| func_args(&lower, "hsl")) {
            return parse_hsl_func(args);
        }
        named(&lower)
            .or_else(|| parse_hex(&lower).ok())
            .ok_or_else(|| format!("unrecognized color \"{s}\""))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            RgbaObj {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "opaque")]
                a: u8,
            },
            Arr(Vec<u8>),
        }

        fn opaque() -> u8 {
            255
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn unit(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn func_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn split_args(args: &str) -> Vec<&str> {
    args.split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_alpha(p: &str) -> Result<u8, String> {
    if let Some(pct) = p.strip_suffix('%') {
        let v: f64 = pct.parse().map_err(|_| format!("invalid alpha \"{p}\""))?;
        return Ok(unit(v / 100.0));
    }
    let v: f64 = p.parse().map_err(|_| format!("invalid alpha \"{p}\""))?;
    Ok(unit(v))
}

fn parse_rgb_func(args: &str) -> Result<Color, String> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("rgb() expects 3 or 4 components, got {}", parts.len()));
    }
    let channel = |p: &str| -> Result<u8, String> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f64 = pct.parse().map_err(|_| format!("invalid channel \"{p}\""))?;
            return Ok(unit(v / 100.0));
        }
        let v: f64 = p.parse().map_err(|_| format!("invalid channel \"{p}\""))?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    };
    let a = match parts.get(3) {
        Some(p) => parse_alpha(p)?,
        None => 255,
    };
    Ok(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

fn parse_hsl_func(args: &str) -> Result<Color, String> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("hsl() expects 3 or 4 components, got {}", parts.len()));
    }
    let num = |p: &str| -> Result<f64, String> {
        p.trim_end_matches("deg")
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| format!("invalid hsl component \"{p}\""))
    };
    let h = num(parts[0])?;
    let s = num(parts[1])? / 100.0;
    let l = num(parts[2])? / 100.0;
    let a = match parts.get(3) {
        Some(p) => parse_alpha(p)?,
        None => 255,
    };
    Ok(Color::from_hsl(h, s, l).with_alpha(a))
}

fn parse_hex(s: &str) -> Result<Color, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            Ok(Color::rgba(r, g, b, a))
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            Ok(Color::rgba(r, g, b, a))
        }
        _ => Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn named(s: &str) -> Option<Color> {
    let c = match s {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "transparent" => Color::TRANSPARENT,
        "red" => Color::rgb(255, 0, 0),
        "lime" => Color::rgb(0, 255, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "pink" => Color::rgb(255, 192, 203),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "gold" => Color::rgb(255, 215, 0),
        _ => return None,
    };
    Some(c)
}

/// Standard HSL -> RGB conversion (sRGB space); hue in degrees, `s`/`l` in `0..=1`.
pub(crate) fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/scene/color.rs"]
mod tests;
