use serde::{Deserialize, Serialize};

use crate::{
    assets::source::ImageSource,
    foundation::{
        core::Canvas,
        error::{PadError, PadResult},
    },
    geometry::{
        crop::CropRect,
        units::{PercentPoint, PercentSize, sanitize_zoom},
    },
    scene::{color::Color, products::ProductType},
};

/// Immutable snapshot of every visual edit of one design.
///
/// This is also the persisted "configuration" record: it serializes to camelCase JSON and reads
/// back without loss. Older short field names (`x`, `fontSize`, `filterId`, ...) are accepted on
/// input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerState {
    pub base_image: Option<ImageSource>,
    pub adjustments: Adjustments,
    #[serde(alias = "filterId")]
    pub filter: FilterId,
    pub crop_area: Option<CropRect>,
    pub zoom: f64,
    pub position: PercentPoint,
    pub template_overlay: Option<ImageSource>,
    pub logo_elements: Vec<LogoElement>,
    pub text_elements: Vec<TextElement>,
    pub rgb_effect: Option<RgbEffect>,
    pub canvas_size: Canvas,
    pub product_type: Option<ProductType>,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            base_image: None,
            adjustments: Adjustments::default(),
            filter: FilterId::None,
            crop_area: None,
            zoom: 1.0,
            position: PercentPoint::default(),
            template_overlay: None,
            logo_elements: Vec::new(),
            text_elements: Vec::new(),
            rgb_effect: None,
            canvas_size: Canvas {
                width: 400,
                height: 900,
            },
            product_type: None,
        }
    }
}

impl LayerState {
    pub fn from_config_json(json: &str) -> PadResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_config_value(value: serde_json::Value) -> PadResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_config_json(&self) -> PadResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_config_value(&self) -> PadResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Whether the RGB border should be drawn for this product.
    pub fn rgb_border_enabled(&self) -> bool {
        self.rgb_effect.is_some() && self.product_type.is_none_or(|p| p.supports_rgb())
    }

    /// Copy with every numeric control forced into its representable range.
    ///
    /// Persisted designs from older editors may carry out-of-range or non-finite values; these
    /// are re-clamped here instead of being rejected.
    pub fn sanitized(&self, min_crop_percent: f64) -> Self {
        let mut out = self.clone();
        out.adjustments = self.adjustments.sanitized();
        out.zoom = sanitize_zoom(self.zoom);
        out.position = self.position.sanitized(PercentPoint::default());
        out.crop_area = self.crop_area.map(|c| c.clamped(min_crop_percent));
        out.canvas_size = self.canvas_size.clamped();
        for t in &mut out.text_elements {
            *t = t.sanitized();
        }
        for l in &mut out.logo_elements {
            *l = l.sanitized();
        }
        if let Some(fx) = &mut out.rgb_effect {
            fx.brightness_percent = clamp_or(fx.brightness_percent, 0.0, 100.0, 100.0);
        }
        out
    }

    /// Reject what re-clamping cannot repair. Out-of-range geometry, the canvas size included,
    /// is clamped at render time instead.
    pub fn validate(&self) -> PadResult<()> {
        if self.text_elements.iter().any(|t| t.text.len() > 10_000) {
            return Err(PadError::validation("text element exceeds 10000 bytes"));
        }
        Ok(())
    }
}

/// Global image corrections. Percent scalars are neutral at 100; blur is a pixel radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub blur: f64,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Adjustments {
    pub const NEUTRAL: Self = Self {
        brightness: 100.0,
        contrast: 100.0,
        saturation: 100.0,
        blur: 0.0,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    pub fn sanitized(self) -> Self {
        Self {
            brightness: clamp_or(self.brightness, 0.0, 200.0, 100.0),
            contrast: clamp_or(self.contrast, 0.0, 200.0, 100.0),
            saturation: clamp_or(self.saturation, 0.0, 200.0, 100.0),
            blur: clamp_or(self.blur, 0.0, 10.0, 0.0),
        }
    }
}

/// Named creative preset applied after the manual adjustments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterId {
    #[default]
    None,
    Grayscale,
    Sepia,
    Vintage,
    Cool,
    Warm,
    Dramatic,
    Fade,
    #[serde(alias = "highContrast", alias = "high_contrast")]
    HighContrast,
    #[serde(alias = "lowSaturation", alias = "low_saturation")]
    LowSaturation,
}

impl FilterId {
    pub const ALL: [Self; 10] = [
        Self::None,
        Self::Grayscale,
        Self::Sepia,
        Self::Vintage,
        Self::Cool,
        Self::Warm,
        Self::Dramatic,
        Self::Fade,
        Self::HighContrast,
        Self::LowSaturation,
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextElement {
    pub text: String,
    #[serde(alias = "x")]
    pub x_percent: f64,
    #[serde(alias = "y")]
    pub y_percent: f64,
    pub font_family: String,
    #[serde(alias = "fontSize")]
    pub font_size_px: f64,
    pub color: Color,
    #[serde(alias = "rotation")]
    pub rotation_deg: f64,
    #[serde(alias = "opacity")]
    pub opacity_percent: f64,
    pub bold: bool,
    pub italic: bool,
    pub shadow: TextShadow,
    pub outline: TextOutline,
    pub gradient: TextGradient,
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            x_percent: 50.0,
            y_percent: 50.0,
            font_family: String::new(),
            font_size_px: 48.0,
            color: Color::BLACK,
            rotation_deg: 0.0,
            opacity_percent: 100.0,
            bold: false,
            italic: false,
            shadow: TextShadow::default(),
            outline: TextOutline::default(),
            gradient: TextGradient::default(),
        }
    }
}

impl TextElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn anchor(&self) -> PercentPoint {
        PercentPoint::new(self.x_percent, self.y_percent)
    }

    pub fn sanitized(&self) -> Self {
        let anchor = self.anchor().sanitized(PercentPoint::CENTER);
        Self {
            x_percent: anchor.x,
            y_percent: anchor.y,
            font_size_px: clamp_or(self.font_size_px, 1.0, 2000.0, 48.0),
            rotation_deg: finite_or(self.rotation_deg, 0.0) % 360.0,
            opacity_percent: clamp_or(self.opacity_percent, 0.0, 100.0, 100.0),
            shadow: TextShadow {
                blur_px: clamp_or(self.shadow.blur_px, 0.0, 200.0, 0.0),
                offset_x: clamp_or(self.shadow.offset_x, -1000.0, 1000.0, 0.0),
                offset_y: clamp_or(self.shadow.offset_y, -1000.0, 1000.0, 0.0),
                ..self.shadow
            },
            outline: TextOutline {
                width_px: clamp_or(self.outline.width_px, 0.0, 200.0, 0.0),
                ..self.outline
            },
            ..self.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextShadow {
    pub enabled: bool,
    pub color: Color,
    pub blur_px: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgba(0, 0, 0, 128),
            blur_px: 4.0,
            offset_x: 2.0,
            offset_y: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextOutline {
    pub enabled: bool,
    pub color: Color,
    pub width_px: f64,
}

impl Default for TextOutline {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::WHITE,
            width_px: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextGradient {
    pub enabled: bool,
    pub from: Color,
    pub to: Color,
    pub direction: GradientDirection,
}

impl Default for TextGradient {
    fn default() -> Self {
        Self {
            enabled: false,
            from: Color::rgb(255, 0, 0),
            to: Color::rgb(0, 0, 255),
            direction: GradientDirection::Horizontal,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    #[default]
    Horizontal,
    Vertical,
    Diagonal,
}

/// Image layer drawn in the overlay stage, before text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoElement {
    pub source: ImageSource,
    #[serde(alias = "x")]
    pub x_percent: f64,
    #[serde(alias = "y")]
    pub y_percent: f64,
    #[serde(alias = "width")]
    pub width_percent: f64,
    /// Missing height keeps the source aspect ratio.
    #[serde(alias = "height")]
    pub height_percent: Option<f64>,
    #[serde(alias = "rotation")]
    pub rotation_deg: f64,
    #[serde(alias = "opacity")]
    pub opacity_percent: f64,
}

impl Default for LogoElement {
    fn default() -> Self {
        Self {
            source: ImageSource::new(""),
            x_percent: 50.0,
            y_percent: 50.0,
            width_percent: 20.0,
            height_percent: None,
            rotation_deg: 0.0,
            opacity_percent: 100.0,
        }
    }
}

impl LogoElement {
    pub fn anchor(&self) -> PercentPoint {
        PercentPoint::new(self.x_percent, self.y_percent)
    }

    /// Box size in percent of the canvas, resolving a missing height from `aspect` (w / h)
    /// of the decoded asset and the canvas aspect.
    pub fn size(&self, aspect: f64, canvas: Canvas) -> PercentSize {
        let height = self.height_percent.unwrap_or_else(|| {
            let (cw, ch) = canvas.size();
            if aspect > 0.0 && aspect.is_finite() {
                self.width_percent * cw / aspect / ch
            } else {
                self.width_percent
            }
        });
        PercentSize {
            width: self.width_percent,
            height,
        }
    }

    pub fn sanitized(&self) -> Self {
        let anchor = self.anchor().sanitized(PercentPoint::CENTER);
        Self {
            x_percent: anchor.x,
            y_percent: anchor.y,
            width_percent: clamp_or(self.width_percent, 0.0, 1000.0, 20.0),
            height_percent: self
                .height_percent
                .map(|h| clamp_or(h, 0.0, 1000.0, self.width_percent)),
            rotation_deg: finite_or(self.rotation_deg, 0.0) % 360.0,
            opacity_percent: clamp_or(self.opacity_percent, 0.0, 100.0, 100.0),
            ..self.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RgbEffect {
    pub mode: RgbMode,
    pub color: Color,
    #[serde(alias = "brightness")]
    pub brightness_percent: f64,
}

impl Default for RgbEffect {
    fn default() -> Self {
        Self {
            mode: RgbMode::Rainbow,
            color: Color::rgb(0, 255, 255),
            brightness_percent: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RgbMode {
    Static,
    #[default]
    Rainbow,
    Breathing,
    Reactive,
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

fn clamp_or(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    finite_or(v, fallback).clamp(lo, hi)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer_state.rs"]
mod tests;
