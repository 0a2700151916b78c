use std::time::Duration;

/// Knobs shared by the render driver, compositor and encoders.
///
/// `Default` carries the production values. [`RenderSettings::from_env`] overlays
/// `PADCRAFT_*` environment variables on top of them.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// If set, the output surface is cleared to this straight RGBA8 color before drawing.
    pub clear_rgba: Option<[u8; 4]>,
    /// JPEG quality (1..=100) used for photographic exports.
    pub jpeg_quality: u8,
    /// Quiet period a preview request must survive before the compositor runs.
    pub preview_debounce: Duration,
    /// Minimum crop rectangle edge, in percent of the working image.
    pub min_crop_percent: f64,
    /// RGB border band thickness as a fraction of the longest canvas edge.
    pub rgb_band_ratio: f64,
    /// Straight RGBA8 fill used when the base image cannot be rendered.
    pub placeholder_rgba: [u8; 4],
    /// Default RGB distance below which template pixels count as background.
    pub background_tolerance: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_rgba: None,
            jpeg_quality: 95,
            preview_debounce: Duration::from_millis(300),
            min_crop_percent: 10.0,
            rgb_band_ratio: 0.02,
            placeholder_rgba: [229, 231, 235, 255],
            background_tolerance: 30.0,
        }
    }
}

impl RenderSettings {
    /// Defaults overlaid with any valid `PADCRAFT_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup. Unparseable or out-of-range values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(q) = lookup("PADCRAFT_JPEG_QUALITY")
            .and_then(|v| v.trim().parse::<u8>().ok())
            .filter(|q| (1..=100).contains(q))
        {
            self.jpeg_quality = q;
        }
        if let Some(ms) = lookup("PADCRAFT_PREVIEW_DEBOUNCE_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.preview_debounce = Duration::from_millis(ms);
        }
        if let Some(p) = lookup("PADCRAFT_MIN_CROP_PERCENT")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite() && *p > 0.0 && *p <= 100.0)
        {
            self.min_crop_percent = p;
        }
        if let Some(t) = lookup("PADCRAFT_BG_TOLERANCE")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|t| t.is_finite() && *t >= 0.0)
        {
            self.background_tolerance = t;
        }
        self
    }
}
