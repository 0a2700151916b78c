use std::sync::Arc;

use crate::{
    assets::{
        decode::decode_to_raster,
        fonts::{FontBook, TextLayoutEngine},
        source::{ImageSource, InlineOnly, SourceResolver},
        store::{AssetId, PreparedAsset, PreparedAssetStore},
        svg_raster::svg_raster_params,
    },
    compile::{BaseLayer, ResolvedDesign, ResolvedLogo, ResolvedText, compile_design},
    effects::{crop::apply_crop, filter::FilterChain},
    foundation::{
        core::{Affine, Canvas, Vec2},
        error::{PadError, PadResult},
        raster::Raster,
        settings::RenderSettings,
    },
    render::{RenderBackend, cpu::CpuBackend},
    scene::{color::Color, layer_state::LayerState},
};

/// A layer that was left out of a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Base,
    Template,
    /// Index into `logoElements`.
    Logo(usize),
    /// Index into `textElements`.
    Text(usize),
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => f.write_str("base image"),
            Self::Template => f.write_str("template overlay"),
            Self::Logo(i) => write!(f, "logo #{i}"),
            Self::Text(i) => write!(f, "text #{i}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLayer {
    pub layer: LayerKind,
    pub reason: String,
}

/// Pixels of one render plus what had to be left out.
#[derive(Clone, Debug)]
pub struct RenderOutcome {
    pub raster: Raster,
    /// The base image could not be produced and the output is the placeholder fill.
    pub placeholder: bool,
    pub skipped: Vec<SkippedLayer>,
}

/// Runs the full layer pipeline for one [`LayerState`] snapshot.
///
/// Working image: decode, color adjustments and filter preset, crop. Then the compositor draws,
/// in fixed order, the working image (zoom/position/blur), template overlay, logos, text
/// elements and the RGB border.
pub struct Compositor {
    settings: RenderSettings,
    fonts: Arc<FontBook>,
    resolver: Arc<dyn SourceResolver + Send + Sync>,
    layout: TextLayoutEngine,
    backend: CpuBackend,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("settings", &self.settings)
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Compositor with no fonts that only resolves inline data URLs.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            fonts: Arc::new(FontBook::new()),
            resolver: Arc::new(InlineOnly),
            layout: TextLayoutEngine::new(),
            backend: CpuBackend::new(),
        }
    }

    pub fn with_fonts(mut self, fonts: Arc<FontBook>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn SourceResolver + Send + Sync>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn resolver(&self) -> &dyn SourceResolver {
        self.resolver.as_ref()
    }

    /// Load and decode a source into pixels.
    pub fn load_raster(&self, source: &ImageSource) -> PadResult<Raster> {
        if source.is_empty() {
            return Err(PadError::decode("empty image source"));
        }
        let bytes = source.load(self.resolver.as_ref())?;
        decode_to_raster(&bytes, source.looks_like_svg())
    }

    /// The base image after color adjustments, filter preset and crop.
    ///
    /// Blur is not applied here; the compositor runs it after placement so it scales with the
    /// output size.
    pub fn working_raster(&self, state: &LayerState) -> PadResult<Raster> {
        let source = state
            .base_image
            .as_ref()
            .ok_or_else(|| PadError::decode("no base image"))?;
        let decoded = self.load_raster(source)?;
        let chain = FilterChain::for_design(&state.adjustments, state.filter);
        let colored = if chain.has_color_ops() {
            chain.apply_color(&decoded)
        } else {
            decoded
        };
        apply_crop(&colored, state.crop_area, self.settings.min_crop_percent)
    }

    /// Render at the design's own canvas size, clamped into the drawable range.
    pub fn render(&mut self, state: &LayerState) -> PadResult<RenderOutcome> {
        self.render_at(state, state.canvas_size.clamped())
    }

    /// Render at `output` pixels. Pixel-valued text styling scales by the ratio of `output`
    /// width to the design canvas width.
    ///
    /// `output` is taken as given: a zero or oversized size is a `Validation` error.
    #[tracing::instrument(skip(self, state), fields(
        texts = state.text_elements.len(),
        logos = state.logo_elements.len(),
    ))]
    pub fn render_at(&mut self, state: &LayerState, output: Canvas) -> PadResult<RenderOutcome> {
        let output = Canvas::new(output.width, output.height)?;
        let state = state.sanitized(self.settings.min_crop_percent);
        let scale = f64::from(output.width) / f64::from(state.canvas_size.width.max(1));

        let working = match self
            .working_raster(&state)
            .and_then(|r| check_raster_drawable(&r).map(|()| r))
        {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "base image unavailable, rendering placeholder");
                return self.placeholder(output, err);
            }
        };

        let mut store = PreparedAssetStore::new();
        let mut skipped = Vec::new();
        let chain = FilterChain::for_design(&state.adjustments, state.filter);

        let base = store.insert(PreparedAsset::Raster(Arc::new(working)))?;
        let mut design = ResolvedDesign {
            canvas: output,
            scale,
            clear_rgba: self.settings.clear_rgba,
            base: Some(BaseLayer {
                asset: base,
                zoom: state.zoom,
                position: state.position,
                blur_sigma: chain.blur_sigma(),
            }),
            placeholder: None,
            template: None,
            logos: Vec::new(),
            texts: Vec::new(),
            rgb: state.rgb_effect.filter(|_| state.rgb_border_enabled()),
            rgb_band_ratio: self.settings.rgb_band_ratio,
        };

        if let Some(source) = state.template_overlay.as_ref().filter(|s| !s.is_empty()) {
            let (cw, ch) = output.size();
            let loaded = store
                .load(source, self.resolver.as_ref())
                .and_then(|id| check_drawable(&store, id, Vec2::new(cw, ch)).map(|()| id));
            match loaded {
                Ok(id) => design.template = Some(id),
                Err(err) => skip(&mut skipped, LayerKind::Template, &err),
            }
        }

        for (i, logo) in state.logo_elements.iter().enumerate() {
            let loaded = store
                .load(&logo.source, self.resolver.as_ref())
                .and_then(|id| {
                    let (w, h) = store.image_size(id)?;
                    let size = logo.size(w / h.max(1.0), output);
                    check_drawable(&store, id, size.to_px(output))?;
                    Ok((id, size))
                });
            let (id, size) = match loaded {
                Ok(v) => v,
                Err(err) => {
                    skip(&mut skipped, LayerKind::Logo(i), &err);
                    continue;
                }
            };
            design.logos.push(ResolvedLogo {
                asset: id,
                anchor: logo.anchor(),
                size,
                rotation_deg: logo.rotation_deg,
                opacity: (logo.opacity_percent / 100.0) as f32,
            });
        }

        for (i, el) in state.text_elements.iter().enumerate() {
            if el.text.trim().is_empty() {
                continue;
            }
            let Some(face) = self.fonts.resolve(&el.font_family, el.bold, el.italic) else {
                let err = PadError::decode(format!("no font for family \"{}\"", el.font_family));
                skip(&mut skipped, LayerKind::Text(i), &err);
                continue;
            };
            let size_px = (el.font_size_px * scale) as f32;
            let shaped = match self.layout.shape(&el.text, &face, size_px) {
                Ok(s) => s,
                Err(err) => {
                    skip(&mut skipped, LayerKind::Text(i), &err);
                    continue;
                }
            };
            let (width, height) = (shaped.width, shaped.height);
            let asset = store.insert(PreparedAsset::Text(Arc::new(shaped)))?;
            design.texts.push(ResolvedText {
                asset,
                element: el.clone(),
                width,
                height,
            });
        }

        let plan = compile_design(&design, &store)?;
        self.backend.reset_caches();
        let raster = self.backend.render_plan(&plan, &store)?;
        tracing::debug!(
            passes = plan.passes.len(),
            skipped = skipped.len(),
            "composited design"
        );
        Ok(RenderOutcome {
            raster,
            placeholder: false,
            skipped,
        })
    }

    fn placeholder(&mut self, output: Canvas, err: PadError) -> PadResult<RenderOutcome> {
        let [r, g, b, a] = self.settings.placeholder_rgba;
        let design = ResolvedDesign {
            canvas: output,
            scale: 1.0,
            clear_rgba: self.settings.clear_rgba,
            base: None,
            placeholder: Some(Color::rgba(r, g, b, a)),
            template: None,
            logos: Vec::new(),
            texts: Vec::new(),
            rgb: None,
            rgb_band_ratio: self.settings.rgb_band_ratio,
        };
        let store = PreparedAssetStore::new();
        let plan = compile_design(&design, &store)?;
        self.backend.reset_caches();
        let raster = self.backend.render_plan(&plan, &store)?;
        Ok(RenderOutcome {
            raster,
            placeholder: true,
            skipped: vec![SkippedLayer {
                layer: LayerKind::Base,
                reason: err.to_string(),
            }],
        })
    }
}

/// Fail early for an image the backend cannot turn into a paint.
fn check_raster_drawable(raster: &Raster) -> PadResult<()> {
    let max = u32::from(u16::MAX);
    if raster.width > max || raster.height > max {
        return Err(PadError::decode(format!(
            "image {}x{} exceeds {max}x{max}",
            raster.width, raster.height
        )));
    }
    Ok(())
}

/// Check that asset `id` can be drawn at `drawn` output pixels. SVGs are rasterized at their
/// drawn size, which must stay within the canvas limit.
fn check_drawable(store: &PreparedAssetStore, id: AssetId, drawn: Vec2) -> PadResult<()> {
    match store.get(id)? {
        PreparedAsset::Raster(r) => check_raster_drawable(r),
        PreparedAsset::Svg(tree) => {
            let (w, h) = store.image_size(id)?;
            let scale = Affine::scale_non_uniform(drawn.x / w.max(1.0), drawn.y / h.max(1.0));
            svg_raster_params(tree, scale).map(|_| ())
        }
        PreparedAsset::Text(_) => Ok(()),
    }
}

fn skip(skipped: &mut Vec<SkippedLayer>, layer: LayerKind, err: &PadError) {
    tracing::warn!(%layer, error = %err, "skipping layer");
    skipped.push(SkippedLayer {
        layer,
        reason: err.to_string(),
    });
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
