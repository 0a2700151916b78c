use crate::{
    assets::store::{AssetId, PreparedAsset, PreparedAssetStore},
    compile::plan::{
        CompositeOp, CompositePass, DrawOp, OffscreenPass, Pass, PassFx, RenderPlan, ScenePass,
        SurfaceDesc, SurfaceId,
    },
    effects::{blur::radius_for_sigma, paint::Fill},
    foundation::{
        core::{Affine, Canvas, Point, Rect, Rgba8Premul, Vec2},
        error::PadResult,
    },
    geometry::units::{PercentPoint, PercentSize, anchored_transform, base_image_transform},
    scene::{
        color::Color,
        layer_state::{GradientDirection, RgbEffect, RgbMode, TextElement},
    },
};

/// Working image placed on the canvas.
#[derive(Clone, Debug)]
pub struct BaseLayer {
    pub asset: AssetId,
    pub zoom: f64,
    pub position: PercentPoint,
    /// Gaussian sigma in design pixels, applied after placement.
    pub blur_sigma: f32,
}

#[derive(Clone, Debug)]
pub struct ResolvedLogo {
    pub asset: AssetId,
    pub anchor: PercentPoint,
    pub size: PercentSize,
    pub rotation_deg: f64,
    pub opacity: f32,
}

/// A text element with its shaped text already in the asset store.
#[derive(Clone, Debug)]
pub struct ResolvedText {
    pub asset: AssetId,
    pub element: TextElement,
    /// Layout box of the shaped text, in output pixels.
    pub width: f64,
    pub height: f64,
}

/// Everything the compositor draws, with assets decoded and values sanitized.
#[derive(Clone, Debug)]
pub struct ResolvedDesign {
    pub canvas: Canvas,
    /// Output width over design width; scales pixel-valued styling.
    pub scale: f64,
    pub clear_rgba: Option<[u8; 4]>,
    pub base: Option<BaseLayer>,
    /// Drawn instead of the base image when it could not be produced.
    pub placeholder: Option<Color>,
    pub template: Option<AssetId>,
    pub logos: Vec<ResolvedLogo>,
    pub texts: Vec<ResolvedText>,
    pub rgb: Option<RgbEffect>,
    pub rgb_band_ratio: f64,
}

/// Transform centering a `w x h` text box on `anchor`, rotated about the anchor.
pub fn text_transform(anchor: Point, rotation_deg: f64, w: f64, h: f64) -> Affine {
    anchored_transform(anchor, rotation_deg, Vec2::new(-w / 2.0, -h / 2.0))
}

const LAYER: u32 = 1;
const OUTLINE: u32 = 2;
const SHADOW: u32 = 3;
const FILL: u32 = 4;

struct PlanBuilder {
    canvas: Canvas,
    surfaces: Vec<SurfaceDesc>,
    passes: Vec<Pass>,
}

impl PlanBuilder {
    fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            surfaces: vec![SurfaceDesc {
                width: canvas.width,
                height: canvas.height,
            }],
            passes: Vec::new(),
        }
    }

    /// Scratch surfaces are reused by every layer; each layer finishes compositing before the
    /// next one draws.
    fn scratch(&mut self, slot: u32) -> SurfaceId {
        while self.surfaces.len() <= slot as usize {
            self.surfaces.push(SurfaceDesc {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }
        SurfaceId(slot)
    }

    fn scene(&mut self, target: SurfaceId, ops: Vec<DrawOp>) {
        self.passes.push(Pass::Scene(ScenePass {
            target,
            ops,
            clear_to_transparent: true,
        }));
    }

    fn fx(&mut self, input: SurfaceId, output: SurfaceId, fx: PassFx) {
        self.passes
            .push(Pass::Offscreen(OffscreenPass { input, output, fx }));
    }

    fn blur(&mut self, surface: SurfaceId, sigma: f32) {
        let radius_px = radius_for_sigma(sigma);
        if radius_px > 0 {
            self.fx(surface, surface, PassFx::Blur { radius_px, sigma });
        }
    }

    fn composite(&mut self, ops: Vec<CompositeOp>) {
        self.passes.push(Pass::Composite(CompositePass {
            target: SurfaceId(0),
            ops,
        }));
    }

    fn finish(self, clear_rgba: Option<[u8; 4]>) -> RenderPlan {
        RenderPlan {
            canvas: self.canvas,
            clear_rgba,
            surfaces: self.surfaces,
            passes: self.passes,
            final_surface: SurfaceId(0),
        }
    }
}

fn image_op(
    assets: &PreparedAssetStore,
    asset: AssetId,
    transform: Affine,
    opacity: f32,
) -> PadResult<DrawOp> {
    Ok(match assets.get(asset)? {
        PreparedAsset::Svg(_) => DrawOp::Svg {
            asset,
            transform,
            opacity,
        },
        _ => DrawOp::Image {
            asset,
            transform,
            opacity,
        },
    })
}

/// Lower a design into passes, in the fixed layer order: base, template overlay, logos, text
/// elements (array order), RGB border.
pub fn compile_design(d: &ResolvedDesign, assets: &PreparedAssetStore) -> PadResult<RenderPlan> {
    let mut b = PlanBuilder::new(d.canvas);
    let (cw, ch) = d.canvas.size();
    let scale = if d.scale.is_finite() && d.scale > 0.0 {
        d.scale
    } else {
        1.0
    };

    if let Some(base) = &d.base {
        let (w, h) = assets.image_size(base.asset)?;
        let t = base_image_transform(w as u32, h as u32, d.canvas, base.zoom, base.position);
        let layer = b.scratch(LAYER);
        b.scene(layer, vec![image_op(assets, base.asset, t, 1.0)?]);
        b.blur(layer, base.blur_sigma * scale as f32);
        b.composite(vec![CompositeOp::Over {
            src: layer,
            opacity: 1.0,
        }]);
    } else if let Some(color) = d.placeholder {
        let layer = b.scratch(LAYER);
        b.scene(
            layer,
            vec![DrawOp::FillRect {
                rect: Rect::new(0.0, 0.0, cw, ch),
                transform: Affine::IDENTITY,
                color: color.to_premul(),
            }],
        );
        b.composite(vec![CompositeOp::Over {
            src: layer,
            opacity: 1.0,
        }]);
    }

    if let Some(template) = d.template {
        let (w, h) = assets.image_size(template)?;
        let t = Affine::scale_non_uniform(cw / w.max(1.0), ch / h.max(1.0));
        let layer = b.scratch(LAYER);
        b.scene(layer, vec![image_op(assets, template, t, 1.0)?]);
        b.composite(vec![CompositeOp::Over {
            src: layer,
            opacity: 1.0,
        }]);
    }

    for logo in &d.logos {
        if logo.opacity <= 0.0 {
            continue;
        }
        let (w, h) = assets.image_size(logo.asset)?;
        let size = logo.size.to_px(d.canvas);
        if size.x <= 0.0 || size.y <= 0.0 {
            continue;
        }
        let t = anchored_transform(
            logo.anchor.to_px(d.canvas),
            logo.rotation_deg,
            Vec2::new(-size.x / 2.0, -size.y / 2.0),
        ) * Affine::scale_non_uniform(size.x / w.max(1.0), size.y / h.max(1.0));
        let layer = b.scratch(LAYER);
        b.scene(layer, vec![image_op(assets, logo.asset, t, 1.0)?]);
        b.composite(vec![CompositeOp::Over {
            src: layer,
            opacity: logo.opacity,
        }]);
    }

    for text in &d.texts {
        compile_text(&mut b, text, d.canvas, scale);
    }

    if let Some(fx) = &d.rgb {
        compile_border(&mut b, fx, d.canvas, d.rgb_band_ratio);
    }

    Ok(b.finish(d.clear_rgba))
}

fn compile_text(b: &mut PlanBuilder, text: &ResolvedText, canvas: Canvas, scale: f64) {
    let el = &text.element;
    let opacity = (el.opacity_percent / 100.0).clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 || text.width <= 0.0 || text.height <= 0.0 {
        return;
    }

    let anchor = el.anchor().to_px(canvas);
    let transform = text_transform(anchor, el.rotation_deg, text.width, text.height);
    let mask = b.scratch(LAYER);
    b.scene(
        mask,
        vec![DrawOp::Text {
            asset: text.asset,
            transform,
        }],
    );

    let mut ops = Vec::with_capacity(3);

    if el.outline.enabled && el.outline.width_px > 0.0 {
        let outline = b.scratch(OUTLINE);
        b.fx(
            mask,
            outline,
            PassFx::Dilate {
                radius_px: (el.outline.width_px * scale / 2.0) as f32,
            },
        );
        b.fx(outline, outline, PassFx::Paint(Fill::Solid(el.outline.color)));
        ops.push(CompositeOp::Over {
            src: outline,
            opacity,
        });
    }

    if el.shadow.enabled {
        let shadow = b.scratch(SHADOW);
        let offset = Vec2::new(el.shadow.offset_x * scale, el.shadow.offset_y * scale);
        b.scene(
            shadow,
            vec![DrawOp::Text {
                asset: text.asset,
                transform: Affine::translate(offset) * transform,
            }],
        );
        // Canvas-style shadow blur: sigma is half the blur length.
        b.blur(shadow, (el.shadow.blur_px * scale / 2.0) as f32);
        b.fx(shadow, shadow, PassFx::Paint(Fill::Solid(el.shadow.color)));
        ops.push(CompositeOp::Over {
            src: shadow,
            opacity,
        });
    }

    let fill = if el.gradient.enabled {
        let (w, h) = (text.width, text.height);
        let end = match el.gradient.direction {
            GradientDirection::Horizontal => Point::new(w, 0.0),
            GradientDirection::Vertical => Point::new(0.0, h),
            GradientDirection::Diagonal => Point::new(w, h),
        };
        Fill::two_stop(
            transform * Point::ORIGIN,
            transform * end,
            el.gradient.from,
            el.gradient.to,
        )
    } else {
        Fill::Solid(el.color)
    };
    let filled = b.scratch(FILL);
    b.fx(mask, filled, PassFx::Paint(fill));
    ops.push(CompositeOp::Over {
        src: filled,
        opacity,
    });

    b.composite(ops);
}

/// Band thickness in pixels for a canvas.
pub fn border_band_px(canvas: Canvas, ratio: f64) -> f64 {
    let ratio = if ratio.is_finite() { ratio.max(0.0) } else { 0.0 };
    let band = (ratio * f64::from(canvas.max_dim())).round().max(1.0);
    band.min(f64::from(canvas.width.min(canvas.height)) / 2.0)
}

fn compile_border(b: &mut PlanBuilder, fx: &RgbEffect, canvas: Canvas, ratio: f64) {
    let opacity = (fx.brightness_percent / 100.0).clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 {
        return;
    }
    let (w, h) = canvas.size();
    let band = border_band_px(canvas, ratio);
    let white = Rgba8Premul::from_straight_rgba(255, 255, 255, 255);
    let rects = [
        Rect::new(0.0, 0.0, w, band),
        Rect::new(0.0, h - band, w, h),
        Rect::new(0.0, band, band, h - band),
        Rect::new(w - band, band, w, h - band),
    ];
    let layer = b.scratch(LAYER);
    b.scene(
        layer,
        rects
            .into_iter()
            .map(|rect| DrawOp::FillRect {
                rect,
                transform: Affine::IDENTITY,
                color: white,
            })
            .collect(),
    );
    let fill = match fx.mode {
        RgbMode::Rainbow => Fill::spectrum(Point::new(0.0, 0.0), Point::new(w, 0.0)),
        RgbMode::Static | RgbMode::Breathing | RgbMode::Reactive => Fill::Solid(fx.color),
    };
    b.fx(layer, layer, PassFx::Paint(fill));
    b.composite(vec![CompositeOp::Over {
        src: layer,
        opacity,
    }]);
}

#[cfg(test)]
#[path = "../../tests/unit/compile/design.rs"]
mod tests;
