use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{
        store::{AssetId, PreparedAsset, PreparedAssetStore},
        svg_raster::{rasterize_svg, svg_raster_params},
    },
    compile::{
        CompositeOp, CompositePass, DrawOp, OffscreenPass, PassFx, RenderPlan, ScenePass,
        SurfaceDesc, SurfaceId,
    },
    effects::{
        blur::blur_rgba8_premul,
        composite::over_in_place,
        paint::{dilate_coverage, paint_coverage},
    },
    foundation::{
        core::{Affine, Rgba8Premul},
        error::{PadError, PadResult},
        math::unpremultiply_px,
        raster::Raster,
    },
    render::{RenderBackend, passes::PassBackend},
};

/// Software backend: scene passes are rasterized with `vello_cpu`, offscreen and composite
/// passes run on the premultiplied bytes directly.
///
/// Image and SVG paints are cached per asset, so one backend should be reused across renders
/// that share a [`PreparedAssetStore`] and reset with [`CpuBackend::reset_caches`] otherwise.
#[derive(Default)]
pub struct CpuBackend {
    image_cache: HashMap<AssetId, vello_cpu::Image>,
    svg_cache: HashMap<SvgRasterKey, vello_cpu::Image>,
    surfaces: HashMap<SurfaceId, CpuSurface>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SvgRasterKey {
    asset: AssetId,
    width: u32,
    height: u32,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop cached paints. Required before rendering with a different asset store.
    pub fn reset_caches(&mut self) {
        self.image_cache.clear();
        self.svg_cache.clear();
    }

    fn take_surface(&mut self, id: SurfaceId, role: &str) -> PadResult<CpuSurface> {
        self.surfaces.remove(&id).ok_or_else(|| {
            PadError::encode(format!("{role} surface {id:?} was not initialized"))
        })
    }
}

impl PassBackend for CpuBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> PadResult<()> {
        let width: u16 = desc
            .width
            .try_into()
            .map_err(|_| PadError::encode("surface width exceeds u16"))?;
        let height: u16 = desc
            .height
            .try_into()
            .map_err(|_| PadError::encode("surface height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(PadError::encode("surface must have non-zero size"));
        }

        let reuse = self
            .surfaces
            .get(&id)
            .is_some_and(|s| s.width == width && s.height == height);
        if !reuse {
            self.surfaces.insert(
                id,
                CpuSurface {
                    width,
                    height,
                    pixmap: vello_cpu::Pixmap::new(width, height),
                },
            );
        }
        Ok(())
    }

    fn clear_surface(&mut self, id: SurfaceId, rgba: [u8; 4]) -> PadResult<()> {
        let [r, g, b, a] = rgba;
        let premul = Rgba8Premul::from_straight_rgba(r, g, b, a).to_array();
        let s = self
            .surfaces
            .get_mut(&id)
            .ok_or_else(|| PadError::encode(format!("clear surface {id:?} was not initialized")))?;
        clear_pixmap(&mut s.pixmap, premul);
        Ok(())
    }

    fn exec_scene(&mut self, pass: &ScenePass, assets: &PreparedAssetStore) -> PadResult<()> {
        let mut surface = self.take_surface(pass.target, "scene target")?;

        if pass.clear_to_transparent {
            clear_pixmap(&mut surface.pixmap, [0, 0, 0, 0]);
        }

        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        let drawn = pass
            .ops
            .iter()
            .try_for_each(|op| draw_op(self, &mut ctx, op, assets));
        if drawn.is_ok() {
            ctx.flush();
            ctx.render_to_pixmap(&mut surface.pixmap);
        }
        self.surfaces.insert(pass.target, surface);
        drawn
    }

    fn exec_offscreen(
        &mut self,
        pass: &OffscreenPass,
        _assets: &PreparedAssetStore,
    ) -> PadResult<()> {
        let mut output = self.take_surface(pass.output, "offscreen output")?;

        let (w, h) = (u32::from(output.width), u32::from(output.height));
        let input_bytes = if pass.input == pass.output {
            output.pixmap.data_as_u8_slice().to_vec()
        } else {
            let Some(input) = self.surfaces.get(&pass.input) else {
                self.surfaces.insert(pass.output, output);
                return Err(PadError::encode(format!(
                    "offscreen input surface {:?} was not initialized",
                    pass.input
                )));
            };
            if input.width != output.width || input.height != output.height {
                self.surfaces.insert(pass.output, output);
                return Err(PadError::encode(
                    "offscreen input/output surface size mismatch",
                ));
            }
            input.pixmap.data_as_u8_slice().to_vec()
        };

        let result = match &pass.fx {
            PassFx::Blur { radius_px, sigma } => {
                blur_rgba8_premul(&input_bytes, w, h, *radius_px, *sigma)
            }
            PassFx::Dilate { radius_px } => dilate_coverage(&input_bytes, w, h, *radius_px),
            PassFx::Paint(fill) => {
                let mut bytes = input_bytes;
                paint_coverage(&mut bytes, w, h, fill).map(|()| bytes)
            }
        };
        if let Ok(bytes) = &result {
            output.pixmap.data_as_u8_slice_mut().copy_from_slice(bytes);
        }
        self.surfaces.insert(pass.output, output);
        result.map(|_| ())
    }

    fn exec_composite(
        &mut self,
        pass: &CompositePass,
        _assets: &PreparedAssetStore,
    ) -> PadResult<()> {
        let mut dst = self.take_surface(pass.target, "composite target")?;

        let mut result = Ok(());
        for op in &pass.ops {
            let CompositeOp::Over { src, opacity } = *op;
            let Some(src) = self.surfaces.get(&src) else {
                result = Err(PadError::encode(format!(
                    "composite src surface {src:?} was not initialized"
                )));
                break;
            };
            result = over_in_place(
                dst.pixmap.data_as_u8_slice_mut(),
                src.pixmap.data_as_u8_slice(),
                opacity,
            );
            if result.is_err() {
                break;
            }
        }
        self.surfaces.insert(pass.target, dst);
        result
    }

    fn readback(&mut self, surface: SurfaceId, plan: &RenderPlan) -> PadResult<Raster> {
        let s = self.surfaces.get(&surface).ok_or_else(|| {
            PadError::encode(format!("readback surface {surface:?} was not initialized"))
        })?;
        let data = s.pixmap.data_as_u8_slice().to_vec();
        let raster = Raster::from_premul(u32::from(s.width), u32::from(s.height), data)?;

        let surface_cap = plan.surfaces.len() as u32;
        self.surfaces.retain(|id, _| id.0 < surface_cap);
        Ok(raster)
    }
}

impl RenderBackend for CpuBackend {}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, premul: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&premul);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn fill_box(ctx: &mut vello_cpu::RenderContext, w: f64, h: f64, opacity: f32) {
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity.max(0.0));
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    assets: &PreparedAssetStore,
) -> PadResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::FillRect {
            rect,
            transform,
            color,
        } => {
            let [r, g, b, a] = unpremultiply_px(color.to_array());
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
            Ok(())
        }
        DrawOp::Image {
            asset,
            transform,
            opacity,
        } => {
            let (paint, w, h) = backend.image_paint_for(*asset, assets)?;
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(paint);
            fill_box(ctx, w, h, *opacity);
            Ok(())
        }
        DrawOp::Svg {
            asset,
            transform,
            opacity,
        } => {
            let (paint, w, h, adjust) = backend.svg_paint_for(*asset, *transform, assets)?;
            ctx.set_transform(affine_to_cpu(adjust));
            ctx.set_paint(paint);
            fill_box(ctx, w, h, *opacity);
            Ok(())
        }
        DrawOp::Text { asset, transform } => {
            let PreparedAsset::Text(text) = assets.get(*asset)? else {
                return Err(PadError::encode(format!("asset {} is not shaped text", asset.0)));
            };
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            for run in &text.runs {
                ctx.glyph_run(&text.font)
                    .font_size(run.font_size)
                    .fill_glyphs(run.glyphs.iter().copied());
            }
            Ok(())
        }
    }
}

fn raster_to_pixmap(raster: &Raster) -> PadResult<vello_cpu::Pixmap> {
    let w: u16 = raster
        .width
        .try_into()
        .map_err(|_| PadError::encode("image width exceeds u16"))?;
    let h: u16 = raster
        .height
        .try_into()
        .map_err(|_| PadError::encode("image height exceeds u16"))?;

    let mut may_have_opacities = false;
    let pixels = raster
        .data
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn image_paint(raster: &Raster) -> PadResult<vello_cpu::Image> {
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(raster_to_pixmap(raster)?)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

impl CpuBackend {
    fn image_paint_for(
        &mut self,
        id: AssetId,
        assets: &PreparedAssetStore,
    ) -> PadResult<(vello_cpu::Image, f64, f64)> {
        let PreparedAsset::Raster(raster) = assets.get(id)? else {
            return Err(PadError::encode(format!("asset {} is not a raster", id.0)));
        };
        let (w, h) = (f64::from(raster.width), f64::from(raster.height));
        if let Some(paint) = self.image_cache.get(&id) {
            return Ok((paint.clone(), w, h));
        }
        let paint = image_paint(raster)?;
        self.image_cache.insert(id, paint.clone());
        Ok((paint, w, h))
    }

    fn svg_paint_for(
        &mut self,
        id: AssetId,
        transform: Affine,
        assets: &PreparedAssetStore,
    ) -> PadResult<(vello_cpu::Image, f64, f64, Affine)> {
        let PreparedAsset::Svg(tree) = assets.get(id)? else {
            return Err(PadError::encode(format!("asset {} is not an svg", id.0)));
        };
        let (width, height, adjust) = svg_raster_params(tree, transform)?;
        let key = SvgRasterKey {
            asset: id,
            width,
            height,
        };
        if let Some(paint) = self.svg_cache.get(&key) {
            return Ok((paint.clone(), f64::from(width), f64::from(height), adjust));
        }
        let paint = image_paint(&rasterize_svg(tree, width, height)?)?;
        self.svg_cache.insert(key, paint.clone());
        Ok((paint, f64::from(width), f64::from(height), adjust))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
