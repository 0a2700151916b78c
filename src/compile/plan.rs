use crate::{
    assets::store::AssetId,
    effects::paint::Fill,
    foundation::core::{Affine, Canvas, Rect, Rgba8Premul},
};

/// Backend-agnostic render plan for one output image.
///
/// Surface 0 is the output canvas. Every layer is drawn into scratch surfaces, optionally
/// post-processed by offscreen passes, and composited onto surface 0 in layer order.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub canvas: Canvas,
    /// Straight RGBA8 the output surface is cleared to before any layer.
    pub clear_rgba: Option<[u8; 4]>,
    pub surfaces: Vec<SurfaceDesc>,
    pub passes: Vec<Pass>,
    pub final_surface: SurfaceId,
}

#[derive(Clone, Debug)]
pub enum Pass {
    Scene(ScenePass),
    Offscreen(OffscreenPass),
    Composite(CompositePass),
}

/// Draw operations into a surface.
#[derive(Clone, Debug)]
pub struct ScenePass {
    pub target: SurfaceId,
    pub ops: Vec<DrawOp>,
    pub clear_to_transparent: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
}

/// Produce `output` from `input` (which may be the same surface).
#[derive(Clone, Debug)]
pub struct OffscreenPass {
    pub input: SurfaceId,
    pub output: SurfaceId,
    pub fx: PassFx,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PassFx {
    Blur { radius_px: u32, sigma: f32 },
    /// Grow coverage by a disc (text outline).
    Dilate { radius_px: f32 },
    /// Recolor coverage with a solid color or gradient.
    Paint(Fill),
}

#[derive(Clone, Debug)]
pub struct CompositePass {
    pub target: SurfaceId,
    pub ops: Vec<CompositeOp>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompositeOp {
    Over { src: SurfaceId, opacity: f32 },
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        transform: Affine,
        color: Rgba8Premul,
    },
    /// Draw a raster asset's full pixel box `(0,0)-(w,h)` under `transform`.
    Image {
        asset: AssetId,
        transform: Affine,
        opacity: f32,
    },
    /// Draw an SVG asset's viewport box under `transform`.
    Svg {
        asset: AssetId,
        transform: Affine,
        opacity: f32,
    },
    /// Draw shaped text as opaque white coverage. Color is applied by a later paint pass.
    Text { asset: AssetId, transform: Affine },
}
