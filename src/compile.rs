//! Lowering of a resolved design into a backend-agnostic [`RenderPlan`].

pub mod design;
pub mod plan;

pub use design::{
    BaseLayer, ResolvedDesign, ResolvedLogo, ResolvedText, compile_design, text_transform,
};
pub use plan::{
    CompositeOp, CompositePass, DrawOp, OffscreenPass, Pass, PassFx, RenderPlan, ScenePass,
    SurfaceDesc, SurfaceId,
};
