use crate::{
    assets::store::PreparedAssetStore,
    compile::{CompositePass, OffscreenPass, Pass, RenderPlan, ScenePass, SurfaceDesc, SurfaceId},
    foundation::{
        error::{PadError, PadResult},
        raster::Raster,
    },
};

/// Executes the three pass kinds of a [`RenderPlan`] against some pixel storage.
pub trait PassBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> PadResult<()>;

    /// Fill a surface with a straight RGBA8 color.
    fn clear_surface(&mut self, id: SurfaceId, rgba: [u8; 4]) -> PadResult<()>;

    fn exec_scene(&mut self, pass: &ScenePass, assets: &PreparedAssetStore) -> PadResult<()>;

    fn exec_offscreen(&mut self, pass: &OffscreenPass, assets: &PreparedAssetStore)
    -> PadResult<()>;

    fn exec_composite(&mut self, pass: &CompositePass, assets: &PreparedAssetStore)
    -> PadResult<()>;

    fn readback(&mut self, surface: SurfaceId, plan: &RenderPlan) -> PadResult<Raster>;
}

/// Run every pass of `plan` in order and read back the final surface.
pub fn execute_plan<B: PassBackend + ?Sized>(
    backend: &mut B,
    plan: &RenderPlan,
    assets: &PreparedAssetStore,
) -> PadResult<Raster> {
    for (idx, desc) in plan.surfaces.iter().enumerate() {
        let id = SurfaceId(
            idx.try_into()
                .map_err(|_| PadError::validation("surface id overflow"))?,
        );
        backend.ensure_surface(id, desc)?;
    }
    backend.clear_surface(plan.final_surface, plan.clear_rgba.unwrap_or([0, 0, 0, 0]))?;

    for pass in &plan.passes {
        match pass {
            Pass::Scene(p) => backend.exec_scene(p, assets)?,
            Pass::Offscreen(p) => backend.exec_offscreen(p, assets)?,
            Pass::Composite(p) => backend.exec_composite(p, assets)?,
        }
    }

    backend.readback(plan.final_surface, plan)
}

#[cfg(test)]
#[path = "../../tests/unit/render/passes.rs"]
mod tests;
