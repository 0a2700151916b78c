//! Plan execution and output encoding.

pub mod cpu;
pub mod encode;
pub mod passes;
pub mod pipeline;

use crate::{
    assets::store::PreparedAssetStore,
    compile::RenderPlan,
    foundation::{error::PadResult, raster::Raster},
};

pub use cpu::CpuBackend;
pub use encode::{EncodedImage, OutputFormat, encode_raster};
pub use passes::{PassBackend, execute_plan};
pub use pipeline::{Compositor, LayerKind, RenderOutcome, SkippedLayer};

/// A [`PassBackend`] that can run whole plans.
pub trait RenderBackend: PassBackend {
    fn render_plan(&mut self, plan: &RenderPlan, assets: &PreparedAssetStore) -> PadResult<Raster> {
        execute_plan(self, plan, assets)
    }
}
