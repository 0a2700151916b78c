use std::time::Instant;

use crate::{
    assets::source::ImageSource,
    effects::{crop::apply_crop, filter::FilterChain},
    foundation::{
        core::Canvas,
        error::{PadError, PadResult},
    },
    render::{
        encode::{EncodedImage, OutputFormat, encode_raster},
        pipeline::{Compositor, RenderOutcome, SkippedLayer},
    },
    scene::{layer_state::LayerState, products::ProductSizeTable},
    session::preview::{PreviewScheduler, RequestId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    /// A debounced preview is waiting for its quiet period.
    Previewing,
    RenderingFinal,
}

/// Result of a final/export render.
#[derive(Clone, Debug)]
pub struct FinalOutput {
    pub request_id: RequestId,
    pub image: EncodedImage,
    pub placeholder: bool,
    pub skipped: Vec<SkippedLayer>,
}

impl FinalOutput {
    pub fn data_url(&self) -> String {
        self.image.to_data_url()
    }
}

/// Result of a debounced preview. Pixels are the same the final render produces; the CSS filter
/// lets a UI approximate adjustments on its own image while a newer preview is pending.
#[derive(Clone, Debug)]
pub struct PreviewOutput {
    pub request_id: RequestId,
    pub css_filter: String,
    pub outcome: RenderOutcome,
}

/// Turns layer-state snapshots into images, in debounced preview or exact final mode.
///
/// Every request gets a fresh [`RequestId`]; a result whose id is not
/// [`RenderDriver::latest_request`] has been superseded and should be discarded.
#[derive(Debug)]
pub struct RenderDriver {
    compositor: Compositor,
    previews: PreviewScheduler<LayerState>,
    state: DriverState,
    last_id: u64,
}

impl RenderDriver {
    pub fn new(compositor: Compositor) -> Self {
        let debounce = compositor.settings().preview_debounce;
        Self {
            compositor,
            previews: PreviewScheduler::new(debounce),
            state: DriverState::Idle,
            last_id: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        (self.last_id > 0).then_some(RequestId(self.last_id))
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest_request() == Some(id)
    }

    fn next_id(&mut self) -> RequestId {
        self.last_id += 1;
        RequestId(self.last_id)
    }

    fn settle(&mut self) {
        self.state = if self.previews.is_pending() {
            DriverState::Previewing
        } else {
            DriverState::Idle
        };
    }

    /// Queue a preview of `snapshot`, replacing any pending one.
    pub fn request_preview(&mut self, snapshot: LayerState, now: Instant) -> RequestId {
        let id = self.next_id();
        self.previews.request(id, snapshot, now);
        self.state = DriverState::Previewing;
        id
    }

    pub fn cancel_preview(&mut self) -> Option<RequestId> {
        let dropped = self.previews.cancel();
        self.settle();
        dropped
    }

    pub fn preview_deadline(&self) -> Option<Instant> {
        self.previews.deadline()
    }

    /// Run the pending preview if its quiet period has elapsed at `now`.
    #[tracing::instrument(skip(self, now))]
    pub fn poll_preview(&mut self, now: Instant) -> Option<PadResult<PreviewOutput>> {
        let (request_id, snapshot) = self.previews.poll(now)?;
        let css_filter = FilterChain::for_design(&snapshot.adjustments, snapshot.filter).to_css();
        let result = self
            .compositor
            .render(&snapshot)
            .map(|outcome| PreviewOutput {
                request_id,
                css_filter,
                outcome,
            });
        self.settle();
        Some(result)
    }

    /// Exact render at the design's canvas size, clamped into the drawable range.
    pub fn render_final(
        &mut self,
        state: &LayerState,
        format: OutputFormat,
    ) -> PadResult<FinalOutput> {
        self.render_final_at(state, state.canvas_size.clamped(), format)
    }

    /// Exact render at the pixel size a product table gives for `size_name`.
    pub fn render_for_product(
        &mut self,
        state: &LayerState,
        sizes: &ProductSizeTable,
        size_name: &str,
        format: OutputFormat,
    ) -> PadResult<FinalOutput> {
        let canvas = sizes.lookup(size_name)?;
        self.render_final_at(state, canvas, format)
    }

    #[tracing::instrument(skip(self, state))]
    pub fn render_final_at(
        &mut self,
        state: &LayerState,
        output: Canvas,
        format: OutputFormat,
    ) -> PadResult<FinalOutput> {
        let request_id = self.next_id();
        self.state = DriverState::RenderingFinal;
        let result = self.run_final(state, output, format);
        self.settle();

        let (outcome, image) = result?;
        tracing::debug!(%request_id, bytes = image.bytes.len(), "final render encoded");
        Ok(FinalOutput {
            request_id,
            image,
            placeholder: outcome.placeholder,
            skipped: outcome.skipped,
        })
    }

    fn run_final(
        &mut self,
        state: &LayerState,
        output: Canvas,
        format: OutputFormat,
    ) -> PadResult<(RenderOutcome, EncodedImage)> {
        let outcome = self.compositor.render_at(state, output)?;
        let quality = self.compositor.settings().jpeg_quality;
        let image = encode_raster(&outcome.raster, format, quality)?;
        Ok((outcome, image))
    }

    /// Bake the crop rectangle into a new inline base image and clear `cropArea`.
    ///
    /// Color adjustments stay in the state and keep applying to the new base. Text and logo
    /// percentages are kept as they are, so they now address the cropped image.
    pub fn commit_crop(&self, state: &LayerState) -> PadResult<LayerState> {
        let Some(crop) = state.crop_area else {
            return Ok(state.clone());
        };
        let source = state
            .base_image
            .as_ref()
            .ok_or_else(|| PadError::decode("no base image to crop"))?;
        let decoded = self.compositor.load_raster(source)?;
        let min = self.compositor.settings().min_crop_percent;
        let cropped = apply_crop(&decoded, Some(crop), min)?;
        let png = encode_raster(&cropped, OutputFormat::Png, 100)?;
        tracing::debug!(
            from = ?(decoded.width, decoded.height),
            to = ?(cropped.width, cropped.height),
            "crop committed"
        );

        let mut out = state.clone();
        out.base_image = Some(ImageSource::inline(OutputFormat::Png.mime(), &png.bytes));
        out.crop_area = None;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/driver.rs"]
mod tests;
