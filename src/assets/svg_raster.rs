use crate::foundation::{
    core::{Affine, MAX_CANVAS_DIM},
    error::{PadError, PadResult},
    raster::Raster,
};

/// Raster size for drawing an SVG under `transform`, plus the transform to draw that raster with.
///
/// The SVG is rasterized at its drawn scale so scaled-up logos and templates stay sharp; the
/// returned transform maps raster pixels back into the SVG's user space before `transform`.
pub fn svg_raster_params(tree: &usvg::Tree, transform: Affine) -> PadResult<(u32, u32, Affine)> {
    fn to_px(v: f32) -> PadResult<f64> {
        if !v.is_finite() || v <= 0.0 {
            return Err(PadError::decode("svg has invalid width/height"));
        }
        Ok(f64::from(v).ceil().max(1.0))
    }

    let size = tree.size();
    let base_w = to_px(size.width())?;
    let base_h = to_px(size.height())?;

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = (base_w * sx).ceil().max(1.0);
    let h = (base_h * sy).ceil().max(1.0);
    let max = f64::from(MAX_CANVAS_DIM);
    if w > max || h > max {
        return Err(PadError::decode(format!(
            "svg raster size too large: {w}x{h} (max {MAX_CANVAS_DIM}x{MAX_CANVAS_DIM})"
        )));
    }

    let adjust = transform * Affine::scale_non_uniform(1.0 / sx, 1.0 / sy);
    Ok((w as u32, h as u32, adjust))
}

/// Render the whole SVG viewport stretched into a `width x height` premultiplied raster.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> PadResult<Raster> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PadError::decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    Raster::from_premul(width, height, pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
