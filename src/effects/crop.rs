use crate::{
    foundation::{error::PadResult, raster::Raster},
    geometry::crop::CropRect,
};

/// Extract the working sub-image selected by `crop`.
///
/// `None` returns the source unchanged. The rectangle is re-clamped (each edge at least
/// `min_percent` of the image) before it is mapped to pixels, so malformed persisted rectangles
/// still produce a usable image.
pub fn apply_crop(src: &Raster, crop: Option<CropRect>, min_percent: f64) -> PadResult<Raster> {
    let Some(requested) = crop else {
        return Ok(src.clone());
    };
    let rect = requested.clamped(min_percent);
    if rect != requested {
        tracing::debug!(?requested, clamped = ?rect, "crop rectangle re-clamped");
    }
    if rect == CropRect::FULL {
        return Ok(src.clone());
    }
    let (x, y, w, h) = rect.to_pixels(src.width, src.height)?;
    src.sub_rect(x, y, w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/crop.rs"]
mod tests;
