use std::sync::Arc;

use crate::{
    assets::svg_raster::{rasterize_svg, svg_raster_params},
    foundation::{
        core::Affine,
        error::{PadError, PadResult},
        raster::Raster,
    },
};

/// A decoded asset ready for drawing.
#[derive(Clone, Debug)]
pub enum Decoded {
    Raster(Arc<Raster>),
    Svg(Arc<usvg::Tree>),
}

impl Decoded {
    /// Intrinsic size in pixels (SVG: its declared viewport size).
    pub fn size(&self) -> (f64, f64) {
        match self {
            Self::Raster(r) => (f64::from(r.width), f64::from(r.height)),
            Self::Svg(t) => (
                f64::from(t.size().width()),
                f64::from(t.size().height()),
            ),
        }
    }
}

/// Decode PNG/JPEG/WebP/... bytes into a premultiplied raster.
pub fn decode_image(bytes: &[u8]) -> PadResult<Raster> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PadError::decode(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(PadError::decode("decoded image has zero size"));
    }
    Raster::from_straight_rgba8(width, height, rgba.into_raw())
}

pub fn parse_svg(bytes: &[u8]) -> PadResult<Arc<usvg::Tree>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| PadError::decode(format!("parse svg: {e}")))?;
    Ok(Arc::new(tree))
}

/// Sniff an SVG document (optionally behind an XML prolog, BOM or whitespace).
pub fn looks_like_svg_bytes(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && t.contains("<svg"))
}

/// Decode bytes as SVG when hinted or sniffed, otherwise as a raster image.
pub fn decode_any(bytes: &[u8], svg_hint: bool) -> PadResult<Decoded> {
    if svg_hint || looks_like_svg_bytes(bytes) {
        return parse_svg(bytes).map(Decoded::Svg);
    }
    decode_image(bytes).map(|r| Decoded::Raster(Arc::new(r)))
}

/// Decode to pixels. SVG documents are rasterized at their declared size.
pub fn decode_to_raster(bytes: &[u8], svg_hint: bool) -> PadResult<Raster> {
    match decode_any(bytes, svg_hint)? {
        Decoded::Raster(r) => Ok(Arc::unwrap_or_clone(r)),
        Decoded::Svg(tree) => {
            let (w, h, _) = svg_raster_params(&tree, Affine::IDENTITY)?;
            rasterize_svg(&tree, w, h)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
