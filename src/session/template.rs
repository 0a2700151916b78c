use std::sync::Arc;

use crate::{
    assets::{
        decode::decode_to_raster,
        source::{ImageSource, SourceResolver},
    },
    effects::background::{BackgroundCache, remove_background},
    foundation::{error::PadResult, raster::Raster},
    render::encode::{OutputFormat, encode_raster},
};

/// Background-removed pixels for a template source, computed at most once per
/// `(source, tolerance)` in `cache`.
pub fn template_raster(
    cache: &BackgroundCache,
    source: &ImageSource,
    resolver: &dyn SourceResolver,
    tolerance: f32,
) -> PadResult<Arc<Raster>> {
    cache.get_or_compute(source.as_str(), tolerance, || {
        let bytes = source.load(resolver)?;
        let raster = decode_to_raster(&bytes, source.looks_like_svg())?;
        Ok(remove_background(&raster, tolerance))
    })
}

/// Prepare a template overlay once when it is selected: remove its flat background through the
/// process-wide cache and return it as an inline PNG source.
///
/// A source that cannot be loaded is returned unchanged; the compositor will then skip it.
pub fn prepare_template(
    source: &ImageSource,
    resolver: &dyn SourceResolver,
    tolerance: f32,
) -> ImageSource {
    prepare_template_in(BackgroundCache::global(), source, resolver, tolerance)
}

/// [`prepare_template`] against an explicit cache.
pub fn prepare_template_in(
    cache: &BackgroundCache,
    source: &ImageSource,
    resolver: &dyn SourceResolver,
    tolerance: f32,
) -> ImageSource {
    let prepared = template_raster(cache, source, resolver, tolerance)
        .and_then(|r| encode_raster(&r, OutputFormat::Png, 100))
        .map(|png| ImageSource::inline(OutputFormat::Png.mime(), &png.bytes));
    match prepared {
        Ok(inline) => inline,
        Err(err) => {
            tracing::warn!(%source, error = %err, "template left unprocessed");
            source.clone()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/template.rs"]
mod tests;
