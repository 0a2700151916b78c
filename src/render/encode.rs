use image::{ExtendedColorType, ImageEncoder};

use crate::{
    assets::source::encode_data_url,
    effects::composite::flatten_onto,
    foundation::{
        error::{PadError, PadResult},
        raster::Raster,
    },
};

/// Encoded output container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum OutputFormat {
    /// Lossless, keeps transparency.
    #[default]
    Png,
    /// Photographic output, flattened over white.
    Jpeg,
}

impl OutputFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Guess from a file name; unknown extensions give `None`.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Bytes of one encoded image plus the format they are in.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl EncodedImage {
    pub fn to_data_url(&self) -> String {
        encode_data_url(self.format.mime(), &self.bytes)
    }
}

const JPEG_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Encode a premultiplied raster. `jpeg_quality` is clamped to `1..=100`.
#[tracing::instrument(skip(raster), fields(width = raster.width, height = raster.height))]
pub fn encode_raster(
    raster: &Raster,
    format: OutputFormat,
    jpeg_quality: u8,
) -> PadResult<EncodedImage> {
    if raster.is_empty() {
        return Err(PadError::encode("cannot encode an empty raster"));
    }
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            let rgba = raster.to_straight_rgba8();
            image::codecs::png::PngEncoder::new(&mut bytes)
                .write_image(&rgba, raster.width, raster.height, ExtendedColorType::Rgba8)
                .map_err(|e| PadError::encode(format!("png encode: {e}")))?;
        }
        OutputFormat::Jpeg => {
            let rgb = flatten_onto(&raster.data, JPEG_BACKGROUND);
            image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut bytes,
                jpeg_quality.clamp(1, 100),
            )
            .write_image(&rgb, raster.width, raster.height, ExtendedColorType::Rgb8)
            .map_err(|e| PadError::encode(format!("jpeg encode: {e}")))?;
        }
    }
    Ok(EncodedImage {
        format,
        width: raster.width,
        height: raster.height,
        bytes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
