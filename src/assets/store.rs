use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{
        decode::{Decoded, decode_any},
        fonts::ShapedText,
        source::{ImageSource, SourceResolver},
    },
    foundation::{
        error::{PadError, PadResult},
        raster::Raster,
    },
};

/// Index of an asset inside a [`PreparedAssetStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

#[derive(Clone, Debug)]
pub enum PreparedAsset {
    Raster(Arc<Raster>),
    Svg(Arc<usvg::Tree>),
    Text(Arc<ShapedText>),
}

impl From<Decoded> for PreparedAsset {
    fn from(d: Decoded) -> Self {
        match d {
            Decoded::Raster(r) => Self::Raster(r),
            Decoded::Svg(t) => Self::Svg(t),
        }
    }
}

/// Every decoded input of one render, addressed by [`AssetId`].
///
/// Sources are decoded once per store; repeated references to the same source share an id.
#[derive(Debug, Default)]
pub struct PreparedAssetStore {
    assets: Vec<PreparedAsset>,
    by_source: HashMap<ImageSource, AssetId>,
}

impl PreparedAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: PreparedAsset) -> PadResult<AssetId> {
        let id = AssetId(
            self.assets
                .len()
                .try_into()
                .map_err(|_| PadError::validation("asset id overflow"))?,
        );
        self.assets.push(asset);
        Ok(id)
    }

    /// Load and decode `source`, or return the id it already has in this store.
    pub fn load(
        &mut self,
        source: &ImageSource,
        resolver: &dyn SourceResolver,
    ) -> PadResult<AssetId> {
        if let Some(id) = self.by_source.get(source) {
            return Ok(*id);
        }
        let bytes = source.load(resolver)?;
        let decoded = decode_any(&bytes, source.looks_like_svg())?;
        let id = self.insert(decoded.into())?;
        self.by_source.insert(source.clone(), id);
        Ok(id)
    }

    pub fn get(&self, id: AssetId) -> PadResult<&PreparedAsset> {
        self.assets
            .get(id.0 as usize)
            .ok_or_else(|| PadError::validation(format!("unknown asset id {}", id.0)))
    }

    /// Intrinsic pixel size of an image or SVG asset.
    pub fn image_size(&self, id: AssetId) -> PadResult<(f64, f64)> {
        match self.get(id)? {
            PreparedAsset::Raster(r) => Ok((f64::from(r.width), f64::from(r.height))),
            PreparedAsset::Svg(t) => Ok(Decoded::Svg(t.clone()).size()),
            PreparedAsset::Text(_) => Err(PadError::validation("asset is text, not an image")),
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
