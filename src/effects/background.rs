use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
};

use crate::foundation::{error::PadResult, math::unpremultiply_px, raster::Raster};

/// Background color candidates: the four corners and the middle of the top edge.
///
/// Fully transparent samples are ignored, since such a template already has no background to
/// remove at that spot.
pub fn sample_background(src: &Raster) -> Vec<[u8; 3]> {
    if src.is_empty() {
        return Vec::new();
    }
    let (r, b) = (src.width - 1, src.height - 1);
    let points = [(0, 0), (r, 0), (0, b), (r, b), (src.width / 2, 0)];

    let mut out = Vec::with_capacity(points.len());
    for (x, y) in points {
        let Some(px) = src.pixel(x, y) else {
            continue;
        };
        if px[3] == 0 {
            continue;
        }
        let s = unpremultiply_px(px);
        let rgb = [s[0], s[1], s[2]];
        if !out.contains(&rgb) {
            out.push(rgb);
        }
    }
    out
}

/// Make every pixel within `tolerance` (Euclidean RGB distance) of a sampled background color
/// fully transparent.
#[tracing::instrument(skip(src), fields(width = src.width, height = src.height))]
pub fn remove_background(src: &Raster, tolerance: f32) -> Raster {
    let candidates = sample_background(src);
    let mut out = src.clone();
    if candidates.is_empty() || !tolerance.is_finite() || tolerance <= 0.0 {
        return out;
    }
    let limit = tolerance * tolerance;

    let mut cleared = 0usize;
    for px in out.data.chunks_exact_mut(4) {
        if px[3] == 0 {
            continue;
        }
        let s = unpremultiply_px([px[0], px[1], px[2], px[3]]);
        let near = candidates.iter().any(|c| {
            let d: f32 = (0..3)
                .map(|i| {
                    let v = f32::from(s[i]) - f32::from(c[i]);
                    v * v
                })
                .sum();
            d < limit
        });
        if near {
            px.copy_from_slice(&[0, 0, 0, 0]);
            cleared += 1;
        }
    }
    tracing::debug!(cleared, candidates = candidates.len(), "background removed");
    out
}

/// Hashes by digest, compares the full identity so digest collisions stay distinct entries.
#[derive(Clone, Debug, PartialEq, Eq)]
struct CacheKey {
    digest: u64,
    identity: String,
    tolerance_bits: u32,
}

impl CacheKey {
    fn new(identity: &str, tolerance: f32) -> Self {
        Self {
            digest: xxhash_rust::xxh3::xxh3_64(identity.as_bytes()),
            identity: identity.to_owned(),
            tolerance_bits: tolerance.to_bits(),
        }
    }
}

impl std::hash::Hash for CacheKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
        self.tolerance_bits.hash(state);
    }
}

/// Append-only map from template identity to its background-removed raster.
///
/// Writes are idempotent: two callers racing on the same key derive identical rasters, and the
/// first stored value wins.
#[derive(Debug, Default)]
pub struct BackgroundCache {
    entries: Mutex<HashMap<CacheKey, Arc<Raster>>>,
}

impl BackgroundCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by every render driver.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<BackgroundCache> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn get(&self, identity: &str, tolerance: f32) -> Option<Arc<Raster>> {
        let key = CacheKey::new(identity, tolerance);
        self.lock().get(&key).cloned()
    }

    /// Return the cached raster for `identity`, running `compute` on a miss.
    ///
    /// The lock is not held while `compute` runs.
    pub fn get_or_compute(
        &self,
        identity: &str,
        tolerance: f32,
        compute: impl FnOnce() -> PadResult<Raster>,
    ) -> PadResult<Arc<Raster>> {
        let key = CacheKey::new(identity, tolerance);
        if let Some(hit) = self.lock().get(&key).cloned() {
            tracing::debug!(digest = key.digest, "background cache hit");
            return Ok(hit);
        }
        let fresh = Arc::new(compute()?);
        let stored = self.lock().entry(key).or_insert(fresh).clone();
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<Raster>>> {
        // A poisoned map still only holds fully-built entries.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/background.rs"]
mod tests;
