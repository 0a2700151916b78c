//! Asset loading: source references, raster and SVG decoding, fonts and the per-render prepared
//! asset store.

pub mod decode;
pub mod fonts;
pub mod source;
pub mod store;
pub mod svg_raster;
