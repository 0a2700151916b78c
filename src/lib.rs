//! padcraft renders custom mousepad and playmat designs.
//!
//! A design is a [`LayerState`] snapshot: a base image with color adjustments, a filter preset
//! and an optional crop, plus a template overlay, logos, text elements and an RGB border. Every
//! position is stored in percent of the canvas, so one snapshot renders at any output size.
//!
//! # Pipeline overview
//!
//! 1. **Working image**: decode the base, apply adjustments and preset, crop.
//! 2. **Resolve**: decode overlays and shape text; unusable layers are skipped with a warning.
//! 3. **Compile**: lower the resolved design into a [`RenderPlan`] of passes over surfaces.
//! 4. **Render**: execute the plan on the CPU backend into premultiplied RGBA8.
//! 5. **Encode**: PNG or JPEG, usually as a base64 data URL.
//!
//! [`RenderDriver`] wraps the pipeline with debounced previews, final exports and crop commits.
#![forbid(unsafe_code)]

pub mod assets;
pub mod compile;
pub mod effects;
pub mod foundation;
pub mod geometry;
pub mod render;
pub mod scene;
pub mod session;

pub use assets::fonts::{FontBook, FontFace, TextLayoutEngine};
pub use assets::source::{FsResolver, ImageSource, InlineOnly, SourceResolver, encode_data_url};
pub use assets::store::{AssetId, PreparedAsset, PreparedAssetStore};
pub use compile::{RenderPlan, compile_design};
pub use effects::background::{BackgroundCache, remove_background};
pub use effects::filter::{FilterChain, FilterOp};
pub use foundation::core::{Canvas, Rgba8Premul};
pub use foundation::error::{PadError, PadResult};
pub use foundation::raster::Raster;
pub use foundation::settings::RenderSettings;
pub use geometry::crop::{CropDrag, CropHandle, CropMode, CropRect, hit_test};
pub use geometry::units::{PercentPoint, PercentSize};
pub use render::{
    Compositor, CpuBackend, EncodedImage, LayerKind, OutputFormat, RenderBackend, RenderOutcome,
    SkippedLayer, encode_raster,
};
pub use scene::color::Color;
pub use scene::layer_state::{
    Adjustments, FilterId, GradientDirection, LayerState, LogoElement, RgbEffect, RgbMode,
    TextElement, TextGradient, TextOutline, TextShadow,
};
pub use scene::products::{ProductSizeTable, ProductType};
pub use session::driver::{DriverState, FinalOutput, PreviewOutput, RenderDriver};
pub use session::preview::{PreviewScheduler, RequestId};
pub use session::template::{prepare_template, prepare_template_in, template_raster};
