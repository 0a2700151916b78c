//! Pixel-level stages: color adjustments and filter presets, blur, crop, background removal and
//! the mask operations the compositor uses for text outlines, shadows and gradient fills.

pub mod background;
pub mod blur;
pub mod composite;
pub mod crop;
pub mod filter;
pub mod paint;
