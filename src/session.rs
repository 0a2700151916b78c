//! Render requests over time: debounced previews, final exports, crop commits and one-shot
//! template preparation.

pub mod driver;
pub mod preview;
pub mod template;
