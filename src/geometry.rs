//! Percent-of-canvas unit model and the crop rectangle.
//!
//! Every persisted position and size is expressed in percent of the current working canvas so
//! one design renders identically at any output resolution. Conversion to pixels happens only
//! at plan compile time.

pub mod crop;
pub mod units;
