/// Convenience result type used across padcraft.
pub type PadResult<T> = Result<T, PadError>;

/// Top-level error taxonomy used by the rendering pipeline.
///
/// Decode and geometry problems are usually recovered locally (skip the layer, clamp the value,
/// substitute a placeholder). Only encode failures are expected to reach callers of a final render.
#[derive(thiserror::Error, Debug)]
pub enum PadError {
    /// Invalid user-provided data that cannot be clamped into shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced raster, vector document, font or data URL could not be loaded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A rectangle or size could not be made representable, even after clamping.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Output rasterization or image encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing configuration records.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PadError {
    /// Build a [`PadError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PadError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PadError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`PadError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PadError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error means "an input asset was unusable" rather than a pipeline failure.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<serde_json::Error> for PadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
