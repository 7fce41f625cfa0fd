use crate::assets::loader::LoadError;

/// Convenience result type used across adframe.
pub type AdframeResult<T> = Result<T, AdframeError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Per-layer asset failures during a render pass are not errors of the pass; they are reported in
/// [`crate::RenderReport::defects`]. A superseded pass is not an error either.
#[derive(thiserror::Error, Debug)]
pub enum AdframeError {
    /// Invalid user-provided template or session data. Raised before any drawing begins.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asset could not be acquired or decoded.
    #[error("asset load error: {0}")]
    AssetLoad(#[from] LoadError),

    /// Rasterization or compositing failed.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdframeError {
    /// Build a [`AdframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`AdframeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`AdframeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
