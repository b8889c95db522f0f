/// Convenience result type used across captionband.
pub type CaptionResult<T> = Result<T, CaptionError>;

/// Top-level error taxonomy for loading, laying out and rendering.
///
/// Every error is scoped to a single call. Nothing here poisons a [`crate::Session`]: a failed
/// load or render leaves the previously loaded image and the previously rendered frame in place.
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    /// A render or export was requested before any image was decoded.
    #[error("no image loaded")]
    NoImageLoaded,

    /// The image decoder rejected the input bytes.
    #[error("decode error: {0}")]
    Decode(#[source] image::ImageError),

    /// Encoded input is larger than the configured byte limit.
    #[error("image too large: {len} bytes exceeds limit of {limit} bytes")]
    ImageTooLarge {
        /// Size of the rejected input.
        len: u64,
        /// Active limit.
        limit: u64,
    },

    /// A style value that the caller should have constrained is out of range.
    #[error("invalid style parameter: {0}")]
    InvalidStyleParameter(String),

    /// Geometry preconditions failed (zero dimensions, non-finite sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// No usable font face was available for a text draw.
    #[error("font error: {0}")]
    Font(String),

    /// Raster surface failures.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptionError {
    /// Build a [`CaptionError::InvalidStyleParameter`] value.
    pub fn invalid_style(msg: impl Into<String>) -> Self {
        Self::InvalidStyleParameter(msg.into())
    }

    /// Build a [`CaptionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptionError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`CaptionError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

impl From<image::ImageError> for CaptionError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
