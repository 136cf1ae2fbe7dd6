// THEORY:
// Only malformed input is a hard failure in this crate. Ordinary geometric
// outcomes (a circle that cannot be placed, two circles that end up touching
// after a tick) are handled in-band by the engines and never surface here.

use thiserror::Error;

/// Failures that can escape the field generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The canvas, grid, radius range or a runtime override is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The raster surface could not be produced.
    #[error("render failure: {0}")]
    RenderFailure(String),
}

impl FieldError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

pub type FieldResult<T> = Result<T, FieldError>;
