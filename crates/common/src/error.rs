//! Error types shared across Snapmark crates.

use std::path::PathBuf;

/// Top-level error type for Snapmark operations.
///
/// Degenerate geometry is deliberately absent: a gesture that is too small
/// to become an annotation is discarded without producing an error.
#[derive(Debug, thiserror::Error)]
pub enum SnapmarkError {
    /// Media has no usable natural dimensions (not decoded yet, empty frame).
    #[error("Load error: {message}")]
    Load { message: String },

    /// Canvas allocation or artifact serialization failed.
    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using SnapmarkError.
pub type SnapmarkResult<T> = Result<T, SnapmarkError>;

impl SnapmarkError {
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error came from the media or rasterizing stage.
    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Render { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_format_messages() {
        assert_eq!(
            SnapmarkError::load("frame is 0x0").to_string(),
            "Load error: frame is 0x0"
        );
        assert_eq!(
            SnapmarkError::render("encoder produced no data").to_string(),
            "Render error: encoder produced no data"
        );
    }

    #[test]
    fn test_render_failure_classification() {
        assert!(SnapmarkError::load("x").is_render_failure());
        assert!(SnapmarkError::render("x").is_render_failure());
        assert!(!SnapmarkError::config("x").is_render_failure());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SnapmarkError = io.into();
        assert!(matches!(err, SnapmarkError::Io(_)));
    }
}
