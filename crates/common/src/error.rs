//! Error types shared across SlideReel crates.

use std::path::PathBuf;

/// Top-level error type for SlideReel operations.
///
/// Variants map onto the three failure classes of a build: fatal input
/// errors (`InvalidSlide`, `EmptyTimeline`, `Config`), serialization and
/// I/O failures, and wrapped errors from lower layers.
#[derive(Debug, thiserror::Error)]
pub enum SlideReelError {
    #[error("Invalid slide {ordinal}: {reason}")]
    InvalidSlide { ordinal: u32, reason: String },

    #[error("Timeline is empty: at least one slide is required")]
    EmptyTimeline,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Project error: {message}")]
    Project { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SlideReelError.
pub type SlideReelResult<T> = Result<T, SlideReelError>;

impl SlideReelError {
    pub fn invalid_slide(ordinal: u32, reason: impl Into<String>) -> Self {
        Self::InvalidSlide {
            ordinal,
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project {
            message: msg.into(),
        }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Whether this error is caused by bad input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSlide { .. } | Self::EmptyTimeline | Self::Config { .. } | Self::Project { .. }
        )
    }
}
