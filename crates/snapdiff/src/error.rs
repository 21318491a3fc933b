use std::path::PathBuf;

use thiserror::Error;

/// Hard failures of the engine.
///
/// Comparison outcomes (dimension mismatch, tolerance exceeded) are never
/// errors; they are reported through [`crate::Difference`].
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("failed to decode image {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode image {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("could not resolve element '{selector}': {message}")]
    Locator { selector: String, message: String },
}
