//! Export error types.

use super::ExportFormat;
use crate::bounds::BoundsError;
use crate::document::DocumentError;
use crate::utils::exec::ExecError;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// ValidationError
// ============================================================================

/// A precondition of the export that does not hold.
///
/// Each variant names exactly one failed check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please indicate a file name and path to export the image")]
    EmptyPath,

    #[error("Please indicate a file name")]
    MissingFileName,

    #[error("Please indicate a directory other than your system's base directory")]
    RootDirectory,

    #[error("The directory `{}` does not exist, please enter a valid path to your file", .0.display())]
    MissingDirectory(PathBuf),

    #[error("The extension `{ext}` is not a valid extension for {} files", .format.label())]
    ExtensionMismatch { ext: String, format: ExportFormat },

    #[error(
        "The installed `{encoder}` does not support exporting to the webp file format, please update ImageMagick"
    )]
    UnsupportedFormat { encoder: String },

    #[error("Please indicate the background color like this: \"#abc123\" (got `{0}`)")]
    InvalidColor(String),

    #[error("Please select something, or export the whole page")]
    EmptySelection,
}

// ============================================================================
// ExportError
// ============================================================================

/// Any failure that ends an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("Rasterizing with `{program}` failed with {status}\n{diagnostics}")]
    Rasterize {
        program: String,
        status: String,
        diagnostics: String,
    },

    #[error("Encoding with `{program}` failed with {status}\n{diagnostics}")]
    Encode {
        program: String,
        status: String,
        diagnostics: String,
    },
}
