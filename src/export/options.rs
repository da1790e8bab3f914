//! Export options and external tool selection.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output raster format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Baseline JPEG, background composited.
    #[default]
    Jpg,
    /// Lossless WEBP, transparency preserved.
    Webp,
}

impl ExportFormat {
    /// Accepted file extensions, lowercase, without the dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Jpg => &["jpg", "jpeg"],
            Self::Webp => &["webp"],
        }
    }

    /// Format name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Jpg => "JPEG",
            Self::Webp => "WEBP",
        }
    }

    /// Whether the rasterizer composites a background color for this format.
    pub fn uses_background(self) -> bool {
        matches!(self, Self::Jpg)
    }
}

/// User-facing options of one export, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Output file path, `~` not yet expanded.
    pub output_path: String,
    /// `#rrggbb` background for JPEG output.
    pub background: String,
    /// Encoder quality, 0-100.
    pub quality: u8,
    /// Output resolution in DPI.
    pub density: u32,
    /// Export the whole page instead of the selection.
    pub whole_page: bool,
    /// Measure the selection in memory instead of querying the rasterizer.
    pub fast: bool,
    pub format: ExportFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_path: String::new(),
            background: "#ffffff".to_string(),
            quality: 100,
            density: 90,
            whole_page: false,
            fast: true,
            format: ExportFormat::Jpg,
        }
    }
}

/// External programs and scratch space used by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Vector rasterizer (Inkscape).
    pub rasterizer: String,
    /// Raster encoder (ImageMagick).
    pub encoder: String,
    /// Geometry query program for the slow bounding-box strategy.
    pub query: String,
    /// Directory for the intermediate PNG, platform default when `None`.
    pub temp_dir: Option<PathBuf>,
    /// Leave the intermediate PNG on disk after encoding.
    pub keep_intermediate: bool,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            rasterizer: "inkscape".to_string(),
            encoder: "convert".to_string(),
            query: "inkscape".to_string(),
            temp_dir: None,
            keep_intermediate: false,
        }
    }
}
