//! Option validation and export planning.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. output path is not empty
//! 2. output path names a file
//! 3. its directory is not empty and not the filesystem root
//! 4. the directory exists
//! 5. the extension matches the format
//! 6. (webp only) the encoder lists WEBP among its formats
//! 7. the background color is `#rrggbb`
//! 8. (area mode only) the selection is not empty
//!
//! The encoder check in step 6 is the only process started before an
//! [`ExportPlan`] exists.

use super::{ExportError, ExportFormat, ExportOptions, Toolchain, ValidationError};
use crate::bounds::StrategyKind;
use crate::debug;
use crate::utils::exec::{Cmd, ExecError, Runner};
use regex::Regex;
use std::{
    path::{Path, PathBuf, is_separator},
    sync::OnceLock,
};

/// Token the encoder prints for WEBP in its format list.
const WEBP_TOKEN: &str = "WEBP";

/// What part of the drawing is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// The selection's bounding box, measured with the given strategy.
    Area(StrategyKind),
    /// The whole page.
    Page,
}

/// Validated, immutable export parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub output: PathBuf,
    pub format: ExportFormat,
    /// Background passed to the rasterizer, `None` for formats that keep
    /// transparency.
    pub background: Option<String>,
    pub quality: u8,
    pub density: u32,
    pub mode: ExportMode,
}

/// Validate `options` against the filesystem, the encoder and `selection`.
pub fn validate(
    options: &ExportOptions,
    selection: &[String],
    tools: &Toolchain,
    runner: &dyn Runner,
) -> Result<ExportPlan, ExportError> {
    let output = check_output_path(&options.output_path)?;
    check_extension(&output, options.format)?;

    if options.format == ExportFormat::Webp && !supports_webp(&tools.encoder, runner)? {
        return Err(ValidationError::UnsupportedFormat {
            encoder: tools.encoder.clone(),
        }
        .into());
    }

    check_color(&options.background)?;

    let mode = if options.whole_page {
        ExportMode::Page
    } else if selection.is_empty() {
        return Err(ValidationError::EmptySelection.into());
    } else {
        ExportMode::Area(StrategyKind::from_fast(options.fast))
    };

    let background = options
        .format
        .uses_background()
        .then(|| options.background.clone());

    Ok(ExportPlan {
        output,
        format: options.format,
        background,
        quality: options.quality,
        density: options.density,
        mode,
    })
}

/// Expand `~` and check path, file name and directory (steps 1-4).
fn check_output_path(raw: &str) -> Result<PathBuf, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyPath);
    }

    let expanded = shellexpand::tilde(raw).into_owned();
    if expanded.ends_with(is_separator) {
        return Err(ValidationError::MissingFileName);
    }

    let path = PathBuf::from(expanded);
    if path.file_name().is_none() {
        return Err(ValidationError::MissingFileName);
    }

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    if dir.as_os_str().is_empty() || is_root(dir) {
        return Err(ValidationError::RootDirectory);
    }
    if !dir.is_dir() {
        return Err(ValidationError::MissingDirectory(dir.to_path_buf()));
    }

    Ok(path)
}

fn is_root(dir: &Path) -> bool {
    dir.has_root() && dir.parent().is_none()
}

/// Case-insensitive extension check (step 5).
fn check_extension(path: &Path, format: ExportFormat) -> Result<(), ValidationError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if format.extensions().contains(&ext.as_str()) {
        return Ok(());
    }

    let shown = if ext.is_empty() {
        String::new()
    } else {
        format!(".{ext}")
    };
    Err(ValidationError::ExtensionMismatch { ext: shown, format })
}

/// Ask the encoder for its format list and look for WEBP (step 6).
pub fn supports_webp(encoder: &str, runner: &dyn Runner) -> Result<bool, ExecError> {
    let output = runner.run(&Cmd::new(encoder).args(["-list", "format"]))?;
    let found = output.stdout.contains(WEBP_TOKEN);
    debug!("plan"; "`{encoder}` webp support: {found}");
    Ok(found)
}

/// `#rrggbb` check (step 7).
fn check_color(color: &str) -> Result<(), ValidationError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

    if re.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}
