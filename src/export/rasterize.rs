//! Vector to PNG rasterization with Inkscape.
//!
//! Uses the Inkscape 0.92 export flags:
//!
//! ```text
//! inkscape --export-area=x0:y0:x1:y1 --export-dpi=90 \
//!          --export-png=/tmp/jpegexport-123.png --export-background=#ffffff drawing.svg
//! ```

use super::{ExportError, ExportPlan, Toolchain};
use crate::bounds::BoundingBox;
use crate::{debug, log};
use crate::utils::{
    exec::{Cmd, INKSCAPE_FILTER, Runner},
    platform,
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Region handed to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterTarget {
    Area(BoundingBox),
    Page,
}

/// The intermediate PNG written by [`rasterize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateRaster {
    path: PathBuf,
}

impl IntermediateRaster {
    /// Location for this process under `temp_dir` (platform default if `None`).
    pub fn for_process(temp_dir: Option<&Path>) -> Self {
        Self {
            path: platform::intermediate_path(temp_dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. A file that was never written is not an error.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }

    /// Remove the file unless `keep` is set.
    ///
    /// Runs on success and failure alike. A file that cannot be removed only
    /// produces a warning: it never changes the outcome of the export.
    pub fn release(&self, keep: bool) {
        if keep {
            debug!("export"; "kept {}", self.path.display());
            return;
        }
        if let Err(err) = self.remove() {
            log!("warning"; "could not remove `{}`: {}", self.path.display(), err);
        }
    }
}

/// Build the rasterizer command.
pub fn command(
    target: RasterTarget,
    source: &Path,
    raster: &IntermediateRaster,
    plan: &ExportPlan,
    tools: &Toolchain,
) -> Cmd {
    let area = match target {
        RasterTarget::Area(area) => format!("--export-area={area}"),
        RasterTarget::Page => "--export-area-page".to_string(),
    };

    let mut png = std::ffi::OsString::from("--export-png=");
    png.push(raster.path());

    let mut cmd = Cmd::new(&tools.rasterizer)
        .arg(area)
        .arg(format!("--export-dpi={}", plan.density))
        .arg(png)
        .filter(&INKSCAPE_FILTER);

    if let Some(background) = &plan.background {
        cmd = cmd.arg(format!("--export-background={background}"));
    }

    cmd.arg(source)
}

/// Render `target` of `source` into this process's intermediate PNG.
///
/// The PNG is only trusted when the rasterizer exits with code 0.
pub fn rasterize(
    target: RasterTarget,
    source: &Path,
    plan: &ExportPlan,
    tools: &Toolchain,
    runner: &dyn Runner,
) -> Result<IntermediateRaster, ExportError> {
    let raster = IntermediateRaster::for_process(tools.temp_dir.as_deref());
    let cmd = command(target, source, &raster, plan, tools);
    debug!("rasterize"; "{:?} at {} dpi -> {}", target, plan.density, raster.path().display());

    let output = runner.run(&cmd)?;
    if !output.success() {
        // the rasterizer may have written part of the PNG before failing
        raster.release(tools.keep_intermediate);
        return Err(ExportError::Rasterize {
            program: cmd.program_name(),
            status: output.status_label(),
            diagnostics: output.diagnostics(),
        });
    }
    Ok(raster)
}
