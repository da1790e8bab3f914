//! PNG to JPEG/WEBP encoding with ImageMagick.

use super::{ExportError, ExportFormat, ExportPlan, Toolchain};
use super::rasterize::IntermediateRaster;
use crate::debug;
use crate::utils::exec::{Cmd, Runner};

/// Build the encoder command for the plan's format.
///
/// JPEG output is written baseline (`-interlace None`); WEBP is lossless.
pub fn command(raster: &IntermediateRaster, plan: &ExportPlan, tools: &Toolchain) -> Cmd {
    let quality = plan.quality.to_string();
    let cmd = Cmd::new(&tools.encoder);

    match plan.format {
        ExportFormat::Jpg => cmd
            .arg("-quality")
            .arg(&quality)
            .arg("-density")
            .arg(plan.density.to_string())
            .arg(raster.path())
            .args(["-interlace", "None"])
            .arg(&plan.output),
        ExportFormat::Webp => cmd
            .arg(raster.path())
            .arg("-quality")
            .arg(&quality)
            .args(["-define", "webp:lossless=true"])
            .arg(&plan.output),
    }
}

/// Encode `raster` into the plan's output file.
pub fn encode(
    raster: &IntermediateRaster,
    plan: &ExportPlan,
    tools: &Toolchain,
    runner: &dyn Runner,
) -> Result<(), ExportError> {
    let cmd = command(raster, plan, tools);
    debug!("encode"; "{} q={} -> {}", plan.format.label(), plan.quality, plan.output.display());

    let output = runner.run(&cmd)?;
    if !output.success() {
        return Err(ExportError::Encode {
            program: cmd.program_name(),
            status: output.status_label(),
            diagnostics: output.diagnostics(),
        });
    }
    Ok(())
}
