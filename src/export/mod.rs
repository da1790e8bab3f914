//! The export pipeline.
//!
//! ```text
//! ExportOptions + selection
//!         │
//!         ▼
//!    ┌──────────┐
//!    │   plan   │ ──► validation, encoder capability check (webp)
//!    └────┬─────┘
//!         │ area mode only
//!         ▼
//!    ┌──────────┐
//!    │  bounds  │ ──► in-memory union or per-node queries
//!    └────┬─────┘
//!         ▼
//!    ┌───────────┐
//!    │ rasterize │ ──► intermediate PNG (Inkscape)
//!    └────┬──────┘
//!         ▼
//!    ┌──────────┐
//!    │  encode  │ ──► JPEG / WEBP (ImageMagick)
//!    └──────────┘
//! ```
//!
//! Stages run one at a time and the first failure ends the run. Nothing is
//! retried and no later stage starts after an error. The intermediate PNG is
//! removed whether or not encoding succeeds, unless it is explicitly kept.

mod encode;
mod error;
mod options;
mod plan;
mod rasterize;

#[cfg(test)]
mod tests;

pub use error::{ExportError, ValidationError};
pub use options::{ExportFormat, ExportOptions, Toolchain};
pub use plan::{ExportMode, ExportPlan};
pub use rasterize::RasterTarget;

use crate::bounds::{BoundingBox, BoundingBoxStrategy, ExternalQuery, InMemory, StrategyKind};
use crate::document::DocumentContext;
use crate::utils::exec::Runner;
use crate::log;
use std::path::PathBuf;

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// The encoded file.
    pub output: PathBuf,
    /// Exported area, `None` for a page export.
    pub area: Option<BoundingBox>,
}

/// Run one export end to end.
pub fn run_export(
    options: &ExportOptions,
    doc: &dyn DocumentContext,
    tools: &Toolchain,
    runner: &dyn Runner,
) -> Result<ExportReport, ExportError> {
    let plan = plan::validate(options, doc.selection(), tools, runner)?;

    let target = match plan.mode {
        ExportMode::Page => RasterTarget::Page,
        ExportMode::Area(kind) => {
            let area = strategy(kind, tools, runner).resolve(doc, doc.selection())?;
            RasterTarget::Area(area)
        }
    };

    log!("export"; "rasterizing {}", describe(target));
    let raster = rasterize::rasterize(target, doc.source_path(), &plan, tools, runner)?;

    log!("export"; "encoding {}", plan.format.label());
    let encoded = encode::encode(&raster, &plan, tools, runner);
    raster.release(tools.keep_intermediate);
    encoded?;

    Ok(ExportReport {
        output: plan.output,
        area: match target {
            RasterTarget::Area(area) => Some(area),
            RasterTarget::Page => None,
        },
    })
}

fn strategy<'a>(
    kind: StrategyKind,
    tools: &Toolchain,
    runner: &'a dyn Runner,
) -> Box<dyn BoundingBoxStrategy + 'a> {
    match kind {
        StrategyKind::InMemory => Box::new(InMemory),
        StrategyKind::ExternalQuery => Box::new(ExternalQuery::new(runner, tools.query.clone())),
    }
}

fn describe(target: RasterTarget) -> String {
    match target {
        RasterTarget::Area(area) => format!("area {area}"),
        RasterTarget::Page => "page".to_string(),
    }
}
