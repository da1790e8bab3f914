//! Bounding box measured by the external query CLI.
//!
//! Spawns one process per node and property (`4 × |selection|` in total).
//! Each answer is converted to pixels and rounded up before it is combined,
//! so fractional geometry can come out one pixel wider than [`InMemory`].
//!
//! [`InMemory`]: super::InMemory

use super::{BoundingBox, BoundingBoxStrategy, BoundsError};
use crate::document::DocumentContext;
use crate::utils::{
    exec::{Cmd, Runner},
    units,
};
use crate::debug;
use std::path::Path;

/// Queried properties, in query order.
const PROPERTIES: [&str; 4] = ["x", "y", "width", "height"];

/// Queries node geometry through `<program> --query-*`.
pub struct ExternalQuery<'a> {
    runner: &'a dyn Runner,
    program: String,
}

impl<'a> ExternalQuery<'a> {
    pub fn new(runner: &'a dyn Runner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Query one property of one node, in whole pixels (rounded up).
    fn query(&self, source: &Path, id: &str, property: &'static str) -> Result<f64, BoundsError> {
        let cmd = Cmd::new(&self.program)
            .arg("--without-gui")
            .arg(format!("--query-id={id}"))
            .arg(format!("--query-{property}"))
            .arg(source);

        let output = self.runner.run(&cmd)?;
        if !output.success() {
            return Err(BoundsError::Query {
                program: self.program.clone(),
                id: id.to_string(),
                property,
                status: output.status_label(),
                diagnostics: output.diagnostics(),
            });
        }

        Ok(units::to_pixels(&output.stdout)?.ceil())
    }
}

/// Running union in export coordinates.
#[derive(Debug, Default)]
struct Accumulator {
    start_x: Option<f64>,
    start_y: Option<f64>,
    end_x: Option<f64>,
    end_y: Option<f64>,
}

impl Accumulator {
    fn add(&mut self, start_x: f64, start_y: f64, end_x: f64, end_y: f64) {
        self.start_x = Some(self.start_x.map_or(start_x, |v| v.min(start_x)));
        self.start_y = Some(self.start_y.map_or(start_y, |v| v.min(start_y)));
        self.end_x = Some(self.end_x.map_or(end_x, |v| v.max(end_x)));
        self.end_y = Some(self.end_y.map_or(end_y, |v| v.max(end_y)));
    }

    fn finish(self) -> Option<BoundingBox> {
        Some(BoundingBox::truncated(
            self.start_x?,
            self.start_y?,
            self.end_x?,
            self.end_y?,
        ))
    }
}

impl BoundingBoxStrategy for ExternalQuery<'_> {
    fn resolve(
        &self,
        doc: &dyn DocumentContext,
        selection: &[String],
    ) -> Result<BoundingBox, BoundsError> {
        if selection.is_empty() {
            return Err(BoundsError::EmptySelection);
        }

        let page_height = doc.page_height()?;
        let source = doc.source_path();
        let mut acc = Accumulator::default();

        for id in selection {
            let mut values = [0.0; 4];
            for (value, property) in values.iter_mut().zip(PROPERTIES) {
                *value = self.query(source, id, property)?;
            }
            let [x, y, width, height] = values;

            acc.add(x, page_height - y - height, x + width, page_height - y);
        }

        let area = acc.finish().ok_or(BoundsError::EmptySelection)?;
        debug!("bounds"; "queried {} node(s) -> {}", selection.len(), area);
        Ok(area)
    }
}
