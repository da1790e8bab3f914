//! Bounding-box resolution for area exports.
//!
//! Turns a selection of node ids into the pixel rectangle handed to the
//! rasterizer. Two interchangeable strategies exist:
//!
//! - [`InMemory`]: unions node geometry straight from the parsed document.
//! - [`ExternalQuery`]: asks the rasterizer's query mode for every node and
//!   property, for documents the in-memory model cannot measure.
//!
//! # Output coordinates
//!
//! The export area uses a y axis that grows upwards from the bottom of the
//! page, so a node's top edge `y` becomes `page_height - y`. Values are
//! rounded outwards with `ceil` and then truncated to integers.

mod memory;
mod query;

pub use memory::InMemory;
pub use query::ExternalQuery;

use crate::document::{DocumentContext, DocumentError};
use crate::utils::{exec::ExecError, units::UnitConversionError};
use std::fmt;
use thiserror::Error;

/// Errors raised while resolving a bounding box.
#[derive(Debug, Error)]
pub enum BoundsError {
    #[error("Please select something")]
    EmptySelection,

    #[error("No measurable element with id `{0}` in the document, try `--fast=false`")]
    NodeNotFound(String),

    #[error(transparent)]
    UnitConversion(#[from] UnitConversionError),

    #[error("Querying `{property}` of `{id}` with `{program}` failed with {status}\n{diagnostics}")]
    Query {
        program: String,
        id: String,
        property: &'static str,
        status: String,
        diagnostics: String,
    },

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Export area in raster pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl BoundingBox {
    pub const fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Truncate floating-point coordinates toward zero.
    #[allow(clippy::cast_possible_truncation)]
    fn truncated(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0 as i64, y0 as i64, x1 as i64, y1 as i64)
    }
}

impl fmt::Display for BoundingBox {
    /// `x0:y0:x1:y1`, the rasterizer's area syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.x0, self.y0, self.x1, self.y1)
    }
}

/// Strategy for measuring a selection.
pub trait BoundingBoxStrategy {
    fn resolve(
        &self,
        doc: &dyn DocumentContext,
        selection: &[String],
    ) -> Result<BoundingBox, BoundsError>;
}

/// Which [`BoundingBoxStrategy`] an export uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyKind {
    /// Measure from the parsed document.
    #[default]
    InMemory,
    /// Query the external tool per node and property.
    ExternalQuery,
}

impl StrategyKind {
    /// `true` selects the in-memory strategy, `false` the external query.
    pub const fn from_fast(fast: bool) -> Self {
        if fast {
            Self::InMemory
        } else {
            Self::ExternalQuery
        }
    }
}
