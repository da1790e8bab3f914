//! In-memory bounding box from the parsed document.

use super::{BoundingBox, BoundingBoxStrategy, BoundsError};
use crate::document::{DocumentContext, NodeBounds};
use crate::debug;

/// Unions node geometry from the [`DocumentContext`], no processes spawned.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemory;

impl BoundingBoxStrategy for InMemory {
    fn resolve(
        &self,
        doc: &dyn DocumentContext,
        selection: &[String],
    ) -> Result<BoundingBox, BoundsError> {
        let mut union: Option<NodeBounds> = None;
        for id in selection {
            let bounds = doc
                .node_bounds(id)?
                .ok_or_else(|| BoundsError::NodeNotFound(id.clone()))?;
            union = Some(match union {
                Some(acc) => acc.union(&bounds),
                None => bounds,
            });
        }
        let union = union.ok_or(BoundsError::EmptySelection)?;

        let page_height = doc.page_height()?;
        let area = flip(&union, page_height);
        debug!("bounds"; "{} node(s) -> {}", selection.len(), area);
        Ok(area)
    }
}

/// Convert a top-down union into the export area.
///
/// `ceil` is applied to the minimum y before the height offset is derived,
/// so a fractional height shifts `y0` but never `y1`.
fn flip(union: &NodeBounds, page_height: f64) -> BoundingBox {
    let x0 = union.x.ceil();
    let x1 = union.right().ceil();
    let h = union.bottom() - union.y;
    let y1 = page_height - union.y.ceil();
    let y0 = y1 - h;
    BoundingBox::truncated(x0, y0, x1, y1)
}
