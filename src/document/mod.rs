//! Read-only view of the drawing being exported.
//!
//! The export pipeline never touches the SVG tree directly. It goes through
//! [`DocumentContext`], which exposes exactly what bounding-box resolution
//! and planning need: the source file, the page height, node geometry and
//! the user's selection.
//!
//! # Coordinates
//!
//! All lengths are pixels (96 per inch). Node bounds are absolute, with every
//! ancestor transform applied, and use the SVG convention of a y axis that
//! grows downwards.

mod svg;

pub use svg::SvgDocument;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the source document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse SVG `{}`", .0.display())]
    Parse(PathBuf, #[source] usvg::Error),
}

/// Axis-aligned extent of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest bounds containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Capabilities the exporter needs from the host document.
pub trait DocumentContext {
    /// File on disk the document was loaded from.
    fn source_path(&self) -> &Path;

    /// Page height in pixels.
    fn page_height(&self) -> Result<f64, DocumentError>;

    /// Absolute bounds of the node with `id`, `None` if there is no such node.
    fn node_bounds(&self, id: &str) -> Result<Option<NodeBounds>, DocumentError>;

    /// Selected node ids, in selection order.
    fn selection(&self) -> &[String];
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        let a = NodeBounds::new(0.0, 0.0, 100.0, 100.0);
        let b = NodeBounds::new(-10.0, -10.0, 50.0, 50.0);

        let m = a.union(&b);
        assert_eq!(m.x, -10.0);
        assert_eq!(m.y, -10.0);
        assert_eq!(m.right(), 100.0);
        assert_eq!(m.bottom(), 100.0);
    }

    #[test]
    fn test_union_disjoint() {
        let a = NodeBounds::new(10.0, 20.0, 5.0, 5.0);
        let b = NodeBounds::new(40.0, 0.0, 10.0, 10.0);
        assert_eq!(a.union(&b), NodeBounds::new(10.0, 0.0, 40.0, 25.0));
    }
}
