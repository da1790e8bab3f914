//! [`DocumentContext`] backed by a `usvg` tree.
//!
//! The file is read eagerly (so a missing input fails early) but parsed on
//! first use: a page export never needs node geometry.

use super::{DocumentContext, DocumentError, NodeBounds};
use std::{
    cell::OnceCell,
    fs,
    path::{Path, PathBuf},
};
use usvg::Tree;

#[derive(Debug)]
pub struct SvgDocument {
    path: PathBuf,
    data: Vec<u8>,
    selection: Vec<String>,
    tree: OnceCell<Tree>,
}

impl SvgDocument {
    /// Read the document at `path` with the given selection.
    pub fn open(path: &Path, selection: Vec<String>) -> Result<Self, DocumentError> {
        let data = fs::read(path).map_err(|err| DocumentError::Io(path.to_path_buf(), err))?;
        Ok(Self::from_data(path, data, selection))
    }

    /// Wrap already loaded SVG bytes.
    pub fn from_data(path: &Path, data: Vec<u8>, selection: Vec<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            data,
            selection,
            tree: OnceCell::new(),
        }
    }

    /// Raw document bytes, as read from disk.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn tree(&self) -> Result<&Tree, DocumentError> {
        if let Some(tree) = self.tree.get() {
            return Ok(tree);
        }

        let options = usvg::Options {
            resources_dir: self.path.parent().map(Path::to_path_buf),
            ..usvg::Options::default()
        };
        let tree = Tree::from_data(&self.data, &options)
            .map_err(|err| DocumentError::Parse(self.path.clone(), err))?;
        Ok(self.tree.get_or_init(|| tree))
    }
}

impl DocumentContext for SvgDocument {
    fn source_path(&self) -> &Path {
        &self.path
    }

    fn page_height(&self) -> Result<f64, DocumentError> {
        Ok(f64::from(self.tree()?.size().height()))
    }

    fn node_bounds(&self, id: &str) -> Result<Option<NodeBounds>, DocumentError> {
        let bounds = self.tree()?.node_by_id(id).map(|node| {
            let rect = node.abs_bounding_box();
            NodeBounds::new(
                f64::from(rect.x()),
                f64::from(rect.y()),
                f64::from(rect.width()),
                f64::from(rect.height()),
            )
        });
        Ok(bounds)
    }

    fn selection(&self) -> &[String] {
        &self.selection
    }
}
