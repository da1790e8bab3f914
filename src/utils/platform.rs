//! Platform-dependent locations.
//!
//! The intermediate PNG lives in the system temp directory under a name that
//! carries the process id, so two exports running at the same time never
//! write to the same file.

use std::path::{Path, PathBuf};

/// Default directory for the intermediate raster.
pub const TEMP_DIR: &str = {
    #[cfg(windows)]
    {
        "C:\\WINDOWS\\Temp"
    }

    #[cfg(not(windows))]
    {
        "/tmp"
    }
};

/// File name prefix of the intermediate raster.
const INTERMEDIATE_PREFIX: &str = "jpegexport";

/// Intermediate raster path for the current process.
///
/// Creates a path like `{dir}/jpegexport-{pid}.png`
pub fn intermediate_path(dir: Option<&Path>) -> PathBuf {
    intermediate_path_for(dir, std::process::id())
}

fn intermediate_path_for(dir: Option<&Path>, pid: u32) -> PathBuf {
    let dir = dir.unwrap_or_else(|| Path::new(TEMP_DIR));
    dir.join(format!("{INTERMEDIATE_PREFIX}-{pid}.png"))
}
