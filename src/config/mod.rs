//! Configuration management for `jpegexport.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                              |
//! |------------|------------------------------------------------------|
//! | `[export]` | Defaults for the export dialog (bgcol, quality, ...) |
//! | `[tools]`  | External programs, scratch directory                 |
//!
//! Values are layered: built-in defaults, then the config file, then CLI
//! flags.
//!
//! ```toml
//! [export]
//! bgcol = "#f0f0f0"
//! quality = 92
//! density = 150
//! ftype = "jpg"
//!
//! [tools]
//! encoder = "magick"
//! temp_dir = "~/.cache/jpegexport"
//! ```

mod error;
mod util;

pub use error::ConfigError;
use util::find_config_file;

use crate::{
    cli::Cli,
    debug,
    export::{ExportFormat, ExportOptions, Toolchain},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File name searched for when `--config` is not given.
pub const CONFIG_FILE: &str = "jpegexport.toml";

// ============================================================================
// sections
// ============================================================================

/// `[export]` section: defaults for the export options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub bgcol: String,
    pub quality: u32,
    pub density: u32,
    pub page: bool,
    pub fast: bool,
    pub ftype: ExportFormat,
}

impl Default for ExportSection {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self {
            bgcol: options.background,
            quality: u32::from(options.quality),
            density: options.density,
            page: options.whole_page,
            fast: options.fast,
            ftype: options.format,
        }
    }
}

/// `[tools]` section: external programs and scratch space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub rasterizer: String,
    /// Detected on PATH when unset.
    pub encoder: Option<String>,
    pub query: String,
    pub temp_dir: Option<PathBuf>,
    pub keep_intermediate: bool,
}

impl Default for ToolsSection {
    fn default() -> Self {
        let tools = Toolchain::default();
        Self {
            rasterizer: tools.rasterizer,
            encoder: None,
            query: tools.query,
            temp_dir: None,
            keep_intermediate: tools.keep_intermediate,
        }
    }
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing jpegexport.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path to the config file, empty when none was found
    #[serde(skip)]
    pub config_path: PathBuf,

    pub export: ExportSection,
    pub tools: ToolsSection,
}

impl Config {
    /// Load configuration for a CLI invocation.
    ///
    /// An explicit `--config` must exist. Otherwise the nearest
    /// `jpegexport.toml` above the cwd is used, and built-in defaults apply
    /// when there is none.
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = match &cli.config {
            Some(path) => Some(path.clone()),
            None => find_config_file(Path::new(CONFIG_FILE)),
        };

        let mut config = match path {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                debug!("config"; "loaded {}", config.config_path.display());
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };

        config.validate()?;
        config.expand_paths();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let (config, _) = Self::parse_with_ignored(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {}, ignoring: {}", path.display(), fields.join(", "));
    }

    /// Range checks the types alone do not enforce.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.export.quality > 100 {
            return Err(ConfigError::Validation(format!(
                "[export] quality must be between 0 and 100, got {}",
                self.export.quality
            )));
        }
        if self.export.density == 0 {
            return Err(ConfigError::Validation(
                "[export] density must be at least 1".to_string(),
            ));
        }
        for (key, program) in [
            ("rasterizer", Some(&self.tools.rasterizer)),
            ("encoder", self.tools.encoder.as_ref()),
            ("query", Some(&self.tools.query)),
        ] {
            if program.is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "[tools] {key} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Expand `~` in configured paths.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.tools.temp_dir {
            let expanded = shellexpand::tilde(&dir.to_string_lossy()).into_owned();
            self.tools.temp_dir = Some(PathBuf::from(expanded));
        }
    }

    // ========================================================================
    // CLI merge
    // ========================================================================

    /// Export options: config values overridden by CLI flags.
    pub fn export_options(&self, cli: &Cli) -> ExportOptions {
        let section = &self.export;
        let mut options = ExportOptions {
            output_path: String::new(),
            background: section.bgcol.clone(),
            // validated to be at most 100
            quality: u8::try_from(section.quality).unwrap_or(100),
            density: section.density,
            whole_page: section.page,
            fast: section.fast,
            format: section.ftype,
        };

        Self::update_option(&mut options.output_path, cli.path.as_ref());
        Self::update_option(&mut options.background, cli.background().map(str::to_string).as_ref());
        Self::update_option(&mut options.quality, cli.quality.as_ref());
        Self::update_option(&mut options.density, cli.density.as_ref());
        Self::update_option(&mut options.whole_page, cli.page.as_ref());
        Self::update_option(&mut options.fast, cli.fast.as_ref());
        Self::update_option(&mut options.format, cli.ftype.as_ref());
        options
    }

    /// External programs, with the encoder detected on PATH when unset.
    pub fn toolchain(&self, cli: &Cli) -> Toolchain {
        let tools = &self.tools;
        Toolchain {
            rasterizer: tools.rasterizer.clone(),
            encoder: tools.encoder.clone().unwrap_or_else(default_encoder),
            query: tools.query.clone(),
            temp_dir: tools.temp_dir.clone(),
            keep_intermediate: tools.keep_intermediate || cli.keep_intermediate,
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

/// ImageMagick 7 ships `magick`; older installs only have `convert`.
fn default_encoder() -> String {
    match which::which("magick") {
        Ok(_) => "magick".to_string(),
        Err(_) => "convert".to_string(),
    }
}
