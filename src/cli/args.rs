//! Command-line interface definitions.
//!
//! Inkscape invokes the extension as
//! `jpegexport --id=rect1 --id=path2 --path=~/out.jpg --quality=90 drawing.svg`,
//! so every value flag also accepts the `--flag=value` form. The boolean
//! flags only take a value after `=`, so a bare `--page` never consumes the
//! input path.

use crate::export::ExportFormat;
use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Export a selection or page of an SVG drawing to JPEG or WEBP
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Output file path (`~` is expanded)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub path: Option<String>,

    /// Background color as #rrggbb (empty uses the default)
    #[arg(long)]
    pub bgcol: Option<String>,

    /// Encoder quality (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Rasterization density in dpi
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub density: Option<u32>,

    /// Export the whole page instead of the selection
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub page: Option<bool>,

    /// Compute the selection area in-process instead of querying Inkscape
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub fast: Option<bool>,

    /// Output format
    #[arg(long, value_enum)]
    pub ftype: Option<ExportFormat>,

    /// Id of a selected node (repeatable)
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// Active notebook page of the extension dialog
    #[arg(long, hide = true)]
    pub tab: Option<String>,

    /// Config file path (default: search upward for jpegexport.toml)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Keep the intermediate PNG after a successful export
    #[arg(long)]
    pub keep_intermediate: bool,

    /// Copy the input document to stdout after exporting
    #[arg(long)]
    pub passthrough: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Input SVG document
    #[arg(value_name = "INPUT", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,
}

impl Cli {
    /// Background color override, treating an empty value as unset.
    pub fn background(&self) -> Option<&str> {
        self.bgcol.as_deref().filter(|c| !c.trim().is_empty())
    }
}
