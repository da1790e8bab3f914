//! jpegexport - export a selection or page of an SVG drawing to JPEG or WEBP.

mod bounds;
mod cli;
mod config;
mod document;
mod export;
mod logger;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::Config;
use document::SvgDocument;
use export::{ExportReport, run_export};
use std::io::Write;
use utils::exec::SystemRunner;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        // owo-colors checks whether stderr is a terminal
        ColorChoice::Auto => {}
    }
    logger::set_verbose(cli.verbose);

    if let Err(err) = run(&cli) {
        log!("error"; "{}", error_message(&err));
        logger::status_error("export failed");
        std::process::exit(1);
    }
}

/// The error with every cause, e.g.
/// "Failed to parse `jpegexport.toml`: Config file parsing error: invalid type ...".
fn error_message(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(tab) = &cli.tab {
        debug!("cli"; "ignoring dialog page {tab}");
    }

    let config = Config::load(cli)?;
    let options = config.export_options(cli);
    let tools = config.toolchain(cli);

    let doc = SvgDocument::open(&cli.input, cli.ids.clone())?;
    let report = run_export(&options, &doc, &tools, &SystemRunner)?;
    report_success(&report);

    if cli.passthrough {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(doc.data())
            .and_then(|()| stdout.flush())
            .context("Failed to write document to stdout")?;
    }
    Ok(())
}

fn report_success(report: &ExportReport) {
    match report.area {
        Some(area) => logger::status_success(&format!(
            "exported {} to {}",
            area,
            report.output.display()
        )),
        None => logger::status_success(&format!("exported page to {}", report.output.display())),
    }
}
