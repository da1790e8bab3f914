//! End-to-end pipeline tests with scripted external tools.

use super::rasterize::IntermediateRaster;
use super::*;
use crate::document::{NodeBounds, mock::MockDocument};
use crate::utils::testing::{ScriptedRunner, failed, ok};
use std::fs;
use tempfile::TempDir;

struct Fixture {
    out_dir: TempDir,
    tmp_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            out_dir: TempDir::new().unwrap(),
            tmp_dir: TempDir::new().unwrap(),
        }
    }

    fn options(&self, file: &str) -> ExportOptions {
        ExportOptions {
            output_path: self.out_dir.path().join(file).to_string_lossy().into_owned(),
            quality: 80,
            ..ExportOptions::default()
        }
    }

    fn tools(&self) -> Toolchain {
        Toolchain {
            temp_dir: Some(self.tmp_dir.path().to_path_buf()),
            ..Toolchain::default()
        }
    }
}

/// Runner whose rasterizer writes the intermediate PNG into `tmp_dir` and
/// whose encoder exits with `encoder_code`.
fn writing_runner(tmp_dir: &std::path::Path, encoder_code: i32) -> ScriptedRunner {
    let tmp_dir = tmp_dir.to_path_buf();
    ScriptedRunner::new(move |cmd| {
        if cmd.program_name() == "inkscape" {
            let raster = IntermediateRaster::for_process(Some(tmp_dir.as_path()));
            fs::write(raster.path(), b"png").unwrap();
            ok("")
        } else if encoder_code == 0 {
            ok("")
        } else {
            failed(encoder_code, "convert: improper image header")
        }
    })
}

/// A 100x100 square at the origin of a 100px-high page: area `0:0:100:100`.
fn square_doc() -> MockDocument {
    MockDocument::new(100.0).with_node("rect1", NodeBounds::new(0.0, 0.0, 100.0, 100.0))
}

#[test]
fn test_area_export_runs_rasterizer_then_encoder() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = ScriptedRunner::succeeding();

    let report = run_export(&fx.options("out.jpg"), &doc, &fx.tools(), &runner).unwrap();

    assert_eq!(runner.programs(), ["inkscape", "convert"]);
    assert_eq!(report.area, Some(BoundingBox::new(0, 0, 100, 100)));
    assert_eq!(report.output, fx.out_dir.path().join("out.jpg"));

    let raster_args = runner.args_of(0);
    assert_eq!(raster_args[0], "--export-area=0:0:100:100");
    assert_eq!(raster_args[1], "--export-dpi=90");
    assert_eq!(raster_args[3], "--export-background=#ffffff");
    assert_eq!(raster_args[4], "drawing.svg");

    let encode_args = runner.args_of(1);
    assert_eq!(encode_args[..2], ["-quality", "80"]);
    assert_eq!(
        encode_args.last().unwrap(),
        &fx.out_dir.path().join("out.jpg").to_string_lossy()
    );
}

#[test]
fn test_rasterizer_and_encoder_share_intermediate() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = ScriptedRunner::succeeding();

    run_export(&fx.options("out.jpg"), &doc, &fx.tools(), &runner).unwrap();

    let png_arg = runner.args_of(0)[2].clone();
    let png = png_arg.strip_prefix("--export-png=").unwrap();
    assert!(png.starts_with(&*fx.tmp_dir.path().to_string_lossy()));
    assert!(runner.args_of(1).iter().any(|a| a == png));
}

#[test]
fn test_rasterize_failure_skips_encoder() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = ScriptedRunner::new(|cmd| {
        if cmd.program_name() == "inkscape" {
            failed(1, "** (inkscape): CRITICAL **: export failed")
        } else {
            ok("")
        }
    });

    let err = run_export(&fx.options("out.jpg"), &doc, &fx.tools(), &runner).unwrap_err();

    assert!(matches!(err, ExportError::Rasterize { .. }));
    assert!(err.to_string().contains("export failed"));
    assert_eq!(runner.programs(), ["inkscape"]);
}

#[test]
fn test_encode_failure_is_reported() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = ScriptedRunner::new(|cmd| {
        if cmd.program_name() == "convert" {
            failed(1, "convert: no encode delegate for this image format")
        } else {
            ok("")
        }
    });

    let err = run_export(&fx.options("out.jpg"), &doc, &fx.tools(), &runner).unwrap_err();

    assert!(matches!(err, ExportError::Encode { .. }));
    assert_eq!(runner.programs(), ["inkscape", "convert"]);
}

#[test]
fn test_validation_failure_spawns_nothing() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = ScriptedRunner::succeeding();
    let options = ExportOptions {
        background: "red".into(),
        ..fx.options("out.jpg")
    };

    let err = run_export(&options, &doc, &fx.tools(), &runner).unwrap_err();

    assert!(matches!(
        err,
        ExportError::Validation(ValidationError::InvalidColor(_))
    ));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_page_export_skips_bounds() {
    let fx = Fixture::new();
    let doc = MockDocument::new(100.0);
    let runner = ScriptedRunner::succeeding();
    let options = ExportOptions {
        whole_page: true,
        ..fx.options("page.jpeg")
    };

    let report = run_export(&options, &doc, &fx.tools(), &runner).unwrap();

    assert_eq!(report.area, None);
    assert_eq!(runner.programs(), ["inkscape", "convert"]);
    assert_eq!(runner.args_of(0)[0], "--export-area-page");
}

#[test]
fn test_webp_export_checks_encoder_then_omits_background() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = ScriptedRunner::new(|cmd| {
        if cmd.get_args().iter().any(|a| a == "-list") {
            ok("WEBP* WEBP rw- WebP Image Format")
        } else {
            ok("")
        }
    });
    let options = ExportOptions {
        format: ExportFormat::Webp,
        ..fx.options("out.webp")
    };

    run_export(&options, &doc, &fx.tools(), &runner).unwrap();

    assert_eq!(runner.programs(), ["convert", "inkscape", "convert"]);
    assert!(
        !runner
            .args_of(1)
            .iter()
            .any(|a| a.starts_with("--export-background"))
    );
    assert!(runner.args_of(2).contains(&"webp:lossless=true".to_string()));
}

#[test]
fn test_slow_strategy_queries_before_rasterizing() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = ScriptedRunner::new(|cmd| {
        let args: Vec<_> = cmd.get_args().iter().map(|a| a.to_string_lossy()).collect();
        if args.iter().any(|a| a.starts_with("--query-id")) {
            let value = if args.iter().any(|a| a == "--query-width" || a == "--query-height") {
                "100"
            } else {
                "0"
            };
            ok(value)
        } else {
            ok("")
        }
    });
    let options = ExportOptions {
        fast: false,
        ..fx.options("out.jpg")
    };

    let report = run_export(&options, &doc, &fx.tools(), &runner).unwrap();

    assert_eq!(report.area, Some(BoundingBox::new(0, 0, 100, 100)));
    assert_eq!(runner.calls().len(), 6);
    assert_eq!(runner.programs()[4..], ["inkscape", "convert"]);
}

#[test]
fn test_intermediate_removed_after_success() {
    let fx = Fixture::new();
    let doc = square_doc();
    let tmp_dir = fx.tmp_dir.path().to_path_buf();
    let runner = ScriptedRunner::new(move |cmd| {
        if cmd.program_name() == "inkscape" {
            let raster = IntermediateRaster::for_process(Some(tmp_dir.as_path()));
            fs::write(raster.path(), b"png").unwrap();
        }
        ok("")
    });

    run_export(&fx.options("out.jpg"), &doc, &fx.tools(), &runner).unwrap();

    let raster = IntermediateRaster::for_process(Some(fx.tmp_dir.path()));
    assert!(!raster.path().exists());
}

#[test]
fn test_intermediate_kept_on_request() {
    let fx = Fixture::new();
    let doc = square_doc();
    let tmp_dir = fx.tmp_dir.path().to_path_buf();
    let runner = ScriptedRunner::new(move |cmd| {
        if cmd.program_name() == "inkscape" {
            let raster = IntermediateRaster::for_process(Some(tmp_dir.as_path()));
            fs::write(raster.path(), b"png").unwrap();
        }
        ok("")
    });
    let tools = Toolchain {
        keep_intermediate: true,
        ..fx.tools()
    };

    run_export(&fx.options("out.jpg"), &doc, &tools, &runner).unwrap();

    let raster = IntermediateRaster::for_process(Some(fx.tmp_dir.path()));
    assert!(raster.path().exists());
}

#[test]
fn test_intermediate_removed_after_failed_encode() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = writing_runner(fx.tmp_dir.path(), 1);

    let err = run_export(&fx.options("out.jpg"), &doc, &fx.tools(), &runner).unwrap_err();

    assert!(matches!(err, ExportError::Encode { .. }));
    let raster = IntermediateRaster::for_process(Some(fx.tmp_dir.path()));
    assert!(!raster.path().exists());
}

#[test]
fn test_intermediate_kept_after_failed_encode_on_request() {
    let fx = Fixture::new();
    let doc = square_doc();
    let runner = writing_runner(fx.tmp_dir.path(), 1);
    let tools = Toolchain {
        keep_intermediate: true,
        ..fx.tools()
    };

    run_export(&fx.options("out.jpg"), &doc, &tools, &runner).unwrap_err();

    let raster = IntermediateRaster::for_process(Some(fx.tmp_dir.path()));
    assert!(raster.path().exists());
}

#[test]
fn test_partial_raster_removed_after_failed_rasterize() {
    let fx = Fixture::new();
    let doc = square_doc();
    let tmp_dir = fx.tmp_dir.path().to_path_buf();
    let runner = ScriptedRunner::new(move |cmd| {
        if cmd.program_name() == "inkscape" {
            let raster = IntermediateRaster::for_process(Some(tmp_dir.as_path()));
            fs::write(raster.path(), b"partial").unwrap();
            failed(1, "** (inkscape): CRITICAL **: out of memory")
        } else {
            ok("")
        }
    });

    let err = run_export(&fx.options("out.jpg"), &doc, &fx.tools(), &runner).unwrap_err();

    assert!(matches!(err, ExportError::Rasterize { .. }));
    assert_eq!(runner.programs(), ["inkscape"]);
    let raster = IntermediateRaster::for_process(Some(fx.tmp_dir.path()));
    assert!(!raster.path().exists());
}

#[test]
fn test_unremovable_intermediate_does_not_fail_export() {
    let fx = Fixture::new();
    let doc = square_doc();
    let tmp_dir = fx.tmp_dir.path().to_path_buf();
    // a directory in place of the PNG cannot be removed with remove_file
    let runner = ScriptedRunner::new(move |cmd| {
        if cmd.program_name() == "inkscape" {
            let raster = IntermediateRaster::for_process(Some(tmp_dir.as_path()));
            fs::create_dir(raster.path()).unwrap();
        }
        ok("")
    });

    let report = run_export(&fx.options("out.jpg"), &doc, &fx.tools(), &runner).unwrap();

    assert_eq!(runner.programs(), ["inkscape", "convert"]);
    assert_eq!(report.output, fx.out_dir.path().join("out.jpg"));
    assert_eq!(report.area, Some(BoundingBox::new(0, 0, 100, 100)));
}
