//! End-to-end runs of the tree optimizer against a fake converter.
//!
//! The fake stores textures as plain PNG bytes behind a `.vtf` extension:
//! exporting copies the file, importing writes a solid image at the planned
//! size. That keeps every filesystem step real while avoiding vtfcmd.

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vtf_texture_optimizer::file_manager::SCRATCH_PREFIX;
use vtf_texture_optimizer::optimizer::{TextureOutcome, TextureStage};
use vtf_texture_optimizer::vtfcmd::output_path_for;
use vtf_texture_optimizer::{
    Config, OptimizationPlan, OptimizeError, ResolutionLimit, ResolutionLimits, Role, TextureConverter,
    TreeOptimizer,
};

#[derive(Default)]
struct FakeConverter {
    /// Stems whose import fails
    fail_import: Vec<String>,
}

impl FakeConverter {
    fn failing_import(stem: &str) -> Self {
        Self { fail_import: vec![stem.to_string()] }
    }
}

impl TextureConverter for FakeConverter {
    async fn export_png(&self, texture: &Path, output_dir: &Path) -> Result<PathBuf, OptimizeError> {
        let png = output_path_for(texture, output_dir, "png")?;
        tokio::fs::copy(texture, &png).await?;
        Ok(png)
    }

    async fn import_vtf(&self, png: &Path, output_dir: &Path, plan: &OptimizationPlan) -> Result<PathBuf, OptimizeError> {
        let stem = png.file_stem().unwrap().to_string_lossy().into_owned();
        if self.fail_import.contains(&stem) {
            return Err(OptimizeError::Conversion {
                path: png.to_path_buf(),
                reason: "simulated encoder crash".to_string(),
            });
        }

        let vtf = output_path_for(png, output_dir, "vtf")?;
        solid_image(plan.target_width, plan.target_height, plan.use_alpha)
            .save_with_format(&vtf, image::ImageFormat::Png)
            .map_err(|e| OptimizeError::Conversion { path: png.to_path_buf(), reason: e.to_string() })?;
        Ok(vtf)
    }
}

fn solid_image(width: u32, height: u32, alpha: bool) -> DynamicImage {
    if alpha {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 128])))
    } else {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 90, 90])))
    }
}

fn write_texture(path: &Path, width: u32, height: u32, alpha: bool) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    solid_image(width, height, alpha)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

fn read_texture(path: &Path) -> DynamicImage {
    image::io::Reader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap()
}

fn test_config(diffuse: u32, normal: u32) -> Config {
    Config {
        limits: ResolutionLimits {
            diffuse: ResolutionLimit::new(diffuse, diffuse),
            normal: ResolutionLimit::new(normal, normal),
            ..ResolutionLimits::unbounded()
        },
        show_progress: false,
        ..Default::default()
    }
}

fn scratch_dirs_left(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(SCRATCH_PREFIX))
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

#[tokio::test]
async fn test_resizes_each_role_to_its_limit() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_texture(&root.join("wall_diffuse.vtf"), 4096, 4096, false);
    write_texture(&root.join("wall_n.vtf"), 2048, 2048, false);

    let optimizer = TreeOptimizer::new(test_config(2048, 1024), FakeConverter::default()).unwrap();
    let summary = optimizer.run(root).await;

    assert!(!summary.report.has_failures());
    assert!(summary.saved_mb() > 0.0);

    let diffuse = summary.report.find("wall_diffuse.vtf").unwrap();
    assert_eq!(diffuse.role, Role::Diffuse);
    assert_eq!(diffuse.stage, TextureStage::Reencoded);
    assert!(matches!(diffuse.outcome, TextureOutcome::Optimized { .. }));
    let plan = diffuse.plan.unwrap();
    assert_eq!((plan.target_width, plan.target_height), (2048, 2048));
    assert!(!plan.use_alpha);

    let normal = summary.report.find("wall_n.vtf").unwrap();
    assert_eq!(normal.role, Role::Normal);
    assert!(matches!(normal.outcome, TextureOutcome::Optimized { .. }));
    assert!(!normal.plan.unwrap().use_alpha);

    assert_eq!(read_texture(&root.join("wall_diffuse.vtf")).dimensions(), (2048, 2048));
    assert_eq!(read_texture(&root.join("wall_n.vtf")).dimensions(), (1024, 1024));
    assert!(scratch_dirs_left(root).is_empty());
}

#[tokio::test]
async fn test_second_run_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_texture(&root.join("floor.vtf"), 512, 256, false);
    write_texture(&root.join("floor_normal.vtf"), 256, 256, false);

    let optimizer = TreeOptimizer::new(test_config(256, 128), FakeConverter::default()).unwrap();
    let first = optimizer.run(root).await;
    assert_eq!(first.report.stats.files_optimized, 2);

    let before = std::fs::read(root.join("floor.vtf")).unwrap();
    let second = optimizer.run(root).await;

    assert!(!second.report.has_failures());
    assert_eq!(second.saved_mb(), 0.0);
    assert_eq!(second.report.stats.files_optimized, 0);
    assert!(second
        .report
        .textures
        .iter()
        .all(|texture| matches!(texture.outcome, TextureOutcome::Unchanged { .. })));
    assert_eq!(std::fs::read(root.join("floor.vtf")).unwrap(), before);
}

#[tokio::test]
async fn test_translucent_texture_keeps_alpha() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_texture(&root.join("glass.vtf"), 512, 512, true);

    let optimizer = TreeOptimizer::new(test_config(256, 128), FakeConverter::default()).unwrap();
    let summary = optimizer.run(root).await;

    let glass = summary.report.find("glass.vtf").unwrap();
    assert!(glass.metadata.unwrap().has_significant_alpha);
    assert!(glass.plan.unwrap().use_alpha);
    assert!(read_texture(&root.join("glass.vtf")).color().has_alpha());
}

#[tokio::test]
async fn test_decode_failure_does_not_stop_siblings() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    std::fs::write(root.join("broken.vtf"), b"definitely not an image").unwrap();
    write_texture(&root.join("rock.vtf"), 512, 512, false);

    let optimizer = TreeOptimizer::new(test_config(256, 128), FakeConverter::default()).unwrap();
    let summary = optimizer.run(root).await;

    assert_eq!(summary.report.failure_count(), 1);
    let broken = summary.report.find("broken.vtf").unwrap();
    match &broken.outcome {
        TextureOutcome::Failed { stage, error } => {
            assert_eq!(*stage, TextureStage::Classified);
            assert_eq!(error.kind(), "decode");
        }
        other => panic!("expected a decode failure, got {:?}", other),
    }
    assert_eq!(std::fs::read(root.join("broken.vtf")).unwrap(), b"definitely not an image");

    let rock = summary.report.find("rock.vtf").unwrap();
    assert!(matches!(rock.outcome, TextureOutcome::Optimized { .. }));
    assert!(scratch_dirs_left(root).is_empty());
}

#[tokio::test]
async fn test_conversion_failure_keeps_original() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_texture(&root.join("crate_spec.vtf"), 512, 512, false);
    let original = std::fs::read(root.join("crate_spec.vtf")).unwrap();

    let optimizer = TreeOptimizer::new(test_config(256, 128), FakeConverter::failing_import("crate_spec")).unwrap();
    let summary = optimizer.run(root).await;

    let report = summary.report.find("crate_spec.vtf").unwrap();
    assert_eq!(report.role, Role::Specular);
    match &report.outcome {
        TextureOutcome::Failed { stage, error } => {
            assert_eq!(*stage, TextureStage::Planned);
            assert_eq!(error.kind(), "conversion");
        }
        other => panic!("expected a conversion failure, got {:?}", other),
    }
    assert_eq!(std::fs::read(root.join("crate_spec.vtf")).unwrap(), original);
    assert_eq!(summary.saved_mb(), 0.0);
    assert!(scratch_dirs_left(root).is_empty());
}

#[tokio::test]
async fn test_dry_run_does_not_touch_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_texture(&root.join("metal.vtf"), 512, 256, false);
    let original = std::fs::read(root.join("metal.vtf")).unwrap();

    let config = Config { dry_run: true, ..test_config(256, 128) };
    let optimizer = TreeOptimizer::new(config, FakeConverter::default()).unwrap();
    let summary = optimizer.run(root).await;

    let metal = summary.report.find("metal.vtf").unwrap();
    assert!(matches!(metal.outcome, TextureOutcome::Planned));
    let plan = metal.plan.unwrap();
    assert_eq!((plan.target_width, plan.target_height), (256, 128));
    assert_eq!(summary.report.stats.files_planned, 1);
    assert_eq!(std::fs::read(root.join("metal.vtf")).unwrap(), original);
    assert_eq!(summary.saved_mb(), 0.0);
}

#[tokio::test]
async fn test_folder_textures_before_subfolders() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_texture(&root.join("a_sub").join("inner.vtf"), 64, 64, false);
    write_texture(&root.join("z_top.vtf"), 64, 64, false);
    std::fs::write(root.join("readme.txt"), b"not a texture").unwrap();

    let optimizer = TreeOptimizer::new(test_config(256, 128), FakeConverter::default()).unwrap();
    let report = optimizer.optimize_folder(root).await;

    let names: Vec<String> = report.textures.iter().map(|t| t.file_name()).collect();
    assert_eq!(names, vec!["z_top.vtf", "inner.vtf"]);
}

#[tokio::test]
async fn test_measure_tree_size() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    std::fs::write(root.join("a.vtf"), vec![0u8; 1024 * 1024]).unwrap();
    std::fs::create_dir(root.join("sub")).unwrap();
    std::fs::write(root.join("sub").join("b.VTF"), vec![0u8; 512 * 1024]).unwrap();
    std::fs::write(root.join("sub").join("ignored.png"), vec![0u8; 4096]).unwrap();

    let optimizer = TreeOptimizer::new(Config { show_progress: false, ..Default::default() }, FakeConverter::default())
        .unwrap();
    assert_eq!(optimizer.measure_tree_size(root), 1.5);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = Config { size_threshold: 2.0, ..Default::default() };
    assert!(TreeOptimizer::new(config, FakeConverter::default()).is_err());
}

#[tokio::test]
async fn test_over_limit_texture_is_replaced_regardless_of_threshold() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_texture(&root.join("big.vtf"), 512, 512, false);
    write_texture(&root.join("small.vtf"), 64, 64, false);
    let small_before = std::fs::read(root.join("small.vtf")).unwrap();

    // No re-encode can shrink a file to a ten-thousandth of its size
    let config = Config { size_threshold: 0.0001, ..test_config(256, 128) };
    let optimizer = TreeOptimizer::new(config, FakeConverter::default()).unwrap();
    let summary = optimizer.run(root).await;

    let big = summary.report.find("big.vtf").unwrap();
    assert!(matches!(big.outcome, TextureOutcome::Optimized { .. }));
    assert_eq!(read_texture(&root.join("big.vtf")).dimensions(), (256, 256));

    let small = summary.report.find("small.vtf").unwrap();
    assert!(matches!(small.outcome, TextureOutcome::Unchanged { .. }));
    assert_eq!(std::fs::read(root.join("small.vtf")).unwrap(), small_before);
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_subtree_does_not_stop_siblings() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_texture(&root.join("props").join("barrel.vtf"), 512, 512, false);
    std::os::unix::fs::symlink(root.join("gone"), root.join("decals")).unwrap();

    let optimizer = TreeOptimizer::new(test_config(256, 128), FakeConverter::default()).unwrap();
    let summary = optimizer.run(root).await;

    assert_eq!(summary.report.traversal_failures.len(), 1);
    assert_eq!(summary.report.traversal_failures[0].kind(), "traversal");
    assert_eq!(summary.report.failure_count(), 1);
    assert!(summary.report.has_failures());

    let barrel = summary.report.find("barrel.vtf").unwrap();
    assert!(matches!(barrel.outcome, TextureOutcome::Optimized { .. }));
    assert_eq!(read_texture(&root.join("props").join("barrel.vtf")).dimensions(), (256, 256));
}
