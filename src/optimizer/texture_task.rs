//! # Texture Task Module
//!
//! Worker per l'ottimizzazione di una singola texture.
//!
//! A texture moves through `Discovered -> Classified -> Inspected -> Planned
//! -> Reencoded`. A failure at any step ends that texture's chain and is
//! recorded in its [`TextureReport`]; it never affects sibling files.
//!
//! All intermediate files live in a scratch directory created next to the
//! texture, so the final rename over the original is atomic and an
//! interrupted run never leaves the original half-written.

use crate::{
    config::Config,
    error::OptimizeError,
    file_manager::{FileManager, SCRATCH_PREFIX},
    inspect::{inspect_file, ImageMetadata},
    resize::OptimizationPlan,
    role::Role,
    vtfcmd::{TextureConverter, TextureFormat},
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Last stage a texture completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TextureStage {
    Discovered,
    Classified,
    Inspected,
    Planned,
    Reencoded,
}

/// What happened to a texture
#[derive(Debug)]
pub enum TextureOutcome {
    /// Replaced by a smaller re-encode
    Optimized { new_size: u64 },
    /// Re-encoded at its own size, but the result was not small enough;
    /// original kept
    Unchanged { candidate_size: u64 },
    /// Dry run: inspected and planned only
    Planned,
    /// Failed after completing `stage`
    Failed { stage: TextureStage, error: OptimizeError },
}

impl TextureOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TextureOutcome::Failed { .. })
    }
}

/// Per-texture result of an optimization run
#[derive(Debug)]
pub struct TextureReport {
    pub path: PathBuf,
    pub role: Role,
    pub stage: TextureStage,
    pub original_size: u64,
    pub metadata: Option<ImageMetadata>,
    pub plan: Option<OptimizationPlan>,
    pub outcome: TextureOutcome,
}

impl TextureReport {
    fn discovered(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            role: Role::Diffuse,
            stage: TextureStage::Discovered,
            original_size: 0,
            metadata: None,
            plan: None,
            outcome: TextureOutcome::Planned,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// One-line status for the progress bar
    pub fn status_line(&self) -> String {
        let name = self.file_name();
        match (&self.outcome, &self.plan) {
            (TextureOutcome::Failed { error, .. }, _) => format!("{}: {} failure", name, error.kind()),
            (TextureOutcome::Unchanged { .. }, _) => format!("{}: kept original", name),
            (_, Some(plan)) => format!(
                "{}: {}x{} {}",
                name,
                plan.target_width,
                plan.target_height,
                TextureFormat::for_alpha(plan.use_alpha).to_vtfcmd_arg()
            ),
            (_, None) => name,
        }
    }
}

/// Runs the optimization pipeline for one texture
pub struct TextureTask<'a, C> {
    config: &'a Config,
    converter: &'a C,
}

impl<'a, C: TextureConverter> TextureTask<'a, C> {
    pub fn new(config: &'a Config, converter: &'a C) -> Self {
        Self { config, converter }
    }

    /// Process a single texture. Never fails; failures end up in the report.
    pub async fn process(&self, texture: &Path) -> TextureReport {
        let mut report = TextureReport::discovered(texture);

        match self.process_stages(texture, &mut report).await {
            Ok(outcome) => report.outcome = outcome,
            Err(error) => {
                error!(
                    "Failed to optimize {} after {:?} ({} failure): {}",
                    texture.display(),
                    report.stage,
                    error.kind(),
                    error
                );
                report.outcome = TextureOutcome::Failed { stage: report.stage, error };
            }
        }

        report
    }

    async fn process_stages(&self, texture: &Path, report: &mut TextureReport) -> Result<TextureOutcome, OptimizeError> {
        let file_name = report.file_name();
        info!(" - Optimizing {}", file_name);

        report.original_size = FileManager::get_file_size(texture).await?;
        report.role = Role::classify(&file_name);
        report.stage = TextureStage::Classified;
        let limit = self.config.limits.get(report.role);
        debug!("{} classified as {} (limit {})", file_name, report.role, limit);

        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(scratch_parent(texture))?;

        let png = self.converter.export_png(texture, scratch.path()).await?;
        let metadata = inspect_file(&png)?;
        report.metadata = Some(metadata);
        report.stage = TextureStage::Inspected;

        let plan = OptimizationPlan::new(&metadata, limit);
        report.plan = Some(plan);
        report.stage = TextureStage::Planned;
        debug!("   - Using alpha: {}", plan.use_alpha);
        if plan.needs_resize() {
            info!("   - Resizing image to {}x{}", plan.target_width, plan.target_height);
        }

        if self.config.dry_run {
            return Ok(TextureOutcome::Planned);
        }

        let encoded_dir = scratch.path().join("encoded");
        tokio::fs::create_dir(&encoded_dir).await?;
        let encoded = self.converter.import_vtf(&png, &encoded_dir, &plan).await?;
        let new_size = FileManager::get_file_size(&encoded).await?;
        report.stage = TextureStage::Reencoded;

        // A texture over its role limit is always replaced; the threshold only
        // decides for textures that were re-encoded at their own size
        let smaller = (new_size as f64) < (report.original_size as f64 * self.config.size_threshold);
        let should_replace = plan.needs_resize() || smaller;
        debug!(
            "Should replace? {} (new: {}, original: {}, threshold: {}, resized: {})",
            should_replace,
            new_size,
            report.original_size,
            self.config.size_threshold,
            plan.needs_resize()
        );

        if !should_replace {
            return Ok(TextureOutcome::Unchanged { candidate_size: new_size });
        }

        // The re-encode is confirmed on disk; only now is the original replaced
        FileManager::replace_file(texture, &encoded).await?;
        debug!(
            "Replaced {} ({:.1}% smaller)",
            texture.display(),
            FileManager::calculate_reduction(report.original_size, new_size)
        );

        Ok(TextureOutcome::Optimized { new_size })
    }
}

/// Directory that receives the scratch directory: the texture's own
/// directory, so the final rename stays on one filesystem.
fn scratch_parent(texture: &Path) -> &Path {
    match texture.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
