//! # Tree Optimizer
//!
//! Orchestratore principale dell'ottimizzazione.
//!
//! Walks a texture tree, runs a [`TextureTask`] for every texture one at a
//! time, and aggregates the results.
//!
//! Direct-child textures of a folder are processed before the textures of
//! its subfolders. Per-file and per-subtree failures are collected; the run
//! always covers the whole tree.

use crate::{
    config::Config,
    error::OptimizeError,
    file_manager::FileManager,
    optimizer::texture_task::{TextureOutcome, TextureReport, TextureTask},
    progress::{OptimizationStats, ProgressManager},
    vtfcmd::TextureConverter,
};
use anyhow::Result;
use std::path::Path;
use tracing::{error, info, warn};

/// Result of optimizing one tree
#[derive(Debug, Default)]
pub struct FolderReport {
    pub textures: Vec<TextureReport>,
    pub traversal_failures: Vec<OptimizeError>,
    pub stats: OptimizationStats,
}

impl FolderReport {
    pub fn failure_count(&self) -> usize {
        self.stats.errors + self.traversal_failures.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Reports of textures that failed
    pub fn failed_textures(&self) -> impl Iterator<Item = &TextureReport> {
        self.textures.iter().filter(|report| report.outcome.is_failure())
    }

    /// Report for the texture with the given file name
    pub fn find(&self, file_name: &str) -> Option<&TextureReport> {
        self.textures.iter().find(|report| report.file_name() == file_name)
    }
}

/// Before/after totals of a full run
#[derive(Debug)]
pub struct RunSummary {
    pub size_before_mb: f64,
    pub size_after_mb: f64,
    pub report: FolderReport,
}

impl RunSummary {
    pub fn saved_mb(&self) -> f64 {
        self.size_before_mb - self.size_after_mb
    }
}

/// Optimizes every texture of a directory tree
pub struct TreeOptimizer<C> {
    config: Config,
    converter: C,
}

impl<C: TextureConverter> TreeOptimizer<C> {
    pub fn new(config: Config, converter: C) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, converter })
    }

    /// Total texture size under `root`, in megabytes
    pub fn measure_tree_size(&self, root: &Path) -> f64 {
        FileManager::measure_tree_size(root)
    }

    /// Measure, optimize, measure again
    pub async fn run(&self, root: &Path) -> RunSummary {
        let size_before_mb = self.measure_tree_size(root);
        info!("Texture size before optimization: {:.2} MB", size_before_mb);

        let report = self.optimize_folder(root).await;

        let size_after_mb = self.measure_tree_size(root);
        info!("Texture size after optimization: {:.2} MB", size_after_mb);

        RunSummary { size_before_mb, size_after_mb, report }
    }

    /// Optimize every texture under `root`
    pub async fn optimize_folder(&self, root: &Path) -> FolderReport {
        let scan = FileManager::scan_tree(root);
        let progress = if self.config.show_progress {
            ProgressManager::new(scan.texture_count() as u64)
        } else {
            ProgressManager::hidden()
        };

        let task = TextureTask::new(&self.config, &self.converter);
        let mut report = FolderReport {
            traversal_failures: scan.failures,
            ..Default::default()
        };

        for folder in &scan.folders {
            info!("Optimizing folder {}", folder.path.display());

            for texture in &folder.textures {
                let texture_report = task.process(texture).await;
                progress.update(&texture_report.status_line());
                Self::record(&mut report.stats, &texture_report);
                report.textures.push(texture_report);
            }
        }

        progress.finish(&report.stats.format_summary());
        Self::log_failures(&report);
        report
    }

    fn record(stats: &mut OptimizationStats, texture: &TextureReport) {
        match texture.outcome {
            TextureOutcome::Optimized { new_size } => {
                let resized = texture.plan.map(|plan| plan.needs_resize()).unwrap_or(false);
                stats.add_optimized(texture.original_size, new_size, resized);
            }
            TextureOutcome::Unchanged { .. } => stats.add_unchanged(texture.original_size),
            TextureOutcome::Planned => stats.add_planned(texture.original_size),
            TextureOutcome::Failed { .. } => stats.add_error(),
        }
    }

    fn log_failures(report: &FolderReport) {
        info!("{}", report.stats.format_summary());

        if !report.has_failures() {
            return;
        }

        warn!("{} failure(s); these can be retried manually:", report.failure_count());
        for texture in report.failed_textures() {
            if let TextureOutcome::Failed { stage, error } = &texture.outcome {
                error!("  {} [{} after {:?}]: {}", texture.path.display(), error.kind(), stage, error);
            }
        }
        for failure in &report.traversal_failures {
            error!("  [{}] {}", failure.kind(), failure);
        }
    }
}
