//! # Progress Tracking and Statistics Module
//!
//! Progress bar for the batch and cumulative statistics of a run.
//!
//! ## Components:
//! - `ProgressManager`: `indicatif` progress bar, one tick per texture
//! - `OptimizationStats`: counters for optimized, unchanged, planned and
//!   failed textures plus byte totals
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [=========================>--------------] 98/150 (65%) wall_n.vtf: 1024x1024 dxt1
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for texture optimization
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A progress manager that draws nothing
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Statistics tracker for optimization results
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_optimized: usize,
    /// Re-encoded but not smaller, original kept
    pub files_unchanged: usize,
    /// Dry run: inspected and planned only
    pub files_planned: usize,
    pub files_resized: usize,
    pub errors: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_optimized(&mut self, original_size: u64, new_size: u64, resized: bool) {
        self.files_processed += 1;
        self.files_optimized += 1;
        if resized {
            self.files_resized += 1;
        }
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_unchanged(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_unchanged += 1;
        self.total_original_size += original_size;
    }

    pub fn add_planned(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_planned += 1;
        self.total_original_size += original_size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Optimized: {} (resized {}) | Unchanged: {} | Planned: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_optimized,
            self.files_resized,
            self.files_unchanged,
            self.files_planned,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}
