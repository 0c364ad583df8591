//! # File Management Module
//!
//! Texture discovery and filesystem operations.
//!
//! ## Operations:
//! - `scan_tree()`: find every `.vtf` file, grouped by directory
//! - `measure_tree_size()`: total texture size of a tree, in megabytes
//! - `replace_file()`: atomic in-place replacement
//! - `format_size()`: bytes to a human-readable string
//!
//! ## Traversal guarantees:
//! - Every real directory is visited once, even when reached through several
//!   symbolic links; link cycles terminate
//! - Symlinked texture files are skipped so a link is never replaced by a file
//! - Scratch directories left by an interrupted run are skipped
//! - A directory that cannot be listed is recorded and its siblings continue
//!
//! ## Example:
//! ```rust,ignore
//! let scan = FileManager::scan_tree(Path::new("materials"));
//! for folder in &scan.folders {
//!     for texture in &folder.textures {
//!         // optimize texture
//!     }
//! }
//! ```

use crate::error::OptimizeError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of managed texture containers
pub const TEXTURE_EXTENSION: &str = "vtf";

/// Name prefix of per-file scratch directories
pub const SCRATCH_PREFIX: &str = ".texture-optimizer-";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A directory and its direct-child textures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureFolder {
    pub path: PathBuf,
    pub textures: Vec<PathBuf>,
}

/// Result of walking a texture tree
#[derive(Debug, Default)]
pub struct TreeScan {
    /// Directories in discovery order (parents before children)
    pub folders: Vec<TextureFolder>,
    /// Subtrees that could not be listed
    pub failures: Vec<OptimizeError>,
}

impl TreeScan {
    pub fn texture_count(&self) -> usize {
        self.folders.iter().map(|f| f.textures.len()).sum()
    }

    pub fn textures(&self) -> impl Iterator<Item = &PathBuf> {
        self.folders.iter().flat_map(|f| f.textures.iter())
    }
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Check if a path names a texture container (case-insensitive extension)
    pub fn is_texture(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(TEXTURE_EXTENSION))
            .unwrap_or(false)
    }

    /// Check if a directory is a scratch directory created by this tool
    pub fn is_scratch_dir(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().starts_with(SCRATCH_PREFIX))
            .unwrap_or(false)
    }

    /// Walk `root` and collect its textures grouped by directory
    pub fn scan_tree(root: &Path) -> TreeScan {
        let mut scan = TreeScan::default();
        let mut folder_index: HashMap<PathBuf, usize> = HashMap::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                if entry.depth() > 0 && Self::is_scratch_dir(entry.path()) {
                    debug!("Skipping scratch directory: {}", entry.path().display());
                    return false;
                }
                match entry.path().canonicalize() {
                    Ok(real) => {
                        let first_visit = visited.insert(real);
                        if !first_visit {
                            debug!("Already visited, skipping: {}", entry.path().display());
                        }
                        first_visit
                    }
                    // Let walkdir surface the error when it tries to list it
                    Err(_) => true,
                }
            });

        for item in walker {
            let entry = match item {
                Ok(entry) => entry,
                Err(e) if e.loop_ancestor().is_some() => {
                    debug!("Skipping symlink loop: {}", e);
                    continue;
                }
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    warn!("Cannot traverse {}: {}", path.display(), e);
                    scan.failures.push(OptimizeError::Traversal {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                folder_index.insert(entry.path().to_path_buf(), scan.folders.len());
                scan.folders.push(TextureFolder {
                    path: entry.path().to_path_buf(),
                    textures: Vec::new(),
                });
                continue;
            }

            if !entry.file_type().is_file() || !Self::is_texture(entry.path()) {
                continue;
            }

            if entry.path_is_symlink() {
                debug!("Skipping symlinked texture: {}", entry.path().display());
                continue;
            }

            let folder = entry
                .path()
                .parent()
                .and_then(|parent| folder_index.get(parent).copied());
            match folder {
                Some(index) => scan.folders[index].textures.push(entry.path().to_path_buf()),
                // `root` itself is a texture file
                None => scan.folders.push(TextureFolder {
                    path: entry.path().parent().unwrap_or(root).to_path_buf(),
                    textures: vec![entry.path().to_path_buf()],
                }),
            }
        }

        scan
    }

    /// Size of a file in bytes
    pub async fn get_file_size(path: &Path) -> Result<u64, OptimizeError> {
        Ok(tokio::fs::metadata(path).await?.len())
    }

    /// Total size of all textures under `root`, in megabytes
    pub fn measure_tree_size(root: &Path) -> f64 {
        let scan = Self::scan_tree(root);
        let total_bytes: u64 = scan
            .textures()
            .filter_map(|path| match std::fs::metadata(path) {
                Ok(metadata) => Some(metadata.len()),
                Err(e) => {
                    warn!("Cannot read size of {}: {}", path.display(), e);
                    None
                }
            })
            .sum();
        Self::bytes_to_megabytes(total_bytes)
    }

    /// Atomically replace `original` with `replacement`.
    ///
    /// Both must live on the same filesystem. The original stays untouched
    /// if the rename fails.
    pub async fn replace_file(original: &Path, replacement: &Path) -> Result<(), OptimizeError> {
        tokio::fs::rename(replacement, original).await?;
        Ok(())
    }

    pub fn bytes_to_megabytes(bytes: u64) -> f64 {
        bytes as f64 / BYTES_PER_MB
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
