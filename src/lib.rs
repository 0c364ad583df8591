//! # VTF Texture Optimizer Library
//!
//! Batch-optimizes a tree of VTF textures: each texture is resized to the
//! resolution limit of its role (diffuse, normal, glow, specular) and
//! re-encoded as DXT1, or DXT5 when its alpha channel carries information.
//!
//! ## Modules:
//! - `role`: file name -> texture role
//! - `inspect`: dimensions and alpha necessity of a decoded image
//! - `resize`: target dimensions under a resolution limit
//! - `optimizer`: tree walk, per-texture pipeline, reporting
//! - `vtfcmd`: external converter wrapper
//! - `tool_resolver`: locating vtfcmd
//! - `file_manager`: discovery, measurement, atomic replacement
//! - `config`, `error`, `progress`, `utils`
//!
//! ## Usage:
//! ```rust,no_run
//! use vtf_texture_optimizer::{Config, ToolPathResolver, TreeOptimizer, VtfCmd};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let tool = ToolPathResolver::new().resolve(None)?;
//! let optimizer = TreeOptimizer::new(Config::default(), VtfCmd::new(tool))?;
//! let summary = optimizer.run(Path::new("materials")).await;
//! println!("saved {:.2} MB", summary.saved_mb());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod inspect;
pub mod optimizer;
pub mod progress;
pub mod resize;
pub mod role;
pub mod tool_resolver;
pub mod utils;
pub mod vtfcmd;

pub use config::{Config, ResolutionLimit, ResolutionLimits};
pub use error::OptimizeError;
pub use inspect::ImageMetadata;
pub use optimizer::{RunSummary, TreeOptimizer};
pub use resize::{plan_dimensions, OptimizationPlan, ResizeFilter, ResizeMethod};
pub use role::Role;
pub use tool_resolver::ToolPathResolver;
pub use vtfcmd::{TextureConverter, VtfCmd};
