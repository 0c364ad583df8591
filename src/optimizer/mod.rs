//! # Optimizer Module
//!
//! Separa le responsabilità in sottomoduli:
//! - `tree_optimizer`: visita l'albero delle texture e aggrega i risultati
//! - `texture_task`: pipeline per una singola texture

pub mod texture_task;
pub mod tree_optimizer;

pub use texture_task::{TextureOutcome, TextureReport, TextureStage, TextureTask};
pub use tree_optimizer::{FolderReport, RunSummary, TreeOptimizer};
