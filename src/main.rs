//! # VTF Texture Optimizer - Main Entry Point
//!
//! ## Responsibilities:
//! - Parse command line arguments with `clap`
//! - Initialize logging with `tracing`
//! - Build the `Config` (file, then CLI overrides) and locate vtfcmd
//! - Run the optimizer and map the outcome to an exit code
//!
//! ## Exit codes:
//! - 0: every texture processed without failure
//! - 1: startup error (missing tool, missing input, bad configuration)
//! - 2: the run finished but some textures or folders failed
//!
//! ## Example:
//! ```bash
//! texture-optimizer ./materials --normal 512x512 --vtfcmd ./tools/vtfcmd.exe
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vtf_texture_optimizer::{
    Config, ResizeFilter, ResizeMethod, ResolutionLimit, Role, ToolPathResolver, TreeOptimizer, VtfCmd,
};

#[derive(Parser)]
#[command(name = "texture-optimizer")]
#[command(about = "Shrink VTF textures per role and store them as DXT1/DXT5")]
struct Args {
    /// Directory containing textures (default: `input` next to the binary)
    input_directory: Option<PathBuf>,

    /// Path to the vtfcmd executable
    #[arg(long)]
    vtfcmd: Option<PathBuf>,

    /// JSON config file (default: <config dir>/texture-optimizer/config.json if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Max resolution for diffuse textures
    #[arg(long, value_name = "WxH")]
    diffuse: Option<ResolutionLimit>,

    /// Max resolution for normal maps
    #[arg(long, value_name = "WxH")]
    normal: Option<ResolutionLimit>,

    /// Max resolution for glow maps
    #[arg(long, value_name = "WxH")]
    glow: Option<ResolutionLimit>,

    /// Max resolution for specular maps
    #[arg(long, value_name = "WxH")]
    specular: Option<ResolutionLimit>,

    /// vtfcmd resize method: nearest, biggest, smallest
    #[arg(long)]
    rmethod: Option<ResizeMethod>,

    /// vtfcmd resize filter: point, box, triangle, cubic, lanczos3
    #[arg(long)]
    rfilter: Option<ResizeFilter>,

    /// Size threshold for textures that need no resize (replace if new size < original * threshold)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Dry run - inspect and plan, don't re-encode
    #[arg(long)]
    dry_run: bool,

    /// Don't draw the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let input_dir = match args.input_directory {
        Some(ref dir) => dir.clone(),
        None => default_input_dir()?,
    };
    if !input_dir.is_dir() {
        return Err(anyhow::anyhow!("Input directory does not exist: {}", input_dir.display()));
    }

    let config = build_config(&args).await?;
    let tool_path = ToolPathResolver::new().resolve(config.vtfcmd_path.as_deref())?;

    info!("Using vtfcmd: {}", tool_path.display());
    info!(
        "Resize: {} / {}",
        config.resize_method.to_vtfcmd_arg(),
        config.resize_filter.to_vtfcmd_arg()
    );
    for role in Role::ALL {
        info!("  • {} limit: {}", role, config.limits.get(role));
    }
    if config.dry_run {
        info!("Dry run: textures will be inspected but not re-encoded");
    }

    let converter = VtfCmd::new(tool_path).with_resize(config.resize_method, config.resize_filter);
    let optimizer = TreeOptimizer::new(config, converter)?;
    let summary = optimizer.run(&input_dir).await;

    info!("Optimization complete, saved {:.2} MB", summary.saved_mb());

    if summary.report.has_failures() {
        warn!("Finished with {} failure(s)", summary.report.failure_count());
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

/// Config file first, then command line overrides
async fn build_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => {
            if !path.is_file() {
                return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
            }
            Config::from_file(path).await?
        }
        None => match Config::default_path() {
            Some(path) if path.is_file() => {
                info!("Loading config from {}", path.display());
                Config::from_file(&path).await?
            }
            _ => Config::default(),
        },
    };

    let overrides = [
        (Role::Diffuse, args.diffuse),
        (Role::Normal, args.normal),
        (Role::Glow, args.glow),
        (Role::Specular, args.specular),
    ];
    for (role, limit) in overrides {
        if let Some(limit) = limit {
            config.limits.set(role, limit);
        }
    }

    if let Some(method) = args.rmethod {
        config.resize_method = method;
    }
    if let Some(filter) = args.rfilter {
        config.resize_filter = filter;
    }
    if let Some(threshold) = args.threshold {
        config.size_threshold = threshold;
    }
    if let Some(ref tool) = args.vtfcmd {
        config.vtfcmd_path = Some(tool.clone());
    }
    config.dry_run |= args.dry_run;
    if args.no_progress {
        config.show_progress = false;
    }

    config.validate()?;
    Ok(config)
}

fn default_input_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine the binary's directory"))?;
    Ok(dir.join("input"))
}
