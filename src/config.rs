//! # Configuration Management Module
//!
//! Holds every parameter of an optimization run.
//!
//! ## Parameters:
//! - `limits`: per-role maximum resolution (`0x0` = no limit)
//! - `vtfcmd_path`: explicit location of the vtfcmd executable (default: resolved)
//! - `size_threshold`: same-size re-encodes replace the original only if new size < original * threshold (default: 1.0)
//! - `resize_method` / `resize_filter`: vtfcmd resize options (default: nearest / cubic)
//! - `dry_run`: inspect and plan without re-encoding (default: false)
//! - `show_progress`: draw the progress bar (default: true)
//!
//! The configuration is an explicit value built by the caller (CLI or JSON
//! file) and passed down to the optimizer. In a JSON file a missing role, or a
//! missing `limits` object, means "no limit". The built-in limits of
//! `Config::default()` apply only when no file is used.
//!
//! ## Example:
//! ```rust,ignore
//! let config = Config {
//!     limits: ResolutionLimits {
//!         diffuse: ResolutionLimit::new(4096, 4096),
//!         ..ResolutionLimits::unbounded()
//!     },
//!     dry_run: true,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::resize::{ResizeFilter, ResizeMethod};
use crate::role::Role;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Maximum allowed dimensions for one texture role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolutionLimit {
    pub max_width: u32,
    pub max_height: u32,
}

impl ResolutionLimit {
    pub const UNBOUNDED: ResolutionLimit = ResolutionLimit { max_width: 0, max_height: 0 };

    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self { max_width, max_height }
    }

    /// A zero on either axis disables the limit
    pub fn is_unbounded(&self) -> bool {
        self.max_width == 0 || self.max_height == 0
    }
}

impl fmt::Display for ResolutionLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::UNBOUNDED {
            write!(f, "unlimited")
        } else {
            write!(f, "{}x{}", self.max_width, self.max_height)
        }
    }
}

impl FromStr for ResolutionLimit {
    type Err = String;

    /// Parses `WIDTHxHEIGHT`, e.g. `2048x1024`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let max_width = w.trim().parse::<u32>().map_err(|e| format!("invalid width '{}': {}", w, e))?;
        let max_height = h.trim().parse::<u32>().map_err(|e| format!("invalid height '{}': {}", h, e))?;
        Ok(Self::new(max_width, max_height))
    }
}

/// Resolution limit for every role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionLimits {
    #[serde(default)]
    pub diffuse: ResolutionLimit,
    #[serde(default)]
    pub normal: ResolutionLimit,
    #[serde(default)]
    pub glow: ResolutionLimit,
    #[serde(default)]
    pub specular: ResolutionLimit,
}

impl ResolutionLimits {
    pub fn unbounded() -> Self {
        Self {
            diffuse: ResolutionLimit::UNBOUNDED,
            normal: ResolutionLimit::UNBOUNDED,
            glow: ResolutionLimit::UNBOUNDED,
            specular: ResolutionLimit::UNBOUNDED,
        }
    }

    pub fn get(&self, role: Role) -> ResolutionLimit {
        match role {
            Role::Diffuse => self.diffuse,
            Role::Normal => self.normal,
            Role::Glow => self.glow,
            Role::Specular => self.specular,
        }
    }

    pub fn set(&mut self, role: Role, limit: ResolutionLimit) {
        match role {
            Role::Diffuse => self.diffuse = limit,
            Role::Normal => self.normal = limit,
            Role::Glow => self.glow = limit,
            Role::Specular => self.specular = limit,
        }
    }
}

impl Default for ResolutionLimits {
    fn default() -> Self {
        Self {
            diffuse: ResolutionLimit::new(2048, 2048),
            normal: ResolutionLimit::new(1024, 1024),
            glow: ResolutionLimit::new(1024, 1024),
            specular: ResolutionLimit::new(1024, 1024),
        }
    }
}

/// Configuration for a texture optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-role resolution limits
    #[serde(default = "ResolutionLimits::unbounded")]
    pub limits: ResolutionLimits,
    /// Explicit vtfcmd location (None = resolve automatically)
    pub vtfcmd_path: Option<PathBuf>,
    /// Textures kept at their size are replaced only if new size < original * threshold
    pub size_threshold: f64,
    /// vtfcmd `-rmethod`
    pub resize_method: ResizeMethod,
    /// vtfcmd `-rfilter`
    pub resize_filter: ResizeFilter,
    /// Dry run - inspect and plan, don't re-encode
    pub dry_run: bool,
    /// Draw the progress bar
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: ResolutionLimits::default(),
            vtfcmd_path: None,
            size_threshold: 1.0,
            resize_method: ResizeMethod::default(),
            resize_filter: ResizeFilter::default(),
            dry_run: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.size_threshold > 0.0 && self.size_threshold <= 1.0) {
            return Err(anyhow::anyhow!("Size threshold must be between 0.0 (exclusive) and 1.0"));
        }

        for role in Role::ALL {
            let limit = self.limits.get(role);
            if (limit.max_width == 0) != (limit.max_height == 0) {
                return Err(anyhow::anyhow!(
                    "Limit for {} must set both width and height, or neither (got {}x{})",
                    role, limit.max_width, limit.max_height
                ));
            }
        }

        if let Some(ref tool) = self.vtfcmd_path {
            if !tool.is_file() {
                return Err(anyhow::anyhow!("vtfcmd path is not a file: {}", tool.display()));
            }
        }

        Ok(())
    }

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("texture-optimizer").join("config.json"))
    }

    /// Load configuration from file (defaults if the file doesn't exist)
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
