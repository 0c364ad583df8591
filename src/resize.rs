//! # Resize Planner
//!
//! Computes the target dimensions of a texture from its original size and
//! the resolution limit of its role, and combines them with the alpha
//! decision into an [`OptimizationPlan`].
//!
//! ## Rules
//! 1. No limit configured: keep the original size
//! 2. Original already fits: keep the original size
//! 3. Otherwise shrink the constrained axis pair to the original aspect ratio
//! 4. Clamp to the original size, so a texture is never upscaled
//!
//! The resize itself is done by vtfcmd; this module only decides the numbers
//! and the resize arguments passed along.

use crate::config::ResolutionLimit;
use crate::inspect::ImageMetadata;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How vtfcmd picks the final size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMethod {
    /// Nearest power of two
    #[default]
    Nearest,
    /// Biggest power of two
    Biggest,
    /// Smallest power of two
    Smallest,
}

impl ResizeMethod {
    pub const ALL: [ResizeMethod; 3] = [ResizeMethod::Nearest, ResizeMethod::Biggest, ResizeMethod::Smallest];

    /// Value of vtfcmd's `-rmethod` argument
    pub fn to_vtfcmd_arg(&self) -> &'static str {
        match self {
            ResizeMethod::Nearest => "nearest",
            ResizeMethod::Biggest => "biggest",
            ResizeMethod::Smallest => "smallest",
        }
    }
}

impl FromStr for ResizeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.to_vtfcmd_arg().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown resize method '{}' (nearest, biggest, smallest)", s))
    }
}

/// Resampling filter used by vtfcmd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Point,
    Box,
    Triangle,
    #[default]
    Cubic,
    Lanczos3,
}

impl ResizeFilter {
    pub const ALL: [ResizeFilter; 5] = [
        ResizeFilter::Point,
        ResizeFilter::Box,
        ResizeFilter::Triangle,
        ResizeFilter::Cubic,
        ResizeFilter::Lanczos3,
    ];

    /// Value of vtfcmd's `-rfilter` argument
    pub fn to_vtfcmd_arg(&self) -> &'static str {
        match self {
            ResizeFilter::Point => "point",
            ResizeFilter::Box => "box",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::Cubic => "cubic",
            ResizeFilter::Lanczos3 => "lanczos3",
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.to_vtfcmd_arg().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown resize filter '{}' (point, box, triangle, cubic, lanczos3)", s))
    }
}

/// Target dimensions for an image of `original_width` x `original_height`
/// under `limit`. Never larger than the original or the limit on either axis.
pub fn plan_dimensions(original_width: u32, original_height: u32, limit: ResolutionLimit) -> (u32, u32) {
    if limit.is_unbounded() {
        return (original_width, original_height);
    }

    let ResolutionLimit { mut max_width, mut max_height } = limit;

    if original_width <= max_width && original_height <= max_height {
        return (original_width, original_height);
    }

    // Zero-area input: nothing to scale, and the aspect ratio is undefined
    if original_width == 0 || original_height == 0 {
        return (original_width, original_height);
    }

    let aspect = original_width as f64 / original_height as f64;
    let height_for = |width: u32| ((width as f64 / aspect).floor() as u32).max(1);
    let width_for = |height: u32| ((height as f64 * aspect).floor() as u32).max(1);

    // With a non-square limit the derived axis can overshoot its own maximum;
    // in that case the other axis is the constraining one.
    if aspect > 1.0 {
        let derived = height_for(max_width);
        if derived <= max_height {
            max_height = derived;
        } else {
            max_width = width_for(max_height);
        }
    } else {
        let derived = width_for(max_height);
        if derived <= max_width {
            max_width = derived;
        } else {
            max_height = height_for(max_width);
        }
    }

    (original_width.min(max_width), original_height.min(max_height))
}

/// Everything the re-encode step needs to know about one texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationPlan {
    pub original_width: u32,
    pub original_height: u32,
    pub target_width: u32,
    pub target_height: u32,
    pub use_alpha: bool,
}

impl OptimizationPlan {
    pub fn new(metadata: &ImageMetadata, limit: ResolutionLimit) -> Self {
        let (target_width, target_height) = plan_dimensions(metadata.width, metadata.height, limit);
        Self {
            original_width: metadata.width,
            original_height: metadata.height,
            target_width,
            target_height,
            use_alpha: metadata.has_significant_alpha,
        }
    }

    pub fn needs_resize(&self) -> bool {
        (self.target_width, self.target_height) != (self.original_width, self.original_height)
    }
}
