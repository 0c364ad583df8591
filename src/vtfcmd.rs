//! # vtfcmd Converter
//!
//! Wraps the external `vtfcmd` command-line tool, which does the actual VTF
//! decoding and encoding. No pixel data is processed in-process besides the
//! alpha inspection done on the exported PNG.
//!
//! ## Operations
//! - **Export**: `<stem>.vtf` -> `<output>/<stem>.png`
//! - **Import**: `<stem>.png` -> `<output>/<stem>.vtf`, in DXT1 (opaque) or
//!   DXT5 (alpha), optionally resized
//!
//! Every invocation is awaited to completion. A non-zero exit status, or an
//! expected output file that is missing afterwards, is a
//! [`OptimizeError::Conversion`].
//!
//! The optimizer only talks to the converter through [`TextureConverter`],
//! so tests can substitute a fake.

use crate::args;
use crate::error::OptimizeError;
use crate::resize::{OptimizationPlan, ResizeFilter, ResizeMethod};
use crate::utils::to_string_vec;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Compressed pixel format written into the VTF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// No alpha, 4 bits per pixel
    Dxt1,
    /// Interpolated alpha, 8 bits per pixel
    Dxt5,
}

impl TextureFormat {
    pub fn for_alpha(use_alpha: bool) -> Self {
        if use_alpha {
            TextureFormat::Dxt5
        } else {
            TextureFormat::Dxt1
        }
    }

    pub fn to_vtfcmd_arg(&self) -> &'static str {
        match self {
            TextureFormat::Dxt1 => "dxt1",
            TextureFormat::Dxt5 => "dxt5",
        }
    }
}

/// External texture decode/encode collaborator
#[allow(async_fn_in_trait)]
pub trait TextureConverter {
    /// Decode `texture` into a PNG inside `output_dir` and return its path
    async fn export_png(&self, texture: &Path, output_dir: &Path) -> Result<PathBuf, OptimizeError>;

    /// Encode `png` into a VTF inside `output_dir` following `plan`, and
    /// return its path
    async fn import_vtf(
        &self,
        png: &Path,
        output_dir: &Path,
        plan: &OptimizationPlan,
    ) -> Result<PathBuf, OptimizeError>;
}

/// The vtfcmd executable at an explicit location
#[derive(Debug, Clone)]
pub struct VtfCmd {
    tool_path: PathBuf,
    resize_method: ResizeMethod,
    resize_filter: ResizeFilter,
}

impl VtfCmd {
    pub fn new(tool_path: PathBuf) -> Self {
        Self {
            tool_path,
            resize_method: ResizeMethod::default(),
            resize_filter: ResizeFilter::default(),
        }
    }

    /// Resize method and filter passed along whenever a texture is shrunk
    pub fn with_resize(mut self, method: ResizeMethod, filter: ResizeFilter) -> Self {
        self.resize_method = method;
        self.resize_filter = filter;
        self
    }

    /// Arguments for decoding a VTF into a PNG
    pub fn export_args(texture: &Path, output_dir: &Path) -> Vec<String> {
        let texture = texture.to_string_lossy();
        let output_dir = output_dir.to_string_lossy();
        to_string_vec([
            "-file",
            &*texture,
            "-output",
            &*output_dir,
            "-exportformat",
            "png",
            "-silent",
        ])
    }

    /// Arguments for encoding a PNG into a VTF according to `plan`
    pub fn import_args(&self, png: &Path, output_dir: &Path, plan: &OptimizationPlan) -> Vec<String> {
        let format = TextureFormat::for_alpha(plan.use_alpha).to_vtfcmd_arg();
        let mut args = args![
            "-file", png.to_string_lossy(),
            "-output", output_dir.to_string_lossy(),
            "-format", format,
            "-alphaformat", format,
            "-silent",
        ];

        if plan.needs_resize() {
            args.extend(args![
                "-resize",
                "-rmethod", self.resize_method.to_vtfcmd_arg(),
                "-rfilter", self.resize_filter.to_vtfcmd_arg(),
                "-rwidth", plan.target_width,
                "-rheight", plan.target_height,
            ]);
        }

        args
    }

    /// Run vtfcmd and check that `expected_output` was written
    async fn run(&self, args: &[String], source: &Path, expected_output: PathBuf) -> Result<PathBuf, OptimizeError> {
        debug!("Running {:?} {:?}", self.tool_path, args);

        let start_time = std::time::Instant::now();
        let output = Command::new(&self.tool_path)
            .args(args)
            .output()
            .await
            .map_err(|e| OptimizeError::Conversion {
                path: source.to_path_buf(),
                reason: format!("failed to start {}: {}", self.tool_path.display(), e),
            })?;
        let elapsed = start_time.elapsed();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OptimizeError::Conversion {
                path: source.to_path_buf(),
                reason: format!("vtfcmd exited with {} after {:?}: {}", output.status, elapsed, stderr.trim()),
            });
        }

        if !expected_output.is_file() {
            return Err(OptimizeError::Conversion {
                path: source.to_path_buf(),
                reason: format!("vtfcmd produced no output at {}", expected_output.display()),
            });
        }

        debug!("vtfcmd completed in {:?}: {}", elapsed, expected_output.display());
        Ok(expected_output)
    }
}

/// `<output_dir>/<stem of input>.<extension>`
pub fn output_path_for(input: &Path, output_dir: &Path, extension: &str) -> Result<PathBuf, OptimizeError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| OptimizeError::Validation(format!("Invalid file name: {}", input.display())))?;
    Ok(output_dir.join(format!("{}.{}", stem.to_string_lossy(), extension)))
}

impl TextureConverter for VtfCmd {
    async fn export_png(&self, texture: &Path, output_dir: &Path) -> Result<PathBuf, OptimizeError> {
        let expected = output_path_for(texture, output_dir, "png")?;
        let args = Self::export_args(texture, output_dir);
        self.run(&args, texture, expected).await
    }

    async fn import_vtf(
        &self,
        png: &Path,
        output_dir: &Path,
        plan: &OptimizationPlan,
    ) -> Result<PathBuf, OptimizeError> {
        let expected = output_path_for(png, output_dir, "vtf")?;
        let args = self.import_args(png, output_dir, plan);
        self.run(&args, png, expected).await
    }
}
