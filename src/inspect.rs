//! # Content Inspector
//!
//! Looks at the decoded intermediate image (the PNG exported by vtfcmd) and
//! reports its dimensions and whether the alpha channel carries any
//! information. A fully opaque alpha channel is treated as no alpha so the
//! texture can be stored in the cheaper DXT1 format.

use crate::error::OptimizeError;
use image::{DynamicImage, GenericImageView};
use std::path::Path;
use tracing::debug;

/// Properties of a decoded texture needed to build an optimization plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub has_significant_alpha: bool,
}

impl ImageMetadata {
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = dimensions(image);
        Self {
            width,
            height,
            has_significant_alpha: has_alpha(image),
        }
    }
}

/// Pixel width and height as decoded
pub fn dimensions(image: &DynamicImage) -> (u32, u32) {
    image.dimensions()
}

/// Minimum and maximum alpha sample, normalised to 16 bits.
///
/// `None` when the image has no alpha channel at all.
pub fn alpha_extrema(image: &DynamicImage) -> Option<(u16, u16)> {
    if !image.color().has_alpha() {
        return None;
    }

    let extrema = match image {
        DynamicImage::ImageRgba8(buf) => fold_extrema(buf.pixels().map(|p| widen(p[3]))),
        DynamicImage::ImageLumaA8(buf) => fold_extrema(buf.pixels().map(|p| widen(p[1]))),
        DynamicImage::ImageRgba16(buf) => fold_extrema(buf.pixels().map(|p| p[3])),
        DynamicImage::ImageLumaA16(buf) => fold_extrema(buf.pixels().map(|p| p[1])),
        other => {
            let rgba = other.to_rgba16();
            fold_extrema(rgba.pixels().map(|p| p[3]))
        }
    };

    // An alpha-capable image with zero pixels has nothing to be transparent
    Some(extrema.unwrap_or((u16::MAX, u16::MAX)))
}

/// True when the image has an alpha channel and at least one pixel is not
/// fully opaque.
pub fn has_alpha(image: &DynamicImage) -> bool {
    match alpha_extrema(image) {
        None => false,
        Some(extrema) => extrema != (u16::MAX, u16::MAX),
    }
}

/// Decode an intermediate image file and extract its metadata.
///
/// Truncated or corrupt data is a hard decode failure.
pub fn inspect_file(path: &Path) -> Result<ImageMetadata, OptimizeError> {
    let decode_error = |source: image::ImageError| OptimizeError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let image = image::io::Reader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(decode_error)?;

    let metadata = ImageMetadata::from_image(&image);
    debug!(
        "Inspected {}: {}x{}, significant alpha: {}",
        path.display(),
        metadata.width,
        metadata.height,
        metadata.has_significant_alpha
    );
    Ok(metadata)
}

fn widen(sample: u8) -> u16 {
    // 0xAB -> 0xABAB, so 255 maps to 65535
    u16::from(sample) * 257
}

fn fold_extrema(samples: impl Iterator<Item = u16>) -> Option<(u16, u16)> {
    samples.fold(None, |acc, a| match acc {
        None => Some((a, a)),
        Some((min, max)) => Some((min.min(a), max.max(a))),
    })
}
