//! Reading source images and persisting the result.

use std::path::Path;

use image::RgbImage;
use tracing::info;

use crate::error::Result;

/// Decode an image from disk as 8-bit RGB.
///
/// The format is detected from the file contents and extension.
pub fn read_image(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgb8();
    info!(path = %path.display(), width = image.width(), height = image.height(), "Read image");
    Ok(image)
}

/// Encode an image to disk; the format follows the path's extension.
pub fn write_image(path: impl AsRef<Path>, image: &RgbImage) -> Result<()> {
    let path = path.as_ref();
    image.save(path)?;
    info!(path = %path.display(), width = image.width(), height = image.height(), "Wrote image");
    Ok(())
}
