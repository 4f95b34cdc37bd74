//! Contour tile fixtures.
//!
//! Real contour tiles are drawn line art; for tests every tile just needs to
//! be distinguishable from the others and from its own transpose.

use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};

use crate::paths::temp_test_dir_with_prefix;

/// Number of tiles in a complete contour set.
pub const TILE_COUNT: usize = 16;

/// Creates 16 distinct `size x size` tiles.
///
/// Pixel `(x, y)` of tile `code` is `[code * 16, x, y]`, so both the code and
/// the orientation of a stamped tile can be read back from the output.
pub fn create_contour_tiles(size: u32) -> Vec<RgbImage> {
    (0..TILE_COUNT)
        .map(|code| RgbImage::from_fn(size, size, |x, y| Rgb([code as u8 * 16, x as u8, y as u8])))
        .collect()
}

/// Writes tiles as `<dir>/<code>.<extension>`.
pub fn write_contour_tiles(dir: &Path, tiles: &[RgbImage], extension: &str) -> ImageResult<()> {
    for (code, tile) in tiles.iter().enumerate() {
        tile.save(dir.join(format!("{}.{}", code, extension)))?;
    }
    Ok(())
}

/// Creates a temporary directory holding a full set of PPM tiles.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn contour_tile_dir(size: u32) -> tempfile::TempDir {
    let dir = temp_test_dir_with_prefix("contours");
    write_contour_tiles(dir.path(), &create_contour_tiles(size), "ppm")
        .expect("Failed to write contour tile fixtures");
    dir
}

/// Whether `image` contains `tile` with its top-left corner at `(row, col)`.
pub fn block_matches(image: &RgbImage, tile: &RgbImage, row: u32, col: u32) -> bool {
    tile.enumerate_pixels()
        .all(|(x, y, px)| image.get_pixel(col + x, row + y) == px)
}

/// Index of the tile stamped at `(row, col)`, if any tile matches.
pub fn stamped_code(image: &RgbImage, tiles: &[RgbImage], row: u32, col: u32) -> Option<usize> {
    tiles
        .iter()
        .position(|tile| block_matches(image, tile, row, col))
}
