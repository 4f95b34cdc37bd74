//! Shared test utilities for the isoline workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic source image generators
//! - Contour tile fixtures, in memory and on disk
//! - Temporary directory helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{contour_tile_dir, create_gray_image};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Asserts that every `size x size` block of `image` holds the tile with the
/// code given by `$code(row_block, col_block)`.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_blocks;
///
/// assert_blocks!(output, tiles, 8, |_, _| 0);
/// ```
#[macro_export]
macro_rules! assert_blocks {
    ($image:expr, $tiles:expr, $size:expr, $code:expr) => {{
        let image: &image::RgbImage = &$image;
        let tiles: &[image::RgbImage] = &$tiles;
        let size: u32 = $size;
        let expected_code = $code;
        for row_block in 0..(image.height() / size) {
            for col_block in 0..(image.width() / size) {
                let expected: usize = expected_code(row_block, col_block);
                let (row, col) = (row_block * size, col_block * size);
                if !$crate::block_matches(image, &tiles[expected], row, col) {
                    panic!(
                        "block at (row {}, col {}) is not tile {} (found {:?})",
                        row,
                        col,
                        expected,
                        $crate::stamped_code(image, tiles, row, col)
                    );
                }
            }
        }
    }};
}
