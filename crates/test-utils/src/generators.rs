//! Synthetic source images for pipeline tests.
//!
//! These generators create predictable, verifiable patterns so that grid and
//! output expectations can be computed by hand.

use image::{Rgb, RgbImage};

/// Creates an image filled with one gray level.
///
/// # Example
///
/// ```
/// use test_utils::create_gray_image;
///
/// let image = create_gray_image(64, 64, 128);
/// assert_eq!(image.get_pixel(10, 20).0, [128, 128, 128]);
/// ```
pub fn create_gray_image(width: u32, height: u32, level: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([level, level, level]))
}

/// Creates a light image whose last row and last column are dark.
///
/// With a step that divides `width - 1` and `height - 1` unevenly, every
/// regular sample point lands on a light pixel and only the boundary sample
/// points see the dark edge.
pub fn create_dark_edge_image(width: u32, height: u32, light: u8, dark: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if x == width - 1 || y == height - 1 {
            Rgb([dark, dark, dark])
        } else {
            Rgb([light, light, light])
        }
    })
}

/// Creates a diagonal gray ramp from black (top-left) to white (bottom-right).
pub fn create_gradient_image(width: u32, height: u32) -> RgbImage {
    let span = (width + height).saturating_sub(2).max(1);
    RgbImage::from_fn(width, height, |x, y| {
        let level = ((x + y) * 255 / span) as u8;
        Rgb([level, level, level])
    })
}

/// Creates a dark disc on a light background.
///
/// Produces every contour configuration along the disc's rim.
pub fn create_disc_image(width: u32, height: u32, radius: f32) -> RgbImage {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    RgbImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        if (dx * dx + dy * dy).sqrt() <= radius {
            Rgb([20, 30, 40])
        } else {
            Rgb([230, 220, 210])
        }
    })
}

/// Creates a deterministic noise image.
///
/// Uses a simple hash-based approach for reproducibility.
pub fn create_noise_image(width: u32, height: u32, seed: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let h = simple_hash(x, y, seed);
        Rgb([h as u8, (h >> 8) as u8, (h >> 16) as u8])
    })
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
