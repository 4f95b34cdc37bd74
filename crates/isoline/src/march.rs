//! Phase 3: classify grid cells and stamp contour tiles.

use image::RgbImage;
use tracing::debug;

use crate::error::Result;
use crate::partition::slice_bounds;
use crate::sampling::{grid_steps, SharedGrid};
use crate::shared::WorkingImage;
use crate::tiles::ContourTileSet;

/// 4-bit configuration code of a cell from its corner values.
///
/// Bit order, most significant first: top-left, top-right, bottom-right,
/// bottom-left.
#[inline]
pub fn configuration_code(top_left: u8, top_right: u8, bottom_right: u8, bottom_left: u8) -> u8 {
    8 * top_left + 4 * top_right + 2 * bottom_right + bottom_left
}

/// Overwrite the canvas with `tile`, its top-left corner at `(row, col)`.
///
/// Pixels are replaced, not blended.
pub fn stamp_tile(canvas: &WorkingImage, tile: &RgbImage, row: usize, col: usize) -> Result<()> {
    let (width, height) = tile.dimensions();
    for dy in 0..height {
        let mut dst = canvas.write_row(row + dy as usize)?;
        for dx in 0..width {
            dst[col + dx as usize] = *tile.get_pixel(dx, dy);
        }
    }
    Ok(())
}

/// March worker `id`'s slice of grid rows, stamping one tile per cell.
pub fn march_slice(
    grid: &SharedGrid,
    tiles: &ContourTileSet,
    canvas: &WorkingImage,
    id: usize,
    workers: usize,
    step: usize,
) -> Result<()> {
    let (p, q) = grid_steps(canvas.rows(), canvas.cols(), step);

    let range = slice_bounds(id, workers, p);
    debug!(worker = id, start = range.start, end = range.end, "Marching grid rows");

    for i in range {
        let top = grid.read_row(i)?;
        let bottom = grid.read_row(i + 1)?;
        for j in 0..q {
            let code = configuration_code(top[j], top[j + 1], bottom[j + 1], bottom[j]);
            stamp_tile(canvas, tiles.tile(code as usize)?, i * step, j * step)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_configuration_codes() {
        assert_eq!(configuration_code(0, 0, 0, 0), 0);
        assert_eq!(configuration_code(1, 1, 1, 1), 15);
        assert_eq!(configuration_code(1, 0, 0, 0), 8);
        assert_eq!(configuration_code(0, 0, 0, 1), 1);
        assert_eq!(configuration_code(1, 0, 1, 0), 10);
        assert_eq!(configuration_code(0, 1, 0, 1), 5);
    }

    #[test]
    fn test_stamp_overwrites_without_blending() {
        let canvas = WorkingImage::blank(6, 6);
        for row in 0..6 {
            for col in 0..6 {
                canvas.set(row, col, Rgb([50, 50, 50])).unwrap();
            }
        }
        let tile = RgbImage::from_fn(2, 3, |x, y| Rgb([x as u8, y as u8, 255]));

        stamp_tile(&canvas, &tile, 2, 4).unwrap();

        // 2 wide, 3 tall: rows 2..5, cols 4..6
        assert_eq!(canvas.get(2, 4).unwrap(), Rgb([0, 0, 255]));
        assert_eq!(canvas.get(4, 5).unwrap(), Rgb([1, 2, 255]));
        assert_eq!(canvas.get(1, 4).unwrap(), Rgb([50, 50, 50]));
        assert_eq!(canvas.get(5, 4).unwrap(), Rgb([50, 50, 50]));
        assert_eq!(canvas.get(2, 3).unwrap(), Rgb([50, 50, 50]));
    }
}
