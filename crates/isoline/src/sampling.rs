//! Phase 2: threshold the working image into a binary occupancy grid.
//!
//! The grid has one sample point every `step` pixels on both axes, plus one
//! extra row and column. Those last sample points have no further step inside
//! the image, so they are read from the image's last pixel row and column.

use image::Rgb;
use tracing::debug;

use crate::config::MarchConfig;
use crate::error::{MarchError, Result};
use crate::partition::slice_bounds;
use crate::shared::{SharedRows, WorkingImage};

/// The occupancy grid while workers are filling it.
pub type SharedGrid = SharedRows<u8>;

/// Number of full sample steps `(p, q)` along the rows and columns.
pub fn grid_steps(rows: usize, cols: usize, step: usize) -> (usize, usize) {
    (rows / step, cols / step)
}

/// Allocate the `(p + 1) x (q + 1)` grid for a `rows x cols` working image.
pub fn allocate_grid(rows: usize, cols: usize, step: usize) -> SharedGrid {
    let (p, q) = grid_steps(rows, cols, step);
    SharedRows::new(p + 1, q + 1, 0, "occupancy grid")
}

/// Average of the three channels, rounded down.
#[inline]
pub fn luminance(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((r as u16 + g as u16 + b as u16) / 3) as u8
}

/// Grid value for a pixel: 1 when it is dark enough to be inside the contour.
#[inline]
pub fn occupancy(pixel: &Rgb<u8>, threshold: u8) -> u8 {
    u8::from(luminance(pixel) <= threshold)
}

/// Fill worker `id`'s rows of the occupancy grid.
///
/// Each worker samples its slice of grid rows `0..p`, including the boundary
/// column `q`. The boundary row `p` is filled once, by the last worker.
pub fn sample_slice(
    canvas: &WorkingImage,
    grid: &SharedGrid,
    id: usize,
    workers: usize,
    config: &MarchConfig,
) -> Result<()> {
    let step = config.step;
    let threshold = config.threshold;
    let (rows, cols) = (canvas.rows(), canvas.cols());
    let (p, q) = grid_steps(rows, cols, step);

    if grid.rows() != p + 1 || grid.cols() != q + 1 {
        return Err(MarchError::config(format!(
            "grid is {}x{}, expected {}x{} for a {}x{} image with step {}",
            grid.rows(),
            grid.cols(),
            p + 1,
            q + 1,
            rows,
            cols,
            step
        )));
    }

    let range = slice_bounds(id, workers, p);
    debug!(worker = id, start = range.start, end = range.end, "Sampling grid rows");

    for i in range {
        let pixels = canvas.read_row(i * step)?;
        let mut cells = grid.write_row(i)?;
        for j in 0..q {
            cells[j] = occupancy(&pixels[j * step], threshold);
        }
        cells[q] = occupancy(&pixels[cols - 1], threshold);
    }

    if id == workers - 1 {
        let pixels = canvas.read_row(rows - 1)?;
        let mut cells = grid.write_row(p)?;
        for j in 0..q {
            cells[j] = occupancy(&pixels[j * step], threshold);
        }
        cells[q] = occupancy(&pixels[cols - 1], threshold);
    }

    Ok(())
}

/// Owned snapshot of the finished occupancy grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl OccupancyGrid {
    /// Take ownership of a grid after every worker has joined.
    pub fn from_shared(grid: SharedGrid) -> Result<Self> {
        let (rows, cols) = (grid.rows(), grid.cols());
        let cells = grid.into_rows()?.concat();
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_uses_integer_division() {
        assert_eq!(luminance(&Rgb([255, 255, 255])), 255);
        assert_eq!(luminance(&Rgb([1, 1, 0])), 0);
        assert_eq!(luminance(&Rgb([100, 101, 102])), 101);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(occupancy(&Rgb([100, 100, 100]), 100), 1);
        assert_eq!(occupancy(&Rgb([101, 101, 101]), 100), 0);
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = allocate_grid(64, 40, 8);
        assert_eq!(grid.rows(), 9);
        assert_eq!(grid.cols(), 6);

        // Image smaller than a step still gets the boundary row/column
        let grid = allocate_grid(5, 5, 8);
        assert_eq!((grid.rows(), grid.cols()), (1, 1));
    }

    #[test]
    fn test_mismatched_grid_rejected() {
        let canvas = WorkingImage::blank(16, 16);
        let grid = allocate_grid(8, 8, 4);
        let config = MarchConfig {
            step: 4,
            ..Default::default()
        };
        assert!(matches!(
            sample_slice(&canvas, &grid, 0, 1, &config),
            Err(MarchError::Config(_))
        ));
    }

    #[test]
    fn test_snapshot_layout() {
        let grid = allocate_grid(16, 24, 8);
        grid.set(1, 2, 1).unwrap();
        let snapshot = OccupancyGrid::from_shared(grid).unwrap();
        assert_eq!((snapshot.rows(), snapshot.cols()), (3, 4));
        assert_eq!(snapshot.get(1, 2), 1);
        assert_eq!(snapshot.cells().iter().filter(|&&c| c == 1).count(), 1);
    }
}
