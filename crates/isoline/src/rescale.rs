//! Phase 1: produce the fixed-resolution working image.

use image::RgbImage;
use tracing::debug;

use crate::config::MarchConfig;
use crate::error::Result;
use crate::interpolation::PixelSampler;
use crate::partition::slice_bounds;
use crate::shared::WorkingImage;

/// Whether `source` already fits inside the rescale target.
pub fn fits_target(source: &RgbImage, config: &MarchConfig) -> bool {
    source.width() as usize <= config.rescale_width
        && source.height() as usize <= config.rescale_height
}

/// Working image dimensions as `(rows, cols)`.
///
/// Sources that fit inside the target keep their own size; anything larger
/// is resampled to exactly `rescale_height x rescale_width`.
pub fn working_dimensions(source: &RgbImage, config: &MarchConfig) -> (usize, usize) {
    if fits_target(source, config) {
        (source.height() as usize, source.width() as usize)
    } else {
        (config.rescale_height, config.rescale_width)
    }
}

/// Fill worker `id`'s share of the working image.
///
/// When the source fits the target, worker 0 copies it whole and the other
/// workers have nothing to do. Otherwise each worker resamples its own slice
/// of target rows.
pub fn rescale_slice(
    source: &RgbImage,
    canvas: &WorkingImage,
    id: usize,
    workers: usize,
    sampler: &dyn PixelSampler,
) -> Result<()> {
    let rows = canvas.rows();
    let cols = canvas.cols();

    if source.height() as usize == rows && source.width() as usize == cols {
        if id == 0 {
            debug!(worker = id, rows, cols, "Copying source into working image");
            canvas.copy_from(source)?;
        }
        return Ok(());
    }

    let row_span = rows.saturating_sub(1).max(1) as f32;
    let col_span = cols.saturating_sub(1).max(1) as f32;

    let range = slice_bounds(id, workers, rows);
    debug!(worker = id, start = range.start, end = range.end, "Rescaling rows");

    for i in range {
        let u = i as f32 / row_span;
        let mut row = canvas.write_row(i)?;
        for (j, pixel) in row.iter_mut().enumerate() {
            let v = j as f32 / col_span;
            *pixel = sampler.sample(source, u, v);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::Bicubic;
    use image::Rgb;

    fn small_target() -> MarchConfig {
        MarchConfig {
            rescale_width: 16,
            rescale_height: 12,
            ..Default::default()
        }
    }

    #[test]
    fn test_working_dimensions() {
        let config = small_target();

        let fits = RgbImage::new(10, 12);
        assert_eq!(working_dimensions(&fits, &config), (12, 10));

        // Too tall, even though narrow enough
        let tall = RgbImage::new(10, 13);
        assert_eq!(working_dimensions(&tall, &config), (12, 16));
    }

    #[test]
    fn test_copy_happens_on_worker_zero_only() {
        let config = small_target();
        let source = RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]));
        let (rows, cols) = working_dimensions(&source, &config);
        let canvas = WorkingImage::blank(rows, cols);

        // Other workers leave the canvas untouched
        rescale_slice(&source, &canvas, 1, 2, &Bicubic).unwrap();
        assert_eq!(canvas.get(0, 0).unwrap(), Rgb([0, 0, 0]));

        rescale_slice(&source, &canvas, 0, 2, &Bicubic).unwrap();
        assert_eq!(canvas.into_image().unwrap(), source);
    }

    #[test]
    fn test_slice_writes_only_its_rows() {
        let config = small_target();
        let source = RgbImage::from_pixel(40, 40, Rgb([200, 100, 50]));
        let (rows, cols) = working_dimensions(&source, &config);
        let canvas = WorkingImage::blank(rows, cols);

        // Worker 1 of 3 owns rows 4..8
        rescale_slice(&source, &canvas, 1, 3, &Bicubic).unwrap();
        assert_eq!(canvas.get(3, 0).unwrap(), Rgb([0, 0, 0]));
        assert_eq!(canvas.get(4, 0).unwrap(), Rgb([200, 100, 50]));
        assert_eq!(canvas.get(7, 15).unwrap(), Rgb([200, 100, 50]));
        assert_eq!(canvas.get(8, 0).unwrap(), Rgb([0, 0, 0]));
    }
}
