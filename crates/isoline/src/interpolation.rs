//! Pixel sampling kernels used by the rescaler.

use image::{Rgb, RgbImage};

/// Samples an image at normalized coordinates.
pub trait PixelSampler: Sync {
    /// Interpolated pixel at `(u, v)`, both in `[0, 1]`.
    ///
    /// `u` runs down the rows, `v` across the columns; `(0, 0)` is the
    /// top-left pixel and `(1, 1)` the bottom-right one.
    fn sample(&self, image: &RgbImage, u: f32, v: f32) -> Rgb<u8>;
}

/// Bicubic interpolation.
///
/// Uses the 16 surrounding pixels with a Catmull-Rom spline per channel,
/// clamping reads at the image edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bicubic;

impl PixelSampler for Bicubic {
    fn sample(&self, image: &RgbImage, u: f32, v: f32) -> Rgb<u8> {
        let (width, height) = image.dimensions();
        let x = v.clamp(0.0, 1.0) * (width.saturating_sub(1)) as f32;
        let y = u.clamp(0.0, 1.0) * (height.saturating_sub(1)) as f32;

        let xi = x.floor() as i64;
        let yi = y.floor() as i64;
        let xf = x - xi as f32;
        let yf = y - yi as f32;

        // Sample 4x4 grid of points
        let mut values = [[[0.0f32; 3]; 4]; 4];
        for (j, row) in values.iter_mut().enumerate() {
            let py = (yi + j as i64 - 1).clamp(0, height as i64 - 1) as u32;
            for (i, value) in row.iter_mut().enumerate() {
                let px = (xi + i as i64 - 1).clamp(0, width as i64 - 1) as u32;
                let pixel = image.get_pixel(px, py);
                for c in 0..3 {
                    value[c] = pixel[c] as f32;
                }
            }
        }

        let mut out = [0u8; 3];
        for (c, channel) in out.iter_mut().enumerate() {
            // Cubic interpolation along x for each row, then along y
            let mut column = [0.0f32; 4];
            for j in 0..4 {
                column[j] = cubic_1d(
                    values[j][0][c],
                    values[j][1][c],
                    values[j][2][c],
                    values[j][3][c],
                    xf,
                );
            }
            let value = cubic_1d(column[0], column[1], column[2], column[3], yf);
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }

        Rgb(out)
    }
}

/// 1D cubic interpolation using Catmull-Rom spline.
fn cubic_1d(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    // Catmull-Rom coefficients
    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}
