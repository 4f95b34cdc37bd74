//! Row-locked buffers shared by the worker pool.
//!
//! Each phase of the pipeline writes a disjoint set of rows, so the per-row
//! locks are never contended. They make concurrent disjoint-row writes
//! expressible in safe code; ordering between phases comes from the
//! [`PhaseBarrier`](crate::barrier::PhaseBarrier).

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use image::{Rgb, RgbImage};

use crate::error::{MarchError, Result};

/// A `rows x cols` buffer with one lock per row.
#[derive(Debug)]
pub struct SharedRows<T> {
    cols: usize,
    rows: Vec<RwLock<Vec<T>>>,
    label: &'static str,
}

impl<T: Clone> SharedRows<T> {
    /// Allocate a buffer with every cell set to `fill`.
    ///
    /// `label` names the buffer in lock poisoning errors.
    pub fn new(rows: usize, cols: usize, fill: T, label: &'static str) -> Self {
        let rows = (0..rows)
            .map(|_| RwLock::new(vec![fill.clone(); cols]))
            .collect();
        Self { cols, rows, label }
    }
}

impl<T> SharedRows<T> {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Lock one row for reading.
    pub fn read_row(&self, row: usize) -> Result<RwLockReadGuard<'_, Vec<T>>> {
        self.rows[row]
            .read()
            .map_err(|_| MarchError::Poisoned(self.label))
    }

    /// Lock one row for writing.
    pub fn write_row(&self, row: usize) -> Result<RwLockWriteGuard<'_, Vec<T>>> {
        self.rows[row]
            .write()
            .map_err(|_| MarchError::Poisoned(self.label))
    }

    /// Consume the buffer, returning its rows.
    pub fn into_rows(self) -> Result<Vec<Vec<T>>> {
        let label = self.label;
        self.rows
            .into_iter()
            .map(|row| row.into_inner().map_err(|_| MarchError::Poisoned(label)))
            .collect()
    }
}

impl<T: Copy> SharedRows<T> {
    /// Read a single cell.
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        Ok(self.read_row(row)?[col])
    }

    /// Write a single cell.
    pub fn set(&self, row: usize, col: usize, value: T) -> Result<()> {
        self.write_row(row)?[col] = value;
        Ok(())
    }
}

/// The working image: rescaled in phase 1, sampled in phase 2, overwritten
/// with contour tiles in phase 3.
pub type WorkingImage = SharedRows<Rgb<u8>>;

impl SharedRows<Rgb<u8>> {
    /// Allocate a black working image of `rows x cols` pixels.
    pub fn blank(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, Rgb([0, 0, 0]), "working image")
    }

    /// Copy `source` pixel for pixel. Dimensions must match.
    pub fn copy_from(&self, source: &RgbImage) -> Result<()> {
        if source.height() as usize != self.rows() || source.width() as usize != self.cols() {
            return Err(MarchError::config(format!(
                "cannot copy {}x{} image into {}x{} working image",
                source.width(),
                source.height(),
                self.cols(),
                self.rows()
            )));
        }

        for (row, src_row) in source.rows().enumerate() {
            let mut dst = self.write_row(row)?;
            for (dst_px, src_px) in dst.iter_mut().zip(src_row) {
                *dst_px = *src_px;
            }
        }
        Ok(())
    }

    /// Convert into an owned image once all workers have joined.
    pub fn into_image(self) -> Result<RgbImage> {
        let (width, height) = (self.cols() as u32, self.rows() as u32);
        let mut raw = Vec::with_capacity(self.cols() * self.rows() * 3);
        for row in self.into_rows()? {
            for px in row {
                raw.extend_from_slice(&px.0);
            }
        }
        RgbImage::from_raw(width, height, raw)
            .ok_or_else(|| MarchError::config("working image buffer size mismatch"))
    }
}
