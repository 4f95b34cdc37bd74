//! Contour tile set: one small bitmap per 4-bit cell configuration.
//!
//! Tiles are loaded in parallel, each worker filling a disjoint slice of the
//! 16 slots, and are read-only once the pipeline reaches the march phase.

use std::path::PathBuf;
use std::sync::OnceLock;

use image::RgbImage;
use tracing::debug;

use crate::config::MarchConfig;
use crate::error::{MarchError, Result};
use crate::partition::slice_bounds;

/// Number of marching squares cell configurations.
pub const CONTOUR_CONFIG_COUNT: usize = 16;

/// Somewhere contour tiles can be loaded from.
pub trait TileSource: Sync {
    /// Load the tile for configuration `code` (0-15).
    fn load(&self, code: usize) -> Result<RgbImage>;
}

/// Tiles stored as `<dir>/<code>.<extension>` files.
#[derive(Debug, Clone)]
pub struct DirectoryTiles {
    dir: PathBuf,
    extension: String,
}

impl DirectoryTiles {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Use the directory and extension from `config`.
    pub fn from_config(config: &MarchConfig) -> Self {
        Self::new(config.contour_dir.clone(), config.tile_extension.clone())
    }

    /// Path of the tile file for `code`.
    pub fn path(&self, code: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", code, self.extension))
    }
}

impl TileSource for DirectoryTiles {
    fn load(&self, code: usize) -> Result<RgbImage> {
        let path = self.path(code);
        let tile = image::open(&path)
            .map_err(|source| MarchError::TileLoad {
                code,
                path: path.clone(),
                source,
            })?
            .to_rgb8();
        debug!(code, path = %path.display(), width = tile.width(), height = tile.height(), "Loaded contour tile");
        Ok(tile)
    }
}

/// Tiles already decoded in memory, indexed by configuration code.
#[derive(Debug, Clone)]
pub struct MemoryTiles(pub Vec<RgbImage>);

impl TileSource for MemoryTiles {
    fn load(&self, code: usize) -> Result<RgbImage> {
        self.0.get(code).cloned().ok_or(MarchError::TileMissing(code))
    }
}

/// The 16-slot contour tile table.
#[derive(Debug, Default)]
pub struct ContourTileSet {
    slots: [OnceLock<RgbImage>; CONTOUR_CONFIG_COUNT],
}

impl ContourTileSet {
    /// An empty table; every slot must be filled before marching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load this worker's slice of the 16 tiles into their slots.
    ///
    /// Each tile must fit inside a `step x step` cell.
    pub fn load_slice(
        &self,
        source: &dyn TileSource,
        id: usize,
        workers: usize,
        step: usize,
    ) -> Result<()> {
        for code in slice_bounds(id, workers, CONTOUR_CONFIG_COUNT) {
            let tile = source.load(code)?;
            if tile.width() as usize > step || tile.height() as usize > step {
                return Err(MarchError::TileOversized {
                    code,
                    width: tile.width(),
                    height: tile.height(),
                    step,
                });
            }
            // Slots are partitioned, so a slot is never set twice within a run
            let _ = self.slots[code].set(tile);
        }
        Ok(())
    }

    /// Load every tile on the calling thread.
    pub fn load_all(source: &dyn TileSource, step: usize) -> Result<Self> {
        let set = Self::new();
        set.load_slice(source, 0, 1, step)?;
        Ok(set)
    }

    /// The tile for configuration `code`.
    pub fn tile(&self, code: usize) -> Result<&RgbImage> {
        self.slots
            .get(code)
            .and_then(OnceLock::get)
            .ok_or(MarchError::TileMissing(code))
    }

    /// Whether all 16 slots are filled.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| slot.get().is_some())
    }
}
