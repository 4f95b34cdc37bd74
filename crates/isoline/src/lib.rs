//! Parallel isoline extraction using the marching squares algorithm.
//!
//! A raster image is rescaled to a fixed working resolution, thresholded into
//! a binary occupancy grid, and every 2x2 grid window is replaced by one of 16
//! pre-rendered contour tiles.
//!
//! # Architecture
//!
//! ```text
//! Pipeline::run(source, N)
//!      │
//!      ├─► spawn N workers (scoped threads)
//!      │
//!      │   worker k:
//!      │     load contour tiles   slice k of 0..16
//!      │     rescale              slice k of the working image rows
//!      │     ── PhaseBarrier::wait ──
//!      │     sample grid          slice k of the grid rows
//!      │     ── PhaseBarrier::wait ──
//!      │     march                slice k of the grid rows
//!      │
//!      └─► join, report a single error or the finished image
//! ```
//!
//! Every phase writes a disjoint row range of a shared buffer, so the only
//! synchronization between workers is the two barrier rendezvous points.
//!
//! # Example
//!
//! ```ignore
//! use isoline::{io, Bicubic, DirectoryTiles, MarchConfig, Pipeline};
//!
//! let config = MarchConfig::default();
//! let tiles = DirectoryTiles::from_config(&config);
//! let pipeline = Pipeline::new(config, tiles, Bicubic);
//!
//! let source = io::read_image("input.ppm")?;
//! let output = pipeline.run(&source, 4)?;
//! io::write_image("output.ppm", &output.image)?;
//! ```

pub mod barrier;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod interpolation;
pub mod io;
pub mod march;
pub mod partition;
pub mod rescale;
pub mod sampling;
pub mod shared;
pub mod tiles;

// Re-export commonly used types at crate root
pub use barrier::PhaseBarrier;
pub use config::MarchConfig;
pub use coordinator::{Pipeline, PipelineOutput, WorkerPhase};
pub use error::{MarchError, Result};
pub use interpolation::{Bicubic, PixelSampler};
pub use sampling::OccupancyGrid;
pub use shared::{SharedRows, WorkingImage};
pub use tiles::{ContourTileSet, DirectoryTiles, MemoryTiles, TileSource, CONTOUR_CONFIG_COUNT};
