//! Worker pool coordinator.
//!
//! Spawns a fixed pool of N workers. Each one loads its slice of the contour
//! tiles, rescales its slice of the working image, samples its slice of the
//! grid and marches its slice of the grid, with a full barrier after the
//! rescale and after the sampling phase.
//!
//! If any worker fails, it aborts the barrier so its peers stop at their next
//! rendezvous, and the coordinator reports a single error once everyone has
//! joined.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use image::RgbImage;
use tracing::{debug, error, info};

use crate::barrier::PhaseBarrier;
use crate::config::MarchConfig;
use crate::error::{MarchError, Result};
use crate::interpolation::PixelSampler;
use crate::march::march_slice;
use crate::rescale::{rescale_slice, working_dimensions};
use crate::sampling::{allocate_grid, sample_slice, OccupancyGrid, SharedGrid};
use crate::shared::WorkingImage;
use crate::tiles::{ContourTileSet, TileSource};

/// Lifecycle of a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Created,
    LoadingTiles,
    Rescaling,
    Sampling,
    Marching,
    Joined,
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::LoadingTiles => "loading_tiles",
            Self::Rescaling => "rescaling",
            Self::Sampling => "sampling",
            Self::Marching => "marching",
            Self::Joined => "joined",
        };
        f.write_str(name)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The working image with every cell replaced by its contour tile.
    pub image: RgbImage,
    /// The occupancy grid the tiles were chosen from.
    pub grid: OccupancyGrid,
    /// Wall-clock time from allocation to join.
    pub elapsed: Duration,
}

/// Marching squares over a worker pool.
#[derive(Debug, Clone)]
pub struct Pipeline<T, S> {
    config: MarchConfig,
    tiles: T,
    sampler: S,
}

impl<T: TileSource, S: PixelSampler> Pipeline<T, S> {
    pub fn new(config: MarchConfig, tiles: T, sampler: S) -> Self {
        Self {
            config,
            tiles,
            sampler,
        }
    }

    pub fn config(&self) -> &MarchConfig {
        &self.config
    }

    /// Run every phase over `source` with `workers` threads.
    ///
    /// Either the whole pipeline succeeds or a single error is returned; no
    /// partial output is ever produced.
    pub fn run(&self, source: &RgbImage, workers: usize) -> Result<PipelineOutput> {
        self.config.validate()?;
        if workers == 0 {
            return Err(MarchError::InvalidWorkerCount(workers));
        }
        if source.width() == 0 || source.height() == 0 {
            return Err(MarchError::config("source image is empty"));
        }

        let started = Instant::now();
        let (rows, cols) = working_dimensions(source, &self.config);
        let canvas = WorkingImage::blank(rows, cols);
        let grid = allocate_grid(rows, cols, self.config.step);
        let tiles = ContourTileSet::new();
        let barrier = PhaseBarrier::new(workers)?;

        info!(
            workers,
            source_width = source.width(),
            source_height = source.height(),
            rows,
            cols,
            step = self.config.step,
            threshold = self.config.threshold,
            "Starting marching squares"
        );

        let outcomes = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            let mut spawn_error = None;

            for id in 0..workers {
                let task = WorkerTask {
                    id,
                    workers,
                    config: &self.config,
                    source,
                    tile_source: &self.tiles,
                    sampler: &self.sampler,
                    tiles: &tiles,
                    canvas: &canvas,
                    grid: &grid,
                    barrier: &barrier,
                };

                let spawned = thread::Builder::new()
                    .name(format!("march-worker-{id}"))
                    .spawn_scoped(scope, move || task.run());

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        // Workers already running would wait for this one forever
                        barrier.abort();
                        spawn_error = Some(MarchError::Spawn(err));
                        break;
                    }
                }
            }

            let mut outcomes: Vec<Result<()>> = handles
                .into_iter()
                .enumerate()
                .map(|(id, handle)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(MarchError::WorkerPanicked(id)))
                })
                .collect();
            if let Some(err) = spawn_error {
                outcomes.push(Err(err));
            }
            outcomes
        });

        if let Some(err) = first_failure(outcomes) {
            error!(error = %err, "Marching squares failed");
            return Err(err);
        }

        let image = canvas.into_image()?;
        let grid = OccupancyGrid::from_shared(grid)?;
        let elapsed = started.elapsed();

        info!(
            width = image.width(),
            height = image.height(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Marching squares complete"
        );

        Ok(PipelineOutput {
            image,
            grid,
            elapsed,
        })
    }
}

/// The error to report for a run: the first root cause in worker order, or
/// a barrier abort if nothing else failed.
fn first_failure(outcomes: Vec<Result<()>>) -> Option<MarchError> {
    let mut secondary = None;
    for outcome in outcomes {
        if let Err(err) = outcome {
            if !err.is_secondary() {
                return Some(err);
            }
            secondary.get_or_insert(err);
        }
    }
    secondary
}

/// Everything one worker needs, borrowed from the coordinator for the
/// lifetime of the run.
struct WorkerTask<'a> {
    id: usize,
    workers: usize,
    config: &'a MarchConfig,
    source: &'a RgbImage,
    tile_source: &'a dyn TileSource,
    sampler: &'a dyn PixelSampler,
    tiles: &'a ContourTileSet,
    canvas: &'a WorkingImage,
    grid: &'a SharedGrid,
    barrier: &'a PhaseBarrier,
}

impl WorkerTask<'_> {
    fn run(self) -> Result<()> {
        let _guard = AbortOnPanic(self.barrier);
        self.enter(WorkerPhase::Created);

        let result = self.run_phases();
        match &result {
            Ok(()) => self.enter(WorkerPhase::Joined),
            Err(err) if err.is_secondary() => {
                debug!(worker = self.id, "Worker released by aborted barrier");
            }
            Err(err) => {
                error!(worker = self.id, error = %err, "Worker failed");
                self.barrier.abort();
            }
        }
        result
    }

    fn run_phases(&self) -> Result<()> {
        let (id, workers) = (self.id, self.workers);

        self.enter(WorkerPhase::LoadingTiles);
        self.tiles
            .load_slice(self.tile_source, id, workers, self.config.step)?;

        self.enter(WorkerPhase::Rescaling);
        rescale_slice(self.source, self.canvas, id, workers, self.sampler)?;

        self.barrier.wait()?;

        self.enter(WorkerPhase::Sampling);
        sample_slice(self.canvas, self.grid, id, workers, self.config)?;

        self.barrier.wait()?;

        self.enter(WorkerPhase::Marching);
        march_slice(
            self.grid,
            self.tiles,
            self.canvas,
            id,
            workers,
            self.config.step,
        )
    }

    fn enter(&self, phase: WorkerPhase) {
        debug!(worker = self.id, phase = %phase, "Worker phase");
    }
}

/// Aborts the barrier if the worker unwinds, so peers are not left waiting.
struct AbortOnPanic<'a>(&'a PhaseBarrier);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}
