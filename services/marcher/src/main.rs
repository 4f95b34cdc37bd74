//! Marcher
//!
//! Reads a raster image, extracts its isolines with the parallel marching
//! squares pipeline and writes the stamped contour image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use isoline::{io, Bicubic, DirectoryTiles, MarchConfig, Pipeline};

/// Parallel marching squares
#[derive(Parser, Debug)]
#[command(name = "marcher")]
#[command(about = "Extract isolines from a raster image with a pool of worker threads")]
struct Args {
    /// Input image (PPM, PNG, JPEG, ...)
    input: PathBuf,

    /// Output image; the format follows the extension
    output: PathBuf,

    /// Number of worker threads
    #[arg(value_parser = parse_workers)]
    workers: usize,

    /// Directory holding the 16 contour tiles
    #[arg(long)]
    contours: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "MARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn parse_workers(value: &str) -> std::result::Result<usize, String> {
    let workers: usize = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if workers == 0 {
        return Err("at least one worker is required".to_string());
    }
    Ok(workers)
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_level(true);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Defaults, then the YAML file, then the environment, then flags.
fn load_config(args: &Args) -> Result<MarchConfig> {
    let mut config = match &args.config {
        Some(path) => MarchConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => MarchConfig::default(),
    };
    config.apply_env();

    if let Some(dir) = &args.contours {
        config.contour_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        workers = args.workers,
        contour_dir = %config.contour_dir.display(),
        "Starting marcher"
    );

    let source = io::read_image(&args.input)
        .with_context(|| format!("Failed to read input image {}", args.input.display()))?;

    let tiles = DirectoryTiles::from_config(&config);
    let pipeline = Pipeline::new(config, tiles, Bicubic);
    let output = pipeline
        .run(&source, args.workers)
        .context("Marching squares pipeline failed")?;

    io::write_image(&args.output, &output.image)
        .with_context(|| format!("Failed to write output image {}", args.output.display()))?;

    info!(
        elapsed_ms = output.elapsed.as_millis() as u64,
        "Wrote {}",
        args.output.display()
    );
    Ok(())
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    use test_utils::{block_matches, contour_tile_dir, create_contour_tiles, create_gray_image};

    /// Serializes tests that read the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const MARCH_VARS: [&str; 7] = [
        "MARCH_CONFIG",
        "MARCH_STEP",
        "MARCH_THRESHOLD",
        "MARCH_RESCALE_WIDTH",
        "MARCH_RESCALE_HEIGHT",
        "MARCH_CONTOUR_DIR",
        "MARCH_TILE_EXTENSION",
    ];

    /// Take the environment lock with every `MARCH_*` variable cleared.
    fn clean_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for var in MARCH_VARS {
            std::env::remove_var(var);
        }
        guard
    }

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["marcher"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_positional_arguments() {
        let _env = clean_env();
        let args = parse(&["in.ppm", "out.ppm", "4"]);
        assert_eq!(args.input, PathBuf::from("in.ppm"));
        assert_eq!(args.output, PathBuf::from("out.ppm"));
        assert_eq!(args.workers, 4);
        assert!(args.contours.is_none());
        assert!(args.config.is_none());
        assert!(!args.json_logs);
    }

    #[test]
    fn test_missing_positionals_rejected() {
        let err = Args::try_parse_from(["marcher", "in.ppm", "out.ppm"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Args::try_parse_from(["marcher", "in.ppm", "out.ppm", "0"]).is_err());
        assert!(Args::try_parse_from(["marcher", "in.ppm", "out.ppm", "many"]).is_err());
    }

    #[test]
    fn test_contours_flag_overrides_config_file() {
        let _env = clean_env();
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("march.yaml");
        std::fs::write(&config_path, "step: 4\ncontour_dir: /from/yaml\n").unwrap();

        let args = parse(&[
            "in.ppm",
            "out.ppm",
            "2",
            "--config",
            config_path.to_str().unwrap(),
            "--contours",
            "/from/flag",
        ]);

        let config = load_config(&args).unwrap();
        assert_eq!(config.step, 4);
        assert_eq!(config.contour_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn test_environment_overrides_config_file() {
        let _env = clean_env();
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("march.yaml");
        std::fs::write(&config_path, "step: 4\nthreshold: 90\n").unwrap();

        std::env::set_var("MARCH_STEP", "2");
        let args = parse(&["in.ppm", "out.ppm", "2", "--config", config_path.to_str().unwrap()]);
        let config = load_config(&args);
        std::env::remove_var("MARCH_STEP");

        let config = config.unwrap();
        assert_eq!(config.step, 2);
        assert_eq!(config.threshold, 90);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let _env = clean_env();
        let args = parse(&["in.ppm", "out.ppm", "2", "--config", "/nonexistent/march.yaml"]);

        let err = load_config(&args).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/march.yaml"));
    }

    #[test]
    fn test_failed_run_writes_no_output() {
        let _env = clean_env();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.ppm");
        let output = dir.path().join("out.ppm");
        let contours = dir.path().join("none");
        io::write_image(&input, &create_gray_image(16, 16, 128)).unwrap();

        let args = parse(&[
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "2",
            "--contours",
            contours.to_str().unwrap(),
        ]);

        let err = run(&args).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("failed to load contour tile"), "{message}");
        assert!(!output.exists());
    }

    #[test]
    fn test_run_writes_stamped_image() {
        let _env = clean_env();
        let tile_dir = contour_tile_dir(8);
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.ppm");
        let output = dir.path().join("out.ppm");
        // Luminance 128 is at or below the default threshold: every cell is code 15
        io::write_image(&input, &create_gray_image(16, 16, 128)).unwrap();

        let args = parse(&[
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "3",
            "--contours",
            tile_dir.path().to_str().unwrap(),
        ]);
        run(&args).unwrap();

        let written = io::read_image(&output).unwrap();
        assert_eq!(written.dimensions(), (16, 16));
        let tiles = create_contour_tiles(8);
        for (row, col) in [(0, 0), (0, 8), (8, 0), (8, 8)] {
            assert!(block_matches(&written, &tiles[15], row, col), "block ({row}, {col})");
        }
    }
}
