// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # nuscenes2mcap CLI
//!
//! Converts a nuScenes dataset into one MCAP file per scene.
//!
//! ## Usage
//!
//! ```sh
//! # Convert every scene with 4 scene workers
//! nuscenes2mcap -m data/v1.0-mini -d data -o out -j 4
//!
//! # Convert a single scene by number, name or token
//! nuscenes2mcap -m data/v1.0-mini -d data -o out -s 61
//! ```

mod common;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use common::Result;
use nuscenes2mcap::{convert_directory, BoxSource, ConvertConfig, LidarLayout};

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// nuscenes2mcap - nuScenes to MCAP converter
///
/// Writes `<out>/<scene number>.mcap` for each scene, containing odometry,
/// transforms, annotation boxes and markers, and camera, lidar and radar data.
#[derive(Parser, Clone, Debug)]
#[command(name = "nuscenes2mcap")]
#[command(about = "Convert nuScenes datasets into per-scene MCAP logs", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Metadata directory holding the JSON tables (e.g. data/v1.0-mini)
    #[arg(short, long, value_name = "DIR")]
    meta: PathBuf,

    /// Dataset root containing samples/ and sweeps/
    #[arg(short, long, value_name = "DIR")]
    dataset: PathBuf,

    /// Output directory, created if missing
    #[arg(short, long, value_name = "DIR")]
    out: PathBuf,

    /// Number of scenes converted concurrently
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Threads of the shared decode pool
    #[arg(long, value_name = "N")]
    decode_threads: Option<usize>,

    /// Convert only this scene (number, name or token)
    #[arg(short, long, value_name = "SCENE")]
    scene: Option<String>,

    /// TOML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sample data that receive annotation boxes: all or lidar
    #[arg(long, value_name = "SOURCE")]
    boxes: Option<BoxSource>,

    /// Lidar point layout: xyzi or xyzir
    #[arg(long, value_name = "LAYOUT")]
    lidar_layout: Option<LidarLayout>,

    /// Do not write camera_info topics
    #[arg(long)]
    no_camera_info: bool,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load_config(&self) -> Result<ConvertConfig> {
        let mut config = match &self.config {
            Some(path) => ConvertConfig::from_toml_file(path)?,
            None => ConvertConfig::default(),
        };
        if let Some(jobs) = self.jobs {
            config = config.with_workers(jobs);
        }
        if let Some(threads) = self.decode_threads {
            config.decode_threads = threads;
        }
        if let Some(boxes) = self.boxes {
            config = config.with_box_source(boxes);
        }
        if let Some(layout) = self.lidar_layout {
            config = config.with_lidar_layout(layout);
        }
        if self.no_camera_info {
            config.camera_info = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.load_config()?;
    let report = convert_directory(
        &cli.meta,
        &cli.dataset,
        &cli.out,
        &config,
        cli.scene.as_deref(),
    )?;
    common::print_report(&report);
    Ok(report.is_success())
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
