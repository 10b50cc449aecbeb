// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Conversion options.
//!
//! [`ConvertConfig`] can be loaded from a TOML file; every key is optional
//! and falls back to its default:
//!
//! ```toml
//! workers = 4
//! decode_threads = 8
//! queue_capacity = 64
//! compression_level = 3
//! chunk_size = 4194304
//! box_source = "lidar"
//! lidar_layout = "xyzir"
//! camera_info = true
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{ConvertError, Result};

/// Default capacity of each per-topic decode queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default zstd level for MCAP chunks.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Default uncompressed size at which an MCAP chunk is flushed.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Which sample data records receive `boxes` / `boxes_viz` messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxSource {
    /// Every classified sample data record
    #[default]
    All,
    /// Only lidar sweeps
    Lidar,
}

impl FromStr for BoxSource {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(BoxSource::All),
            "lidar" => Ok(BoxSource::Lidar),
            other => Err(ConvertError::invalid_config(
                "box_source",
                format!("expected 'all' or 'lidar', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for BoxSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxSource::All => write!(f, "all"),
            BoxSource::Lidar => write!(f, "lidar"),
        }
    }
}

/// Point fields emitted for lidar sweeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LidarLayout {
    /// x, y, z, intensity
    #[default]
    Xyzi,
    /// x, y, z, intensity, ring
    Xyzir,
}

impl FromStr for LidarLayout {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xyzi" => Ok(LidarLayout::Xyzi),
            "xyzir" => Ok(LidarLayout::Xyzir),
            other => Err(ConvertError::invalid_config(
                "lidar_layout",
                format!("expected 'xyzi' or 'xyzir', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for LidarLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LidarLayout::Xyzi => write!(f, "xyzi"),
            LidarLayout::Xyzir => write!(f, "xyzir"),
        }
    }
}

/// Options for a conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Number of scenes converted concurrently
    pub workers: usize,

    /// Threads in the shared sensor decode pool
    pub decode_threads: usize,

    /// Capacity of each per-topic decode queue
    pub queue_capacity: usize,

    /// zstd compression level for MCAP chunks
    pub compression_level: i32,

    /// Uncompressed chunk size in bytes
    pub chunk_size: usize,

    /// Which sample data records get annotation boxes
    pub box_source: BoxSource,

    /// Lidar point fields
    pub lidar_layout: LidarLayout,

    /// Whether to write `<sensor>/camera_info` next to camera frames
    pub camera_info: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        let cpus = num_cpus::get().max(1);
        Self {
            workers: cpus,
            decode_threads: cpus,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            chunk_size: DEFAULT_CHUNK_SIZE,
            box_source: BoxSource::default(),
            lidar_layout: LidarLayout::default(),
            camera_info: true,
        }
    }
}

impl ConvertConfig {
    /// Load options from a TOML file. Missing keys keep their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConvertError::io(path, e.to_string()))?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ConvertError::ParseError { message, .. } => {
                ConvertError::parse(path.display().to_string(), message)
            }
            other => other,
        })
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ConvertConfig =
            toml::from_str(text).map_err(|e| ConvertError::parse("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the number of concurrent scene workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set which sample data records receive boxes.
    pub fn with_box_source(mut self, box_source: BoxSource) -> Self {
        self.box_source = box_source;
        self
    }

    /// Set the lidar point layout.
    pub fn with_lidar_layout(mut self, layout: LidarLayout) -> Self {
        self.lidar_layout = layout;
        self
    }

    /// Reject values the converter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ConvertError::invalid_config("workers", "must be positive"));
        }
        if self.decode_threads == 0 {
            return Err(ConvertError::invalid_config(
                "decode_threads",
                "must be positive",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ConvertError::invalid_config(
                "queue_capacity",
                "must be positive",
            ));
        }
        if self.chunk_size == 0 {
            return Err(ConvertError::invalid_config("chunk_size", "must be positive"));
        }
        if !(1..=22).contains(&self.compression_level) {
            return Err(ConvertError::invalid_config(
                "compression_level",
                format!("{} is outside 1..=22", self.compression_level),
            ));
        }
        Ok(())
    }
}
