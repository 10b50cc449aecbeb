// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # nuscenes2mcap
//!
//! Converts a nuScenes-style dataset (JSON metadata tables plus raw camera,
//! lidar and radar files) into one MCAP log per scene, with ROS 2 CDR
//! messages.
//!
//! ## Architecture
//!
//! - `metadata/` - token-keyed index over the metadata tables
//! - `dataset/` - sensor classification of directories and files
//! - `annotation/` - 3D boxes, keyframe interpolation, visualization markers
//! - `decode/` - raw file decoders (camera, lidar, radar PCD)
//! - `pipeline/` - per-scene concurrent decode and round-robin drain
//! - `convert/` - scene converter and the scene scheduler
//! - `messages/` + `encoding/` - ROS 2 message types and their CDR encoding
//! - `io/` - MCAP writer and the per-scene log
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use nuscenes2mcap::{convert_directory, ConvertConfig};
//!
//! let config = ConvertConfig::default().with_workers(4);
//! let report = convert_directory(
//!     "data/v1.0-mini",
//!     "data",
//!     "out",
//!     &config,
//!     None,
//! )?;
//! println!("{} scenes converted", report.scenes_converted());
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{ConvertError, Result, Token};

// Configuration
pub mod config;

pub use config::{BoxSource, ConvertConfig, LidarLayout};

// Dataset model
pub mod dataset;
pub mod metadata;

pub use dataset::SensorCategory;
pub use metadata::MetadataIndex;

// Message model and encoding
pub mod encoding;
pub mod messages;

pub use messages::{Payload, RosMessage};

// Annotations
pub mod annotation;

pub use annotation::{AnnotationBox, AnnotationInterpolator};

// Decoding and the per-scene pipeline
pub mod decode;
pub mod pipeline;

pub use decode::{DecoderRegistry, SensorDecoder};
pub use pipeline::{MessageSink, TopicMessage};

// Output
pub mod io;

pub use io::{McapWriter, SceneLog};

// Conversion entry points
pub mod convert;

pub use convert::{convert_directory, RunReport, SceneConverter, SceneReport};
