// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Raw sensor file decoders.
//!
//! A [`SensorDecoder`] turns one file into a [`Payload`]. Failures are
//! reported as warnings and yield `None`: a broken file is skipped, never
//! fatal to its scene.

pub mod camera;
pub mod lidar;
pub mod radar;
pub mod registry;

use std::path::Path;

use crate::messages::Payload;
use crate::metadata::SampleData;

pub use camera::CameraDecoder;
pub use lidar::{LidarDecoder, LidarError};
pub use radar::{radar_objects, RadarDecoder, RadarError};
pub use registry::DecoderRegistry;

/// Decoder for the files of one sensor category.
///
/// Decoders are shared by the decode workers and must not keep per-file state.
pub trait SensorDecoder: Send + Sync {
    /// Decode the file at `path`, described by its sample data record.
    fn decode(&self, path: &Path, info: &SampleData) -> Option<Payload>;
}
