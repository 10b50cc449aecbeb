// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoder lookup by sensor category.
//!
//! # Example
//!
//! ```
//! use nuscenes2mcap::config::ConvertConfig;
//! use nuscenes2mcap::dataset::SensorCategory;
//! use nuscenes2mcap::decode::DecoderRegistry;
//!
//! let registry = DecoderRegistry::with_defaults(&ConvertConfig::default());
//! assert!(registry.get(SensorCategory::Lidar).is_some());
//! ```

use std::collections::HashMap;

use super::{CameraDecoder, LidarDecoder, RadarDecoder, SensorDecoder};
use crate::config::ConvertConfig;
use crate::dataset::SensorCategory;

/// Maps each sensor category to its decoder.
///
/// Filled before conversion starts and read concurrently afterwards.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: HashMap<SensorCategory, Box<dyn SensorDecoder>>,
}

impl DecoderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in camera, lidar and radar decoders.
    pub fn with_defaults(config: &ConvertConfig) -> Self {
        let mut registry = Self::new();
        registry.register(SensorCategory::Camera, Box::new(CameraDecoder));
        registry.register(
            SensorCategory::Lidar,
            Box::new(LidarDecoder::new(config.lidar_layout)),
        );
        registry.register(SensorCategory::Radar, Box::new(RadarDecoder));
        registry
    }

    /// Register a decoder, replacing any previous one for the category.
    pub fn register(&mut self, category: SensorCategory, decoder: Box<dyn SensorDecoder>) {
        self.decoders.insert(category, decoder);
    }

    /// Get the decoder for a category.
    pub fn get(&self, category: SensorCategory) -> Option<&dyn SensorDecoder> {
        self.decoders.get(&category).map(|d| d.as_ref())
    }

    /// Get the number of registered decoders.
    pub fn count(&self) -> usize {
        self.decoders.len()
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut categories: Vec<String> = self.decoders.keys().map(|c| c.to_string()).collect();
        categories.sort();
        f.debug_struct("DecoderRegistry")
            .field("categories", &categories)
            .finish()
    }
}
