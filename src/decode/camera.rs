// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Camera frames are stored compressed and forwarded as-is.

use std::path::Path;

use tracing::warn;

use super::SensorDecoder;
use crate::messages::{CompressedImage, Payload};
use crate::metadata::SampleData;

#[derive(Debug, Clone, Copy, Default)]
pub struct CameraDecoder;

/// `CompressedImage.format` for a file extension.
pub fn image_format(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "jpeg".to_string(),
        _ => ext,
    }
}

impl SensorDecoder for CameraDecoder {
    fn decode(&self, path: &Path, info: &SampleData) -> Option<Payload> {
        match std::fs::read(path) {
            Ok(data) => Some(Payload::Image(CompressedImage::new(image_format(path), data))),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    sample_data = %info.token,
                    error = %e,
                    "Failed to read camera image"
                );
                None
            }
        }
    }
}
