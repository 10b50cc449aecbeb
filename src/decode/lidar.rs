// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Lidar sweeps (`.pcd.bin`): packed little-endian `f32` records of
//! x, y, z, intensity and ring index.

use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;
use tracing::warn;

use super::SensorDecoder;
use crate::config::LidarLayout;
use crate::messages::{Payload, PointCloud2, PointField};
use crate::metadata::SampleData;

/// Values per record in the raw sweep.
const RAW_VALUES: usize = 5;
const RAW_RECORD_SIZE: usize = RAW_VALUES * 4;

/// Errors while converting a raw sweep.
#[derive(Debug, Error)]
pub enum LidarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{len} bytes is not a whole number of 20-byte records")]
    PartialRecord { len: usize },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LidarDecoder {
    layout: LidarLayout,
}

impl LidarDecoder {
    pub fn new(layout: LidarLayout) -> Self {
        Self { layout }
    }

    /// Fields of the output cloud, all `float32`.
    pub fn fields(&self) -> Vec<PointField> {
        let names: &[&str] = match self.layout {
            LidarLayout::Xyzi => &["x", "y", "z", "intensity"],
            LidarLayout::Xyzir => &["x", "y", "z", "intensity", "ring"],
        };
        names
            .iter()
            .zip(0u32..)
            .map(|(name, i)| PointField::new(name, i * 4, PointField::FLOAT32))
            .collect()
    }

    /// Convert a raw sweep. Fails on a trailing partial record.
    pub fn convert(&self, raw: &[u8]) -> Result<PointCloud2, LidarError> {
        if raw.len() % RAW_RECORD_SIZE != 0 {
            return Err(LidarError::PartialRecord { len: raw.len() });
        }
        let kept = match self.layout {
            LidarLayout::Xyzi => 4,
            LidarLayout::Xyzir => 5,
        };
        let count = raw.len() / RAW_RECORD_SIZE;

        let mut cursor = Cursor::new(raw);
        let mut data = Vec::with_capacity(count * kept * 4);
        for _ in 0..count {
            for i in 0..RAW_VALUES {
                let value = cursor.read_f32::<LittleEndian>()?;
                if i < kept {
                    data.write_f32::<LittleEndian>(value)?;
                }
            }
        }

        let point_step = (kept * 4) as u32;
        Ok(PointCloud2::unordered(
            self.fields(),
            point_step,
            count as u32,
            data,
        ))
    }
}

impl SensorDecoder for LidarDecoder {
    fn decode(&self, path: &Path, info: &SampleData) -> Option<Payload> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read lidar sweep");
                return None;
            }
        };
        match self.convert(&raw) {
            Ok(cloud) => Some(Payload::PointCloud(cloud)),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    sample_data = %info.token,
                    error = %e,
                    "Failed to decode lidar sweep"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_sweep(points: &[[f32; 5]]) -> Vec<u8> {
        points
            .iter()
            .flatten()
            .flat_map(|v| v.to_le_bytes())
            .collect()
    }

    #[test]
    fn test_xyzi_drops_ring() {
        let raw = raw_sweep(&[[1.0, 2.0, 3.0, 40.0, 7.0], [4.0, 5.0, 6.0, 80.0, 8.0]]);
        let cloud = LidarDecoder::new(LidarLayout::Xyzi).convert(&raw).unwrap();
        assert_eq!(cloud.width, 2);
        assert_eq!(cloud.point_step, 16);
        assert_eq!(cloud.data.len(), 32);
        assert_eq!(cloud.data[16..20], 4.0f32.to_le_bytes());
        assert_eq!(cloud.fields.len(), 4);
    }

    #[test]
    fn test_xyzir_keeps_ring() {
        let raw = raw_sweep(&[[1.0, 2.0, 3.0, 40.0, 7.0]]);
        let cloud = LidarDecoder::new(LidarLayout::Xyzir).convert(&raw).unwrap();
        assert_eq!(cloud.point_step, 20);
        assert_eq!(cloud.data[16..20], 7.0f32.to_le_bytes());
        assert_eq!(cloud.fields[4].name, "ring");
        assert_eq!(cloud.fields[4].offset, 16);
    }

    #[test]
    fn test_partial_record_rejected() {
        let mut raw = raw_sweep(&[[1.0, 2.0, 3.0, 4.0, 5.0]]);
        raw.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(
            LidarDecoder::default().convert(&raw),
            Err(LidarError::PartialRecord { len: 24 })
        ));
    }

    #[test]
    fn test_empty_sweep() {
        let cloud = LidarDecoder::default().convert(&[]).unwrap();
        assert_eq!(cloud.width, 0);
        assert!(cloud.data.is_empty());
    }
}
