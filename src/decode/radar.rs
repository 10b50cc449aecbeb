// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Radar sweeps: PCD v0.7 files with one detection per point.
//!
//! Files are read with `pcd-rs` as dynamic records and mapped to
//! [`RadarObject`]s by field name.

use std::io::Cursor;
use std::path::Path;

use pcd_rs::{DynReader, Field};
use thiserror::Error;
use tracing::warn;

use super::SensorDecoder;
use crate::messages::{Payload, RadarObject, RadarObjects, Vector3};
use crate::metadata::SampleData;

/// Errors while reading a radar sweep.
#[derive(Debug, Error)]
pub enum RadarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid PCD data: {0}")]
    Pcd(String),

    #[error("header declares {declared} points but the file has {available} bytes")]
    Truncated { declared: u64, available: u64 },

    #[error("sweep has no '{0}' field")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RadarDecoder;

/// First element of a field, widened to `f64`.
fn first_value(field: &Field) -> Option<f64> {
    Some(match field {
        Field::I8(v) => f64::from(*v.first()?),
        Field::I16(v) => f64::from(*v.first()?),
        Field::I32(v) => f64::from(*v.first()?),
        Field::U8(v) => f64::from(*v.first()?),
        Field::U16(v) => f64::from(*v.first()?),
        Field::U32(v) => f64::from(*v.first()?),
        Field::F32(v) => f64::from(*v.first()?),
        Field::F64(v) => *v.first()?,
    })
}

/// Build detections from a PCD file held in memory. `x`, `y` and `z` are
/// required; any other missing attribute reads as zero.
pub fn radar_objects(bytes: &[u8]) -> Result<RadarObjects, RadarError> {
    let reader =
        DynReader::from_reader(Cursor::new(bytes)).map_err(|e| RadarError::Pcd(e.to_string()))?;

    let meta = reader.meta();
    // Every point takes at least one byte, whatever the encoding.
    let available = bytes.len() as u64;
    if meta.num_points > available {
        return Err(RadarError::Truncated {
            declared: meta.num_points,
            available,
        });
    }

    let names: Vec<String> = meta
        .field_defs
        .fields
        .iter()
        .map(|def| def.name.clone())
        .collect();
    let column = |name: &str| names.iter().position(|n| n == name);
    let xi = column("x").ok_or(RadarError::MissingField("x"))?;
    let yi = column("y").ok_or(RadarError::MissingField("y"))?;
    let zi = column("z").ok_or(RadarError::MissingField("z"))?;
    let columns: Vec<Option<usize>> = [
        "dyn_prop",
        "id",
        "rcs",
        "vx",
        "vy",
        "vx_comp",
        "vy_comp",
        "is_quality_valid",
        "ambig_state",
        "x_rms",
        "y_rms",
        "invalid_state",
        "pdh0",
        "vx_rms",
        "vy_rms",
    ]
    .iter()
    .map(|name| column(name))
    .collect();

    let mut objects = Vec::new();
    for record in reader {
        let record = record.map_err(|e| RadarError::Pcd(e.to_string()))?;
        let fields = &record.0;
        let value = |index: Option<usize>| {
            index
                .and_then(|i| fields.get(i))
                .and_then(first_value)
                .unwrap_or(0.0)
        };
        let attr = |slot: usize| value(columns[slot]);

        objects.push(RadarObject {
            pose: Vector3 {
                x: value(Some(xi)),
                y: value(Some(yi)),
                z: value(Some(zi)),
            },
            dyn_prop: attr(0) as i8,
            id: attr(1) as i16,
            rcs: attr(2) as f32,
            vx: attr(3) as f32,
            vy: attr(4) as f32,
            vx_comp: attr(5) as f32,
            vy_comp: attr(6) as f32,
            is_quality_valid: attr(7) as i8,
            ambig_state: attr(8) as i8,
            x_rms: attr(9) as i8,
            y_rms: attr(10) as i8,
            invalid_state: attr(11) as i8,
            pdh0: attr(12) as i8,
            vx_rms: attr(13) as i8,
            vy_rms: attr(14) as i8,
        });
    }

    Ok(RadarObjects {
        header: Default::default(),
        objects,
    })
}

impl SensorDecoder for RadarDecoder {
    fn decode(&self, path: &Path, info: &SampleData) -> Option<Payload> {
        let result = std::fs::read(path)
            .map_err(RadarError::from)
            .and_then(|bytes| radar_objects(&bytes));
        match result {
            Ok(objects) => Some(Payload::Radar(objects)),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    sample_data = %info.token,
                    error = %e,
                    "Failed to decode radar sweep"
                );
                None
            }
        }
    }
}
