// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sensor category and timestamp inference from file and directory names.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::core::{ConvertError, Result};

/// Kind of sensor that produced a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorCategory {
    Camera,
    Lidar,
    Radar,
}

impl fmt::Display for SensorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorCategory::Camera => write!(f, "camera"),
            SensorCategory::Lidar => write!(f, "lidar"),
            SensorCategory::Radar => write!(f, "radar"),
        }
    }
}

/// Name markers, checked in order; the first one found wins.
const CATEGORY_MARKERS: [(&str, SensorCategory); 3] = [
    ("CAM", SensorCategory::Camera),
    ("RADAR", SensorCategory::Radar),
    ("LIDAR", SensorCategory::Lidar),
];

fn match_category(name: &str) -> Option<SensorCategory> {
    let upper = name.to_ascii_uppercase();
    CATEGORY_MARKERS
        .iter()
        .find(|(marker, _)| upper.contains(marker))
        .map(|&(_, category)| category)
}

/// Classify a sensor directory such as `CAM_FRONT` or `LIDAR_TOP`.
pub fn classify_directory(name: &str) -> Option<SensorCategory> {
    let category = match_category(name);
    if category.is_none() {
        warn!(directory = name, "Unknown sensor directory, skipping");
    }
    category
}

/// Classify a sensor file by its name or relative path.
pub fn classify_file(name: &str) -> Option<SensorCategory> {
    let category = match_category(name);
    if category.is_none() {
        warn!(file = name, "Unknown sensor file, skipping");
    }
    category
}

/// Fields encoded in a dataset file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFileNameInfo {
    /// Recording log, e.g. `n015-2018-07-24-11-22-45+0800`
    pub log_name: String,
    /// Sensor channel, e.g. `CAM_FRONT`
    pub channel: String,
    /// Capture time in microseconds
    pub stamp_us: u64,
}

fn file_name_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<log>.+?)__(?P<channel>[A-Z0-9_]+?)__(?P<stamp>\d+)\..+$").ok()
    })
    .as_ref()
}

/// Parse `<log>__<CHANNEL>__<stampUs>.<ext>`. Directory components are ignored.
pub fn extract_file_info(file_name: &str) -> Option<ExtractedFileNameInfo> {
    let base = Path::new(file_name).file_name()?.to_str()?;
    let caps = file_name_regex()?.captures(base)?;
    Some(ExtractedFileNameInfo {
        log_name: caps["log"].to_string(),
        channel: caps["channel"].to_string(),
        stamp_us: caps["stamp"].parse().ok()?,
    })
}

/// A sensor directory under `samples/` or `sweeps/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSetDescriptor {
    pub directory_name: String,
    pub category: SensorCategory,
    pub path: PathBuf,
}

/// Enumerate the classifiable sensor directories of a `samples` or `sweeps` directory.
///
/// Entries are returned sorted by directory name.
pub fn sample_sets_in_directory(dir: impl AsRef<Path>) -> Result<Vec<SampleSetDescriptor>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e.to_string()))?;

    let mut sets = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConvertError::io(dir, e.to_string()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let directory_name = entry.file_name().to_string_lossy().into_owned();
        if let Some(category) = classify_directory(&directory_name) {
            sets.push(SampleSetDescriptor {
                directory_name,
                category,
                path,
            });
        }
    }
    sets.sort_by(|a, b| a.directory_name.cmp(&b.directory_name));
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_directory() {
        assert_eq!(classify_directory("CAM_FRONT"), Some(SensorCategory::Camera));
        assert_eq!(classify_directory("LIDAR_TOP"), Some(SensorCategory::Lidar));
        assert_eq!(
            classify_directory("RADAR_BACK_LEFT"),
            Some(SensorCategory::Radar)
        );
        assert_eq!(classify_directory("MISC_SENSOR"), None);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify_directory("cam_back"), Some(SensorCategory::Camera));
        assert_eq!(
            classify_file("samples/lidar_top/x.pcd.bin"),
            Some(SensorCategory::Lidar)
        );
    }

    #[test]
    fn test_extract_file_info() {
        let info = extract_file_info(
            "samples/CAM_FRONT/n015-2018-07-24-11-22-45+0800__CAM_FRONT__1532402927612460.jpg",
        )
        .unwrap();
        assert_eq!(info.log_name, "n015-2018-07-24-11-22-45+0800");
        assert_eq!(info.channel, "CAM_FRONT");
        assert_eq!(info.stamp_us, 1_532_402_927_612_460);
    }

    #[test]
    fn test_extract_file_info_double_extension() {
        let info =
            extract_file_info("n008-2018-08-01-15-16-36-0400__LIDAR_TOP__1533151603547590.pcd.bin")
                .unwrap();
        assert_eq!(info.channel, "LIDAR_TOP");
        assert_eq!(info.stamp_us, 1_533_151_603_547_590);
    }

    #[test]
    fn test_extract_file_info_malformed() {
        assert!(extract_file_info("CAM_FRONT.jpg").is_none());
        assert!(extract_file_info("log__CAM_FRONT__notanumber.jpg").is_none());
        assert!(extract_file_info("log__CAM_FRONT__123").is_none());
    }

    #[test]
    fn test_sample_sets_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["LIDAR_TOP", "CAM_FRONT", "MISC_SENSOR"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("CAM_NOTE.txt"), b"").unwrap();

        let sets = sample_sets_in_directory(dir.path()).unwrap();
        let names: Vec<_> = sets.iter().map(|s| s.directory_name.as_str()).collect();
        assert_eq!(names, ["CAM_FRONT", "LIDAR_TOP"]);
        assert_eq!(sets[1].category, SensorCategory::Lidar);
    }
}
