// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Raw sensor file layout of the dataset.

pub mod classify;

pub use classify::{
    classify_directory, classify_file, extract_file_info, sample_sets_in_directory,
    ExtractedFileNameInfo, SampleSetDescriptor, SensorCategory,
};
