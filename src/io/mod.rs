// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Output layer.
//!
//! - [`mcap`] - chunked MCAP container writer
//! - [`scene_log`] - one MCAP file per scene, keyed by topic

pub mod mcap;
pub mod scene_log;

pub use self::mcap::{McapWriter, WriterOptions, WriterSummary};
pub use scene_log::SceneLog;
