// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message serialization for the output logs.

pub mod cdr;

/// MCAP message encoding identifier for CDR payloads.
pub const MESSAGE_ENCODING_CDR: &str = "cdr";

/// MCAP schema encoding identifier for ROS 2 `.msg` definitions.
pub const SCHEMA_ENCODING_ROS2MSG: &str = "ros2msg";
