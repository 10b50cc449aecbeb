// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MCAP container output.

pub mod constants;
pub mod writer;

pub use writer::{McapWriter, WriterOptions, WriterSummary};
