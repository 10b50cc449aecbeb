// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR (Common Data Representation) module.
//!
//! Provides CDR encoding of ROS 2 messages for the `cdr` MCAP message encoding.

pub mod encoder;

pub use encoder::CdrEncoder;

/// Size of the encapsulation header preceding every CDR payload.
pub const CDR_HEADER_SIZE: usize = 4;
