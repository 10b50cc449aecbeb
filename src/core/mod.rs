// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout nuscenes2mcap.
//!
//! This module provides the foundational types for the library:
//! - [`ConvertError`] - Error taxonomy of the converter
//! - [`Token`] - Opaque relational key of the dataset tables
//! - Timestamp helpers for the dataset's microsecond clock

pub mod error;

pub use error::{ConvertError, Result};

/// Opaque unique identifier used for all relational references.
///
/// Tokens carry no meaning beyond identity and equality. An empty token marks
/// the absence of a link (e.g. the `prev` of the first sample in a scene).
pub type Token = String;

/// Microseconds per second, the resolution of dataset timestamps.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Convert a dataset timestamp (microseconds) to log time (nanoseconds).
#[inline]
pub fn micros_to_nanos(stamp_us: u64) -> u64 {
    stamp_us.saturating_mul(1_000)
}

/// Split a microsecond timestamp into whole seconds and nanoseconds.
#[inline]
pub fn split_micros(stamp_us: u64) -> (i32, u32) {
    let secs = stamp_us / MICROS_PER_SEC;
    let nanos = (stamp_us % MICROS_PER_SEC) * 1_000;
    (secs as i32, nanos as u32)
}
