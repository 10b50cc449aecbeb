// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR encoder for writing ROS 2 messages.
//!
//! Produces plain little-endian CDR (XCDR1) as used by `rmw` for ROS 2
//! messages: a 4-byte encapsulation header followed by the message fields,
//! each aligned to its natural size relative to the end of the header.

use super::CDR_HEADER_SIZE;

/// Encapsulation identifier for CDR little-endian.
const CDR_LE: u8 = 0x01;

/// Default initial capacity for the encoder buffer.
const DEFAULT_CAPACITY: usize = 64;

/// CDR encoder for writing CDR-encoded data.
///
/// Every write method returns `&mut Self` so fields can be chained in
/// message order.
///
/// # Example
///
/// ```
/// use nuscenes2mcap::encoding::cdr::CdrEncoder;
///
/// let mut encoder = CdrEncoder::new();
/// encoder.int32(42).string("hello");
/// let data = encoder.finish();
/// assert_eq!(&data[..4], &[0x00, 0x01, 0x00, 0x00]);
/// ```
#[derive(Debug, Clone)]
pub struct CdrEncoder {
    /// Output buffer, including the encapsulation header
    buffer: Vec<u8>,
}

impl Default for CdrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CdrEncoder {
    /// Create a new encoder (CDR, little-endian).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new encoder with the specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Vec::with_capacity(capacity.max(CDR_HEADER_SIZE));
        // Representation identifier followed by two option bytes
        buffer.extend_from_slice(&[0x00, CDR_LE, 0x00, 0x00]);
        Self { buffer }
    }

    /// Get the current size of the encoded data.
    #[must_use]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Get a reference to the encoded data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the encoder and return the encoded data.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    /// Pad with zeros until the body offset is a multiple of `size`.
    fn align(&mut self, size: usize) {
        let misalignment = (self.buffer.len() - CDR_HEADER_SIZE) % size;
        if misalignment > 0 {
            let padded = self.buffer.len() + size - misalignment;
            self.buffer.resize(padded, 0);
        }
    }

    /// Write a boolean as a single byte.
    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.buffer.push(u8::from(value));
        self
    }

    /// Write an 8-bit signed integer.
    pub fn int8(&mut self, value: i8) -> &mut Self {
        self.buffer.push(value as u8);
        self
    }

    /// Write an 8-bit unsigned integer.
    pub fn uint8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    /// Write a 16-bit signed integer.
    pub fn int16(&mut self, value: i16) -> &mut Self {
        self.align(2);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 16-bit unsigned integer.
    pub fn uint16(&mut self, value: u16) -> &mut Self {
        self.align(2);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 32-bit signed integer.
    pub fn int32(&mut self, value: i32) -> &mut Self {
        self.align(4);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 32-bit unsigned integer.
    pub fn uint32(&mut self, value: u32) -> &mut Self {
        self.align(4);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 32-bit float.
    pub fn float32(&mut self, value: f32) -> &mut Self {
        self.align(4);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 64-bit double.
    pub fn float64(&mut self, value: f64) -> &mut Self {
        self.align(8);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a string: u32 length (including the null terminator), bytes, null.
    pub fn string(&mut self, value: &str) -> &mut Self {
        self.uint32((value.len() + 1) as u32);
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.push(0);
        self
    }

    /// Write a sequence length (for dynamic arrays).
    pub fn sequence_length(&mut self, len: usize) -> &mut Self {
        self.uint32(len as u32)
    }

    /// Write a `uint8[]` sequence: length prefix followed by the raw bytes.
    pub fn uint8_sequence(&mut self, data: &[u8]) -> &mut Self {
        self.sequence_length(data.len());
        self.buffer.extend_from_slice(data);
        self
    }

    /// Write a `float64[]` sequence.
    pub fn float64_sequence(&mut self, values: &[f64]) -> &mut Self {
        self.sequence_length(values.len());
        self.float64_array(values)
    }

    /// Write a fixed-size `float64[N]` array (no length prefix).
    pub fn float64_array(&mut self, values: &[f64]) -> &mut Self {
        for &v in values {
            self.float64(v);
        }
        self
    }
}
