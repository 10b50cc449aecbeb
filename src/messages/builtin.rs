// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Building-block types from `builtin_interfaces`, `std_msgs` and `geometry_msgs`.

use glam::{DQuat, DVec3};

use super::MsgDef;
use crate::core::split_micros;
use crate::encoding::cdr::CdrEncoder;

pub(crate) const TIME: MsgDef = MsgDef {
    name: "builtin_interfaces/Time",
    text: "int32 sec\nuint32 nanosec\n",
};

pub(crate) const DURATION: MsgDef = MsgDef {
    name: "builtin_interfaces/Duration",
    text: "int32 sec\nuint32 nanosec\n",
};

pub(crate) const HEADER: MsgDef = MsgDef {
    name: "std_msgs/Header",
    text: "builtin_interfaces/Time stamp\nstring frame_id\n",
};

pub(crate) const COLOR_RGBA: MsgDef = MsgDef {
    name: "std_msgs/ColorRGBA",
    text: "float32 r\nfloat32 g\nfloat32 b\nfloat32 a\n",
};

pub(crate) const VECTOR3: MsgDef = MsgDef {
    name: "geometry_msgs/Vector3",
    text: "float64 x\nfloat64 y\nfloat64 z\n",
};

pub(crate) const POINT: MsgDef = MsgDef {
    name: "geometry_msgs/Point",
    text: "float64 x\nfloat64 y\nfloat64 z\n",
};

pub(crate) const QUATERNION: MsgDef = MsgDef {
    name: "geometry_msgs/Quaternion",
    text: "float64 x 0\nfloat64 y 0\nfloat64 z 0\nfloat64 w 1\n",
};

pub(crate) const POSE: MsgDef = MsgDef {
    name: "geometry_msgs/Pose",
    text: "Point position\nQuaternion orientation\n",
};

pub(crate) const TRANSFORM: MsgDef = MsgDef {
    name: "geometry_msgs/Transform",
    text: "Vector3 translation\nQuaternion rotation\n",
};

pub(crate) const TRANSFORM_STAMPED: MsgDef = MsgDef {
    name: "geometry_msgs/TransformStamped",
    text: "std_msgs/Header header\nstring child_frame_id\nTransform transform\n",
};

/// `builtin_interfaces/Time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

impl Time {
    /// Convert a dataset timestamp in microseconds.
    pub fn from_micros(stamp_us: u64) -> Self {
        let (sec, nanosec) = split_micros(stamp_us);
        Self { sec, nanosec }
    }

    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        encoder.int32(self.sec).uint32(self.nanosec);
    }
}

/// `builtin_interfaces/Duration`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Duration {
    pub sec: i32,
    pub nanosec: u32,
}

impl Duration {
    /// Build a duration from fractional seconds.
    pub fn from_secs_f64(secs: f64) -> Self {
        let whole = secs.trunc();
        Self {
            sec: whole as i32,
            nanosec: ((secs - whole) * 1e9).round() as u32,
        }
    }

    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        encoder.int32(self.sec).uint32(self.nanosec);
    }
}

/// `std_msgs/Header`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub stamp: Time,
    pub frame_id: String,
}

impl Header {
    pub fn new(frame_id: impl Into<String>, stamp_us: u64) -> Self {
        Self {
            stamp: Time::from_micros(stamp_us),
            frame_id: frame_id.into(),
        }
    }

    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        self.stamp.encode(encoder);
        encoder.string(&self.frame_id);
    }
}

/// `std_msgs/ColorRGBA`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorRGBA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRGBA {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        encoder
            .float32(self.r)
            .float32(self.g)
            .float32(self.b)
            .float32(self.a);
    }
}

/// `geometry_msgs/Vector3`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn from_array(v: [f64; 3]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }

    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        encoder.float64(self.x).float64(self.y).float64(self.z);
    }
}

impl From<DVec3> for Vector3 {
    fn from(v: DVec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// `geometry_msgs/Point`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        encoder.float64(self.x).float64(self.y).float64(self.z);
    }
}

impl From<DVec3> for Point {
    fn from(v: DVec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// `geometry_msgs/Quaternion`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Build from the dataset's scalar-first `[w, x, y, z]` layout.
    pub fn from_wxyz(q: [f64; 4]) -> Self {
        Self {
            w: q[0],
            x: q[1],
            y: q[2],
            z: q[3],
        }
    }

    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        encoder
            .float64(self.x)
            .float64(self.y)
            .float64(self.z)
            .float64(self.w);
    }
}

impl From<DQuat> for Quaternion {
    fn from(q: DQuat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

/// `geometry_msgs/Pose`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

impl Pose {
    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        self.position.encode(encoder);
        self.orientation.encode(encoder);
    }
}

/// `geometry_msgs/Transform`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

impl Transform {
    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        self.translation.encode(encoder);
        self.rotation.encode(encoder);
    }
}

/// `geometry_msgs/TransformStamped`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformStamped {
    pub header: Header,
    pub child_frame_id: String,
    pub transform: Transform,
}

impl TransformStamped {
    /// Transform from `frame_id` to `child_frame_id`.
    pub fn new(
        frame_id: &str,
        child_frame_id: &str,
        translation: [f64; 3],
        rotation_wxyz: [f64; 4],
        stamp_us: u64,
    ) -> Self {
        Self {
            header: Header::new(frame_id, stamp_us),
            child_frame_id: child_frame_id.to_string(),
            transform: Transform {
                translation: Vector3::from_array(translation),
                rotation: Quaternion::from_wxyz(rotation_wxyz),
            },
        }
    }

    /// Identity transform from `frame_id` to `child_frame_id`.
    pub fn identity(frame_id: &str, child_frame_id: &str, stamp_us: u64) -> Self {
        Self {
            header: Header::new(frame_id, stamp_us),
            child_frame_id: child_frame_id.to_string(),
            transform: Transform::default(),
        }
    }

    /// Copy of this transform carrying a new stamp.
    pub fn restamped(&self, stamp_us: u64) -> Self {
        let mut tf = self.clone();
        tf.header.stamp = Time::from_micros(stamp_us);
        tf
    }

    pub(crate) fn encode(&self, encoder: &mut CdrEncoder) {
        self.header.encode(encoder);
        encoder.string(&self.child_frame_id);
        self.transform.encode(encoder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_secs() {
        let d = Duration::from_secs_f64(1.0 / 25.0);
        assert_eq!(d.sec, 0);
        assert_eq!(d.nanosec, 40_000_000);
    }

    #[test]
    fn test_quaternion_from_wxyz() {
        let q = Quaternion::from_wxyz([0.5, 0.1, 0.2, 0.3]);
        assert_eq!((q.x, q.y, q.z, q.w), (0.1, 0.2, 0.3, 0.5));
    }

    #[test]
    fn test_header_encoding_layout() {
        let mut encoder = CdrEncoder::new();
        Header::new("map", 2_000_001).encode(&mut encoder);
        let data = encoder.finish();
        assert_eq!(data[4..8], 2i32.to_le_bytes());
        assert_eq!(data[8..12], 1_000u32.to_le_bytes());
        assert_eq!(data[12..16], 4u32.to_le_bytes());
        assert_eq!(&data[16..], b"map\0");
    }

    #[test]
    fn test_restamped_keeps_transform() {
        let tf = TransformStamped::new("base_link", "lidar_top", [1.0, 2.0, 3.0], [1.0, 0.0, 0.0, 0.0], 0);
        let moved = tf.restamped(3_000_000);
        assert_eq!(moved.header.stamp.sec, 3);
        assert_eq!(moved.transform, tf.transform);
        assert_eq!(moved.child_frame_id, "lidar_top");
    }
}
