// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `sensor_msgs` types for camera and lidar data.

use super::builtin::{Header, HEADER, TIME};
use super::{MsgDef, RosMessage};
use crate::encoding::cdr::CdrEncoder;

const POINT_FIELD: MsgDef = MsgDef {
    name: "sensor_msgs/PointField",
    text: "uint8 INT8    = 1\nuint8 UINT8   = 2\nuint8 INT16   = 3\nuint8 UINT16  = 4\nuint8 INT32   = 5\nuint8 UINT32  = 6\nuint8 FLOAT32 = 7\nuint8 FLOAT64 = 8\nstring name\nuint32 offset\nuint8 datatype\nuint32 count\n",
};

const REGION_OF_INTEREST: MsgDef = MsgDef {
    name: "sensor_msgs/RegionOfInterest",
    text: "uint32 x_offset\nuint32 y_offset\nuint32 height\nuint32 width\nbool do_rectify\n",
};

/// Compressed camera frame (`sensor_msgs/msg/CompressedImage`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressedImage {
    pub header: Header,
    /// Image format, e.g. `jpeg` or `png`
    pub format: String,
    pub data: Vec<u8>,
}

impl CompressedImage {
    pub fn new(format: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            header: Header::default(),
            format: format.into(),
            data,
        }
    }
}

impl RosMessage for CompressedImage {
    const DATATYPE: &'static str = "sensor_msgs/msg/CompressedImage";
    const DEFINITION: &'static str = "std_msgs/Header header\nstring format\nuint8[] data\n";
    const DEPENDENCIES: &'static [MsgDef] = &[HEADER, TIME];

    fn encode(&self, encoder: &mut CdrEncoder) {
        self.header.encode(encoder);
        encoder.string(&self.format).uint8_sequence(&self.data);
    }
}

/// Pinhole calibration of a camera (`sensor_msgs/msg/CameraInfo`).
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInfo {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub distortion_model: String,
    pub d: Vec<f64>,
    pub k: [f64; 9],
    pub r: [f64; 9],
    pub p: [f64; 12],
}

impl CameraInfo {
    /// Build an undistorted pinhole model from a 3x3 intrinsic matrix.
    pub fn from_intrinsic(header: Header, width: u32, height: u32, k: &[[f64; 3]; 3]) -> Self {
        let k_flat = [
            k[0][0], k[0][1], k[0][2], k[1][0], k[1][1], k[1][2], k[2][0], k[2][1], k[2][2],
        ];
        let p = [
            k[0][0], k[0][1], k[0][2], 0.0, k[1][0], k[1][1], k[1][2], 0.0, k[2][0], k[2][1],
            k[2][2], 0.0,
        ];
        Self {
            header,
            height,
            width,
            distortion_model: "plumb_bob".to_string(),
            d: vec![0.0; 5],
            k: k_flat,
            r: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            p,
        }
    }
}

impl RosMessage for CameraInfo {
    const DATATYPE: &'static str = "sensor_msgs/msg/CameraInfo";
    const DEFINITION: &'static str = "std_msgs/Header header\nuint32 height\nuint32 width\nstring distortion_model\nfloat64[] d\nfloat64[9] k\nfloat64[9] r\nfloat64[12] p\nuint32 binning_x\nuint32 binning_y\nRegionOfInterest roi\n";
    const DEPENDENCIES: &'static [MsgDef] = &[HEADER, TIME, REGION_OF_INTEREST];

    fn encode(&self, encoder: &mut CdrEncoder) {
        self.header.encode(encoder);
        encoder
            .uint32(self.height)
            .uint32(self.width)
            .string(&self.distortion_model)
            .float64_sequence(&self.d)
            .float64_array(&self.k)
            .float64_array(&self.r)
            .float64_array(&self.p)
            .uint32(0)
            .uint32(0);
        // Full-frame region of interest
        encoder.uint32(0).uint32(0).uint32(0).uint32(0).bool(false);
    }
}

/// Description of one field of a point cloud record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointField {
    pub name: String,
    pub offset: u32,
    pub datatype: u8,
    pub count: u32,
}

impl PointField {
    pub const UINT8: u8 = 2;
    pub const UINT16: u8 = 4;
    pub const FLOAT32: u8 = 7;

    pub fn new(name: &str, offset: u32, datatype: u8) -> Self {
        Self {
            name: name.to_string(),
            offset,
            datatype,
            count: 1,
        }
    }

    fn encode(&self, encoder: &mut CdrEncoder) {
        encoder
            .string(&self.name)
            .uint32(self.offset)
            .uint8(self.datatype)
            .uint32(self.count);
    }
}

/// Unordered point cloud (`sensor_msgs/msg/PointCloud2`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud2 {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    pub point_step: u32,
    pub row_step: u32,
    pub data: Vec<u8>,
    pub is_dense: bool,
}

impl PointCloud2 {
    /// Build a single-row cloud of `width` little-endian records.
    pub fn unordered(fields: Vec<PointField>, point_step: u32, width: u32, data: Vec<u8>) -> Self {
        Self {
            header: Header::default(),
            height: 1,
            width,
            fields,
            is_bigendian: false,
            point_step,
            row_step: point_step * width,
            data,
            is_dense: true,
        }
    }
}

impl RosMessage for PointCloud2 {
    const DATATYPE: &'static str = "sensor_msgs/msg/PointCloud2";
    const DEFINITION: &'static str = "std_msgs/Header header\nuint32 height\nuint32 width\nPointField[] fields\nbool is_bigendian\nuint32 point_step\nuint32 row_step\nuint8[] data\nbool is_dense\n";
    const DEPENDENCIES: &'static [MsgDef] = &[HEADER, TIME, POINT_FIELD];

    fn encode(&self, encoder: &mut CdrEncoder) {
        self.header.encode(encoder);
        encoder.uint32(self.height).uint32(self.width);
        encoder.sequence_length(self.fields.len());
        for field in &self.fields {
            field.encode(encoder);
        }
        encoder
            .bool(self.is_bigendian)
            .uint32(self.point_step)
            .uint32(self.row_step)
            .uint8_sequence(&self.data)
            .bool(self.is_dense);
    }
}
