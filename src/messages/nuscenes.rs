// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Custom `nuscenes_msgs` types for annotations and radar detections.

use super::builtin::{
    ColorRGBA, Header, Point, Quaternion, Vector3, COLOR_RGBA, HEADER, POINT, QUATERNION, TIME,
    VECTOR3,
};
use super::{MsgDef, RosMessage};
use crate::encoding::cdr::CdrEncoder;

const BOX: MsgDef = MsgDef {
    name: "nuscenes_msgs/Box",
    text: "geometry_msgs/Point center\ngeometry_msgs/Vector3 size\ngeometry_msgs/Quaternion orientation\nstring token\nstring category_name\nstd_msgs/ColorRGBA color\n",
};

const RADAR_OBJECT: MsgDef = MsgDef {
    name: "nuscenes_msgs/RadarObject",
    text: "geometry_msgs/Vector3 pose\nint8 dyn_prop\nint16 id\nfloat32 rcs\nfloat32 vx\nfloat32 vy\nfloat32 vx_comp\nfloat32 vy_comp\nint8 is_quality_valid\nint8 ambig_state\nint8 x_rms\nint8 y_rms\nint8 invalid_state\nint8 pdh0\nint8 vx_rms\nint8 vy_rms\n",
};

/// One annotated 3D bounding box (`nuscenes_msgs/Box`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBox {
    pub center: Point,
    /// Width, length and height in meters
    pub size: Vector3,
    pub orientation: Quaternion,
    /// Annotation token
    pub token: String,
    pub category_name: String,
    pub color: ColorRGBA,
}

impl BoundingBox {
    fn encode(&self, encoder: &mut CdrEncoder) {
        self.center.encode(encoder);
        self.size.encode(encoder);
        self.orientation.encode(encoder);
        encoder.string(&self.token).string(&self.category_name);
        self.color.encode(encoder);
    }
}

/// Annotation boxes valid at one timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boxes {
    pub header: Header,
    pub boxes: Vec<BoundingBox>,
}

impl RosMessage for Boxes {
    const DATATYPE: &'static str = "nuscenes_msgs/msg/Boxes";
    const DEFINITION: &'static str = "std_msgs/Header header\nnuscenes_msgs/Box[] boxes\n";
    const DEPENDENCIES: &'static [MsgDef] =
        &[HEADER, TIME, BOX, POINT, VECTOR3, QUATERNION, COLOR_RGBA];

    fn encode(&self, encoder: &mut CdrEncoder) {
        self.header.encode(encoder);
        encoder.sequence_length(self.boxes.len());
        for bbox in &self.boxes {
            bbox.encode(encoder);
        }
    }
}

/// One radar detection with the attributes recorded by the dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RadarObject {
    pub pose: Vector3,
    pub dyn_prop: i8,
    pub id: i16,
    pub rcs: f32,
    pub vx: f32,
    pub vy: f32,
    pub vx_comp: f32,
    pub vy_comp: f32,
    pub is_quality_valid: i8,
    pub ambig_state: i8,
    pub x_rms: i8,
    pub y_rms: i8,
    pub invalid_state: i8,
    pub pdh0: i8,
    pub vx_rms: i8,
    pub vy_rms: i8,
}

impl RadarObject {
    fn encode(&self, encoder: &mut CdrEncoder) {
        self.pose.encode(encoder);
        encoder
            .int8(self.dyn_prop)
            .int16(self.id)
            .float32(self.rcs)
            .float32(self.vx)
            .float32(self.vy)
            .float32(self.vx_comp)
            .float32(self.vy_comp)
            .int8(self.is_quality_valid)
            .int8(self.ambig_state)
            .int8(self.x_rms)
            .int8(self.y_rms)
            .int8(self.invalid_state)
            .int8(self.pdh0)
            .int8(self.vx_rms)
            .int8(self.vy_rms);
    }
}

/// All detections of one radar sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarObjects {
    pub header: Header,
    pub objects: Vec<RadarObject>,
}

impl RosMessage for RadarObjects {
    const DATATYPE: &'static str = "nuscenes_msgs/msg/RadarObjects";
    const DEFINITION: &'static str =
        "std_msgs/Header header\nnuscenes_msgs/RadarObject[] objects\n";
    const DEPENDENCIES: &'static [MsgDef] = &[HEADER, TIME, RADAR_OBJECT, VECTOR3];

    fn encode(&self, encoder: &mut CdrEncoder) {
        self.header.encode(encoder);
        encoder.sequence_length(self.objects.len());
        for object in &self.objects {
            object.encode(encoder);
        }
    }
}
