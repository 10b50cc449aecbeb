// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `visualization_msgs` marker types.

use super::builtin::{
    ColorRGBA, Duration, Header, Point, Pose, Vector3, COLOR_RGBA, DURATION, HEADER, POINT, POSE,
    QUATERNION, TIME, VECTOR3,
};
use super::{MsgDef, RosMessage};
use crate::encoding::cdr::CdrEncoder;

const MARKER: MsgDef = MsgDef {
    name: "visualization_msgs/Marker",
    text: MARKER_DEFINITION,
};

const MARKER_DEFINITION: &str = "int32 ARROW=0\nint32 CUBE=1\nint32 SPHERE=2\nint32 CYLINDER=3\nint32 LINE_STRIP=4\nint32 LINE_LIST=5\nint32 CUBE_LIST=6\nint32 SPHERE_LIST=7\nint32 POINTS=8\nint32 TEXT_VIEW_FACING=9\nint32 MESH_RESOURCE=10\nint32 TRIANGLE_LIST=11\n\nint32 ADD=0\nint32 MODIFY=0\nint32 DELETE=2\nint32 DELETEALL=3\n\nstd_msgs/Header header\nstring ns\nint32 id\nint32 type\nint32 action\ngeometry_msgs/Pose pose\ngeometry_msgs/Vector3 scale\nstd_msgs/ColorRGBA color\nbuiltin_interfaces/Duration lifetime\nbool frame_locked\ngeometry_msgs/Point[] points\nstd_msgs/ColorRGBA[] colors\nstring text\nstring mesh_resource\nbool mesh_use_embedded_materials\n";

/// A single visualization primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marker {
    pub header: Header,
    pub ns: String,
    pub id: i32,
    pub marker_type: i32,
    pub action: i32,
    pub pose: Pose,
    pub scale: Vector3,
    pub color: ColorRGBA,
    pub lifetime: Duration,
    pub frame_locked: bool,
    pub points: Vec<Point>,
    pub colors: Vec<ColorRGBA>,
    pub text: String,
    pub mesh_resource: String,
    pub mesh_use_embedded_materials: bool,
}

impl Marker {
    pub const LINE_LIST: i32 = 5;
    pub const ADD: i32 = 0;

    /// Line list marker: every pair of `points` is one segment.
    ///
    /// `scale.x` is the line width; each point carries `color`.
    pub fn line_list(
        header: Header,
        ns: &str,
        id: i32,
        points: Vec<Point>,
        color: ColorRGBA,
        line_width: f64,
        lifetime: Duration,
    ) -> Self {
        let colors = vec![color; points.len()];
        Self {
            header,
            ns: ns.to_string(),
            id,
            marker_type: Self::LINE_LIST,
            action: Self::ADD,
            pose: Pose::default(),
            scale: Vector3 {
                x: line_width,
                y: 0.0,
                z: 0.0,
            },
            color,
            lifetime,
            frame_locked: false,
            points,
            colors,
            text: String::new(),
            mesh_resource: String::new(),
            mesh_use_embedded_materials: false,
        }
    }

    fn encode_fields(&self, encoder: &mut CdrEncoder) {
        self.header.encode(encoder);
        encoder
            .string(&self.ns)
            .int32(self.id)
            .int32(self.marker_type)
            .int32(self.action);
        self.pose.encode(encoder);
        self.scale.encode(encoder);
        self.color.encode(encoder);
        self.lifetime.encode(encoder);
        encoder.bool(self.frame_locked);
        encoder.sequence_length(self.points.len());
        for point in &self.points {
            point.encode(encoder);
        }
        encoder.sequence_length(self.colors.len());
        for color in &self.colors {
            color.encode(encoder);
        }
        encoder
            .string(&self.text)
            .string(&self.mesh_resource)
            .bool(self.mesh_use_embedded_materials);
    }
}

impl RosMessage for Marker {
    const DATATYPE: &'static str = "visualization_msgs/msg/Marker";
    const DEFINITION: &'static str = MARKER_DEFINITION;
    const DEPENDENCIES: &'static [MsgDef] = &[
        HEADER,
        TIME,
        POSE,
        POINT,
        QUATERNION,
        VECTOR3,
        COLOR_RGBA,
        DURATION,
    ];

    fn encode(&self, encoder: &mut CdrEncoder) {
        self.encode_fields(encoder);
    }
}

/// `visualization_msgs/msg/MarkerArray`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}

impl RosMessage for MarkerArray {
    const DATATYPE: &'static str = "visualization_msgs/msg/MarkerArray";
    const DEFINITION: &'static str = "Marker[] markers\n";
    const DEPENDENCIES: &'static [MsgDef] = &[
        MARKER,
        HEADER,
        TIME,
        POSE,
        POINT,
        QUATERNION,
        VECTOR3,
        COLOR_RGBA,
        DURATION,
    ];

    fn encode(&self, encoder: &mut CdrEncoder) {
        encoder.sequence_length(self.markers.len());
        for marker in &self.markers {
            marker.encode_fields(encoder);
        }
    }
}
