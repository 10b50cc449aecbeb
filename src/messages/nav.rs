// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `nav_msgs/msg/Odometry`.

use super::builtin::{Header, Pose, Vector3, HEADER, POINT, POSE, QUATERNION, TIME, VECTOR3};
use super::{MsgDef, RosMessage};
use crate::encoding::cdr::CdrEncoder;

const POSE_WITH_COVARIANCE: MsgDef = MsgDef {
    name: "geometry_msgs/PoseWithCovariance",
    text: "Pose pose\nfloat64[36] covariance\n",
};

const TWIST_WITH_COVARIANCE: MsgDef = MsgDef {
    name: "geometry_msgs/TwistWithCovariance",
    text: "Twist twist\nfloat64[36] covariance\n",
};

const TWIST: MsgDef = MsgDef {
    name: "geometry_msgs/Twist",
    text: "Vector3 linear\nVector3 angular\n",
};

/// Pose and velocity of the platform in the odometry frame.
///
/// Velocities are left at zero: the dataset only records poses.
#[derive(Debug, Clone, PartialEq)]
pub struct Odometry {
    pub header: Header,
    pub child_frame_id: String,
    pub pose: Pose,
    pub pose_covariance: [f64; 36],
    pub linear_velocity: Vector3,
    pub angular_velocity: Vector3,
    pub twist_covariance: [f64; 36],
}

impl Odometry {
    pub fn new(header: Header, child_frame_id: impl Into<String>, pose: Pose) -> Self {
        Self {
            header,
            child_frame_id: child_frame_id.into(),
            pose,
            pose_covariance: [0.0; 36],
            linear_velocity: Vector3::default(),
            angular_velocity: Vector3::default(),
            twist_covariance: [0.0; 36],
        }
    }
}

impl RosMessage for Odometry {
    const DATATYPE: &'static str = "nav_msgs/msg/Odometry";
    const DEFINITION: &'static str = "std_msgs/Header header\nstring child_frame_id\ngeometry_msgs/PoseWithCovariance pose\ngeometry_msgs/TwistWithCovariance twist\n";
    const DEPENDENCIES: &'static [MsgDef] = &[
        HEADER,
        TIME,
        POSE_WITH_COVARIANCE,
        POSE,
        POINT,
        QUATERNION,
        TWIST_WITH_COVARIANCE,
        TWIST,
        VECTOR3,
    ];

    fn encode(&self, encoder: &mut CdrEncoder) {
        self.header.encode(encoder);
        encoder.string(&self.child_frame_id);
        self.pose.encode(encoder);
        encoder.float64_array(&self.pose_covariance);
        self.linear_velocity.encode(encoder);
        self.angular_velocity.encode(encoder);
        encoder.float64_array(&self.twist_covariance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odometry_encoded_size() {
        let odom = Odometry::new(Header::new("odom", 0), "base_link", Pose::default());
        let data = odom.to_cdr();
        // header and child frame id end at body offset 34, padded to 40 for the doubles
        assert_eq!(data.len(), 4 + 40 + (7 + 36 + 6 + 36) * 8);
    }
}
