// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `tf2_msgs/msg/TFMessage`.

use super::builtin::{
    TransformStamped, HEADER, QUATERNION, TIME, TRANSFORM, TRANSFORM_STAMPED, VECTOR3,
};
use super::{MsgDef, RosMessage};
use crate::encoding::cdr::CdrEncoder;

/// A set of stamped transforms published together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TFMessage {
    pub transforms: Vec<TransformStamped>,
}

impl RosMessage for TFMessage {
    const DATATYPE: &'static str = "tf2_msgs/msg/TFMessage";
    const DEFINITION: &'static str = "geometry_msgs/TransformStamped[] transforms\n";
    const DEPENDENCIES: &'static [MsgDef] = &[
        TRANSFORM_STAMPED,
        HEADER,
        TIME,
        TRANSFORM,
        VECTOR3,
        QUATERNION,
    ];

    fn encode(&self, encoder: &mut CdrEncoder) {
        encoder.sequence_length(self.transforms.len());
        for tf in &self.transforms {
            tf.encode(encoder);
        }
    }
}
