// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS 2 message types written to the output logs.
//!
//! Every type implements [`RosMessage`], which couples the CDR serialization
//! with the `ros2msg` definition stored as the MCAP schema of its channel.
//! Decoded sensor payloads travel through the decode pipeline as a
//! [`Payload`], a sum type over the sensor message kinds.

pub mod builtin;
pub mod nav;
pub mod nuscenes;
pub mod sensor;
pub mod tf;
pub mod visualization;

use crate::encoding::cdr::CdrEncoder;

pub use builtin::{
    ColorRGBA, Duration, Header, Point, Pose, Quaternion, Time, Transform, TransformStamped,
    Vector3,
};
pub use nav::Odometry;
pub use nuscenes::{BoundingBox, Boxes, RadarObject, RadarObjects};
pub use sensor::{CameraInfo, CompressedImage, PointCloud2, PointField};
pub use tf::TFMessage;
pub use visualization::{Marker, MarkerArray};

/// Separator between concatenated definitions in a `ros2msg` schema.
const DEFINITION_SEPARATOR: &str =
    "================================================================================\n";

/// A named `.msg` definition used as a dependency of another definition.
#[derive(Debug, Clone, Copy)]
pub struct MsgDef {
    /// Dependency name as referenced in field types (e.g. `std_msgs/Header`)
    pub name: &'static str,
    /// Field list of the definition
    pub text: &'static str,
}

/// A message that can be serialized to CDR and described by a `ros2msg` schema.
pub trait RosMessage {
    /// Fully qualified ROS 2 type name (e.g. `nav_msgs/msg/Odometry`).
    const DATATYPE: &'static str;

    /// Field list of the top-level type.
    const DEFINITION: &'static str;

    /// Every nested type the definition refers to, transitively.
    const DEPENDENCIES: &'static [MsgDef];

    /// Append the fields of this message to the encoder.
    fn encode(&self, encoder: &mut CdrEncoder);

    /// Full schema text: the definition followed by its dependencies.
    fn schema() -> String {
        concat_definition(Self::DEFINITION, Self::DEPENDENCIES)
    }

    /// Serialize into a standalone CDR payload.
    fn to_cdr(&self) -> Vec<u8> {
        let mut encoder = CdrEncoder::new();
        self.encode(&mut encoder);
        encoder.finish()
    }
}

fn concat_definition(definition: &str, dependencies: &[MsgDef]) -> String {
    let mut schema = String::from(definition);
    for dep in dependencies {
        schema.push_str(DEFINITION_SEPARATOR);
        schema.push_str("MSG: ");
        schema.push_str(dep.name);
        schema.push('\n');
        schema.push_str(dep.text);
    }
    schema
}

/// Decoded sensor payload carried through the decode pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Compressed camera frame
    Image(CompressedImage),
    /// Lidar sweep
    PointCloud(PointCloud2),
    /// Radar detections
    Radar(RadarObjects),
}

impl Payload {
    /// Stamp the payload header with its frame id and capture time.
    pub fn set_header(&mut self, frame_id: &str, stamp_us: u64) {
        let header = match self {
            Payload::Image(msg) => &mut msg.header,
            Payload::PointCloud(msg) => &mut msg.header,
            Payload::Radar(msg) => &mut msg.header,
        };
        *header = Header::new(frame_id, stamp_us);
    }

    /// Get the payload header.
    pub fn header(&self) -> &Header {
        match self {
            Payload::Image(msg) => &msg.header,
            Payload::PointCloud(msg) => &msg.header,
            Payload::Radar(msg) => &msg.header,
        }
    }

    /// ROS 2 type name of the wrapped message.
    pub fn datatype(&self) -> &'static str {
        match self {
            Payload::Image(_) => CompressedImage::DATATYPE,
            Payload::PointCloud(_) => PointCloud2::DATATYPE,
            Payload::Radar(_) => RadarObjects::DATATYPE,
        }
    }

    /// Schema text of the wrapped message.
    pub fn schema(&self) -> String {
        match self {
            Payload::Image(_) => CompressedImage::schema(),
            Payload::PointCloud(_) => PointCloud2::schema(),
            Payload::Radar(_) => RadarObjects::schema(),
        }
    }

    /// Serialize the wrapped message to CDR.
    pub fn to_cdr(&self) -> Vec<u8> {
        match self {
            Payload::Image(msg) => msg.to_cdr(),
            Payload::PointCloud(msg) => msg.to_cdr(),
            Payload::Radar(msg) => msg.to_cdr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_dependencies() {
        let schema = TFMessage::schema();
        assert!(schema.starts_with("geometry_msgs/TransformStamped[] transforms\n"));
        assert!(schema.contains("MSG: geometry_msgs/TransformStamped\n"));
        assert!(schema.contains("MSG: builtin_interfaces/Time\n"));
        assert_eq!(
            schema.matches(DEFINITION_SEPARATOR).count(),
            TFMessage::DEPENDENCIES.len()
        );
    }

    #[test]
    fn test_payload_set_header() {
        let mut payload = Payload::Image(CompressedImage::new("jpeg", vec![1, 2, 3]));
        payload.set_header("cam_front", 1_500_000);
        assert_eq!(payload.header().frame_id, "cam_front");
        assert_eq!(payload.header().stamp, Time { sec: 1, nanosec: 500_000_000 });
        assert_eq!(payload.datatype(), "sensor_msgs/msg/CompressedImage");
    }
}
