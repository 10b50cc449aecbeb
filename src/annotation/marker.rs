// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wireframe markers and box lists for annotation topics.

use glam::DVec3;

use super::AnnotationBox;
use crate::messages::{Boxes, Duration, Header, Marker, MarkerArray, Point};

/// Frame the annotations are expressed in.
pub const ANNOTATION_FRAME: &str = "map";

/// Marker namespace of the annotation wireframes.
pub const MARKER_NAMESPACE: &str = "annotations";

/// Annotations are published at 25 Hz.
pub const MARKER_LIFETIME_SECS: f64 = 1.0 / 25.0;

const LINE_WIDTH: f64 = 0.1;

/// Corner pairs (1-based) forming the 12 edges of a box.
const EDGES: [(usize, usize); 12] = [
    (1, 2),
    (1, 4),
    (1, 5),
    (5, 6),
    (5, 8),
    (2, 6),
    (6, 7),
    (7, 8),
    (2, 3),
    (4, 8),
    (3, 4),
    (3, 7),
];

/// The 8 corners of a box in the global frame.
///
/// The box-local frame has the length (`size.y`) along x and the width
/// (`size.x`) along y.
pub fn box_corners(bbox: &AnnotationBox) -> [DVec3; 8] {
    let width = bbox.size.x;
    let depth = bbox.size.y;
    let height = bbox.size.z;
    let max = DVec3::new(depth / 2.0, width / 2.0, height / 2.0);
    let min = -max;

    let local = [
        DVec3::new(min.x, min.y, min.z),
        DVec3::new(min.x, min.y, max.z),
        DVec3::new(max.x, min.y, max.z),
        DVec3::new(max.x, min.y, min.z),
        DVec3::new(min.x, max.y, min.z),
        DVec3::new(min.x, max.y, max.z),
        DVec3::new(max.x, max.y, max.z),
        DVec3::new(max.x, max.y, min.z),
    ];
    local.map(|p| bbox.center + bbox.orientation * p)
}

/// One LINE_LIST marker outlining `bbox`.
pub fn box_marker(bbox: &AnnotationBox, id: i32, stamp_us: u64) -> Marker {
    let corners = box_corners(bbox);
    let points = EDGES
        .iter()
        .flat_map(|&(a, b)| [corners[a - 1], corners[b - 1]])
        .map(Point::from)
        .collect();
    Marker::line_list(
        Header::new(ANNOTATION_FRAME, stamp_us),
        MARKER_NAMESPACE,
        id,
        points,
        bbox.color,
        LINE_WIDTH,
        Duration::from_secs_f64(MARKER_LIFETIME_SECS),
    )
}

/// Markers for all boxes, with ids numbered from 0 in order.
pub fn marker_array(boxes: &[AnnotationBox], stamp_us: u64) -> MarkerArray {
    MarkerArray {
        markers: boxes
            .iter()
            .zip(0..)
            .map(|(bbox, id)| box_marker(bbox, id, stamp_us))
            .collect(),
    }
}

/// `boxes` topic message for one timestamp.
pub fn boxes_message(boxes: &[AnnotationBox], stamp_us: u64) -> Boxes {
    Boxes {
        header: Header::new(ANNOTATION_FRAME, stamp_us),
        boxes: boxes.iter().map(AnnotationBox::to_msg).collect(),
    }
}
