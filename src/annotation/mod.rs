// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! 3D object annotations: boxes, interpolation between keyframes and markers.

pub mod color;
pub mod interpolate;
pub mod marker;

use glam::{DQuat, DVec3};

use crate::metadata::Annotation;
use crate::messages::{BoundingBox, ColorRGBA, Point, Quaternion, Vector3};

pub use color::category_color;
pub use interpolate::{interpolation_amount, AnnotationInterpolator};
pub use marker::{box_corners, boxes_message, marker_array};

/// An oriented 3D box in the global frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationBox {
    pub center: DVec3,
    /// Width, length, height
    pub size: DVec3,
    pub orientation: DQuat,
    /// Token of the annotation the box was built from
    pub token: String,
    pub category_name: String,
    pub color: ColorRGBA,
}

impl AnnotationBox {
    /// Box exactly as annotated.
    pub fn from_annotation(annotation: &Annotation) -> Self {
        Self::with_pose(
            annotation,
            DVec3::from_array(annotation.translation),
            quat_from_wxyz(annotation.rotation),
        )
    }

    /// Box with the annotation's size and category at another pose.
    pub fn with_pose(annotation: &Annotation, center: DVec3, orientation: DQuat) -> Self {
        Self {
            center,
            size: DVec3::from_array(annotation.size),
            orientation,
            token: annotation.token.clone(),
            category_name: annotation.category_name.clone(),
            color: category_color(&annotation.category_name),
        }
    }

    pub fn to_msg(&self) -> BoundingBox {
        BoundingBox {
            center: Point::from(self.center),
            size: Vector3::from(self.size),
            orientation: Quaternion::from(self.orientation),
            token: self.token.clone(),
            category_name: self.category_name.clone(),
            color: self.color,
        }
    }
}

/// Convert a scalar-first `[w, x, y, z]` rotation.
pub fn quat_from_wxyz(q: [f64; 4]) -> DQuat {
    DQuat::from_xyzw(q[1], q[2], q[3], q[0])
}
