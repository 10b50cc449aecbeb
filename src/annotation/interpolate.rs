// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Box estimation for sensor frames captured between two keyframes.
//!
//! Only keyframes are annotated. A sweep captured after keyframe `t0` and
//! before keyframe `t1` gets every object of `t1` moved back along the
//! straight line (center) and the shortest arc (orientation) towards where
//! the same instance was at `t0`.

use std::collections::HashMap;

use glam::DVec3;
use tracing::{debug, warn};

use super::{quat_from_wxyz, AnnotationBox};
use crate::core::Token;
use crate::metadata::{Annotation, Sample, SampleData};

/// Fraction of the way from `t0` to `t1` at which `t` lies, in `[0, 1]`.
///
/// `t` is clamped into `[t0, t1]` first; equal keyframe stamps give 1.
pub fn interpolation_amount(t0: u64, t1: u64, t: u64) -> f64 {
    if t1 <= t0 {
        return 1.0;
    }
    let t = t.clamp(t0, t1);
    (t - t0) as f64 / (t1 - t0) as f64
}

/// Produces the boxes of one scene's sample data records.
pub struct AnnotationInterpolator<'a> {
    samples: &'a HashMap<Token, Sample>,
    annotations: &'a HashMap<Token, Vec<Annotation>>,
}

impl<'a> AnnotationInterpolator<'a> {
    pub fn new(
        samples: &'a HashMap<Token, Sample>,
        annotations: &'a HashMap<Token, Vec<Annotation>>,
    ) -> Self {
        Self {
            samples,
            annotations,
        }
    }

    /// Boxes valid at the capture time of `data`.
    pub fn boxes_for(&self, data: &SampleData) -> Vec<AnnotationBox> {
        let Some(current) = self.samples.get(&data.sample_token) else {
            warn!(
                sample = %data.sample_token,
                sample_data = %data.token,
                "Sample of sample data not found in scene"
            );
            return Vec::new();
        };
        let Some(current_annotations) = self.annotations_of(&current.token) else {
            return Vec::new();
        };

        if data.is_key_frame || current.prev.is_empty() {
            return current_annotations
                .iter()
                .map(AnnotationBox::from_annotation)
                .collect();
        }

        let Some(previous) = self.samples.get(&current.prev) else {
            warn!(sample = %current.prev, "Previous sample not found in scene");
            return Vec::new();
        };
        let Some(previous_annotations) = self.annotations_of(&previous.token) else {
            return Vec::new();
        };

        let by_instance: HashMap<&str, &Annotation> = previous_annotations
            .iter()
            .map(|a| (a.instance_token.as_str(), a))
            .collect();
        let amount = interpolation_amount(previous.timestamp, current.timestamp, data.timestamp);

        current_annotations
            .iter()
            .map(|annotation| match by_instance.get(annotation.instance_token.as_str()) {
                Some(prev) => interpolate_box(prev, annotation, amount),
                None => AnnotationBox::from_annotation(annotation),
            })
            .collect()
    }

    fn annotations_of(&self, sample_token: &str) -> Option<&'a Vec<Annotation>> {
        let annotations = self.annotations.get(sample_token);
        if annotations.is_none() {
            debug!(sample = sample_token, "No annotations for sample");
        }
        annotations
    }
}

/// Box of `curr` moved `amount` of the way from `prev`'s pose to its own.
pub fn interpolate_box(prev: &Annotation, curr: &Annotation, amount: f64) -> AnnotationBox {
    let c0 = DVec3::from_array(prev.translation);
    let c1 = DVec3::from_array(curr.translation);
    let center = c0.lerp(c1, amount);

    let q0 = quat_from_wxyz(prev.rotation).normalize();
    let q1 = quat_from_wxyz(curr.rotation).normalize();
    let orientation = q0.slerp(q1, amount);

    AnnotationBox::with_pose(curr, center, orientation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_clamps() {
        assert_eq!(interpolation_amount(100, 200, 50), 0.0);
        assert_eq!(interpolation_amount(100, 200, 250), 1.0);
        assert_eq!(interpolation_amount(100, 200, 150), 0.5);
    }

    #[test]
    fn test_amount_equal_stamps() {
        assert_eq!(interpolation_amount(100, 100, 100), 1.0);
    }
}
