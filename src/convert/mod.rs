// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Scene conversion and scheduling.
//!
//! [`convert_directory`] loads the metadata once, then scene workers pull
//! scene tokens from a shared queue and run a [`SceneConverter`] per scene.
//! All scenes share one decode thread pool and one [`FileProgress`].

pub mod progress;
pub mod scene;
pub mod scheduler;

pub use progress::FileProgress;
pub use scene::{
    camera_info_topic, sensor_topic, SceneConverter, SceneReport, SceneState, TOPIC_BOXES,
    TOPIC_BOXES_VIZ, TOPIC_ODOM, TOPIC_TF,
};
pub use scheduler::{convert_directory, RunReport, SceneFailure};
