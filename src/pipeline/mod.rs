// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Concurrent decode pipeline of one scene.
//!
//! Each sensor set of the scene becomes a [`DecodeTask`] running on the shared
//! decode pool. A task decodes its files in timestamp order and pushes
//! [`TopicMessage`]s into its own bounded queue, which closes when the task
//! returns. A single drain loop on the calling thread polls the queues
//! round-robin and forwards every message to a [`MessageSink`]; it returns
//! once every queue is closed and empty.
//!
//! ```text
//! decode pool                      scene worker
//! ┌────────────┐  bounded queue
//! │ task CAM_* │ ───────────────┐
//! ├────────────┤                ├──► drain ──► MessageSink
//! │ task LIDAR │ ───────────────┤
//! ├────────────┤                │
//! │ task RADAR │ ───────────────┘
//! └────────────┘
//! ```

pub mod drain;
pub mod queue;

use crate::core::Result;
use crate::messages::Payload;

pub use drain::drain_queues;
pub use queue::{run_decode_pipeline, DecodeItem, DecodeTask, PipelineStats};

/// Decoded payload tagged with its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMessage {
    pub topic: String,
    pub frame_id: String,
    /// Capture time in microseconds.
    pub stamp_us: u64,
    pub payload: Payload,
}

/// Consumer of drained messages. Only the drain loop writes to it.
pub trait MessageSink {
    fn write_message(&mut self, message: &TopicMessage) -> Result<()>;
}

impl MessageSink for Vec<TopicMessage> {
    fn write_message(&mut self, message: &TopicMessage) -> Result<()> {
        self.push(message.clone());
        Ok(())
    }
}
