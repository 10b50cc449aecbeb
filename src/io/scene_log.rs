// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! One output log per scene.
//!
//! [`SceneLog`] registers the schema and channel of a topic on its first
//! message and stamps every message with the capture time in nanoseconds as
//! both log and publish time. Dropping an open log finalizes it.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::mcap::{McapWriter, WriterOptions, WriterSummary};
use crate::core::{micros_to_nanos, ConvertError, Result};
use crate::encoding::{MESSAGE_ENCODING_CDR, SCHEMA_ENCODING_ROS2MSG};
use crate::messages::{Payload, RosMessage};
use crate::pipeline::{MessageSink, TopicMessage};

/// Totals of a closed log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneLogSummary {
    pub path: PathBuf,
    pub messages: u64,
    /// Messages per topic, sorted by topic.
    pub topics: BTreeMap<String, u64>,
    pub bytes: u64,
}

pub struct SceneLog {
    path: PathBuf,
    writer: Option<McapWriter<BufWriter<File>>>,
    channels: HashMap<String, u16>,
    topic_counts: BTreeMap<String, u64>,
}

impl SceneLog {
    /// Create (or truncate) the log at `path`.
    pub fn create(path: impl AsRef<Path>, options: WriterOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = McapWriter::create(&path, options)?;
        debug!(path = %path.display(), "Opened scene log");
        Ok(Self {
            path,
            writer: Some(writer),
            channels: HashMap::new(),
            topic_counts: BTreeMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a message on `topic` at `stamp_us` (microseconds).
    pub fn write<M: RosMessage>(&mut self, topic: &str, stamp_us: u64, msg: &M) -> Result<()> {
        self.write_encoded(topic, M::DATATYPE, M::schema, stamp_us, &msg.to_cdr())
    }

    /// Append a decoded sensor payload on `topic`.
    pub fn write_payload(&mut self, topic: &str, stamp_us: u64, payload: &Payload) -> Result<()> {
        self.write_encoded(
            topic,
            payload.datatype(),
            || payload.schema(),
            stamp_us,
            &payload.to_cdr(),
        )
    }

    fn write_encoded(
        &mut self,
        topic: &str,
        datatype: &str,
        schema: impl FnOnce() -> String,
        stamp_us: u64,
        data: &[u8],
    ) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(ConvertError::encode("SceneLog", "log already closed"));
        };
        let channel_id = match self.channels.get(topic) {
            Some(&id) => id,
            None => {
                let schema_id = writer.add_schema(
                    datatype,
                    SCHEMA_ENCODING_ROS2MSG,
                    schema().as_bytes(),
                )?;
                let id =
                    writer.add_channel(schema_id, topic, MESSAGE_ENCODING_CDR, &BTreeMap::new())?;
                self.channels.insert(topic.to_string(), id);
                id
            }
        };
        let time = micros_to_nanos(stamp_us);
        writer.write_message(channel_id, time, time, data)?;
        *self.topic_counts.entry(topic.to_string()).or_insert(0) += 1;
        Ok(())
    }

    /// Messages written so far.
    pub fn message_count(&self) -> u64 {
        self.topic_counts.values().sum()
    }

    /// Per-topic message counts so far.
    pub fn topic_counts(&self) -> &BTreeMap<String, u64> {
        &self.topic_counts
    }

    /// Finalize the file.
    pub fn close(mut self) -> Result<SceneLogSummary> {
        let summary = self.finish()?;
        Ok(SceneLogSummary {
            path: self.path.clone(),
            messages: summary.messages,
            topics: std::mem::take(&mut self.topic_counts),
            bytes: summary.bytes,
        })
    }

    fn finish(&mut self) -> Result<WriterSummary> {
        match self.writer.take() {
            Some(mut writer) => writer.finish(),
            None => Err(ConvertError::encode("SceneLog", "log already closed")),
        }
    }
}

impl MessageSink for SceneLog {
    fn write_message(&mut self, message: &TopicMessage) -> Result<()> {
        self.write_payload(&message.topic, message.stamp_us, &message.payload)
    }
}

impl Drop for SceneLog {
    fn drop(&mut self) {
        if self.writer.is_some() {
            if let Err(e) = self.finish() {
                warn!(path = %self.path.display(), error = %e, "Failed to finalize scene log");
            }
        }
    }
}

impl std::fmt::Debug for SceneLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneLog")
            .field("path", &self.path)
            .field("open", &self.writer.is_some())
            .field("topics", &self.topic_counts.len())
            .finish()
    }
}
