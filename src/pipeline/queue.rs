// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode tasks and the per-topic queues they feed.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{bounded, Sender};
use rayon::ThreadPool;
use tracing::{debug, warn};

use super::drain::drain_queues;
use super::{MessageSink, TopicMessage};
use crate::convert::FileProgress;
use crate::core::Result;
use crate::dataset::SensorCategory;
use crate::decode::{DecoderRegistry, SensorDecoder};
use crate::metadata::SampleData;

/// One raw file of a sensor set.
#[derive(Debug, Clone)]
pub struct DecodeItem {
    pub path: PathBuf,
    pub info: SampleData,
}

/// All files of one sensor channel in a scene, in timestamp order.
#[derive(Debug, Clone)]
pub struct DecodeTask {
    pub topic: String,
    pub frame_id: String,
    pub category: SensorCategory,
    pub items: Vec<DecodeItem>,
}

/// Counters of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Messages forwarded to the sink.
    pub written: u64,
    /// Files that failed to decode or had no decoder.
    pub skipped: u64,
}

impl DecodeTask {
    /// Decode every item and push it into `queue`. Stops early when the drain
    /// side has gone away. The queue closes when `queue` is dropped on return.
    fn run(
        self,
        decoder: &dyn SensorDecoder,
        queue: Sender<TopicMessage>,
        skipped: &AtomicU64,
        progress: &FileProgress,
    ) {
        let total = self.items.len();
        for (done, item) in self.items.into_iter().enumerate() {
            let decode = || decoder.decode(&item.path, &item.info);
            let decoded = catch_unwind(AssertUnwindSafe(decode)).unwrap_or_else(|_| {
                warn!(
                    topic = %self.topic,
                    path = %item.path.display(),
                    "Decoder panicked, skipping file"
                );
                None
            });
            progress.inc(1);
            let Some(payload) = decoded else {
                skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            };
            let message = TopicMessage {
                topic: self.topic.clone(),
                frame_id: self.frame_id.clone(),
                stamp_us: item.info.timestamp,
                payload,
            };
            if queue.send(message).is_err() {
                debug!(
                    topic = %self.topic,
                    remaining = total - done - 1,
                    "Drain closed, stopping decode task"
                );
                return;
            }
        }
    }
}

/// Decode `tasks` on `pool` and drain their queues into `sink`.
///
/// The drain runs on the calling thread, which must not be a thread of `pool`.
/// Tasks whose category has no decoder are skipped file by file.
pub fn run_decode_pipeline<S: MessageSink + ?Sized>(
    pool: &ThreadPool,
    registry: &DecoderRegistry,
    tasks: Vec<DecodeTask>,
    capacity: usize,
    sink: &mut S,
    progress: &FileProgress,
) -> Result<PipelineStats> {
    let skipped = AtomicU64::new(0);

    let written = pool.in_place_scope(|scope| {
        let mut receivers = Vec::with_capacity(tasks.len());
        for task in tasks {
            let Some(decoder) = registry.get(task.category) else {
                warn!(
                    topic = %task.topic,
                    category = %task.category,
                    files = task.items.len(),
                    "No decoder registered, skipping sensor set"
                );
                skipped.fetch_add(task.items.len() as u64, Ordering::Relaxed);
                progress.inc(task.items.len() as u64);
                continue;
            };
            let (tx, rx) = bounded(capacity.max(1));
            receivers.push(rx);
            let skipped = &skipped;
            scope.spawn(move |_| task.run(decoder, tx, skipped, progress));
        }
        drain_queues(receivers, sink)
    })?;

    Ok(PipelineStats {
        written,
        skipped: skipped.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{CompressedImage, Payload};
    use std::path::Path;

    /// Decodes every file whose name does not contain "bad".
    struct NameDecoder;

    impl SensorDecoder for NameDecoder {
        fn decode(&self, path: &Path, _info: &SampleData) -> Option<Payload> {
            let name = path.to_string_lossy();
            (!name.contains("bad"))
                .then(|| Payload::Image(CompressedImage::new("jpeg", name.as_bytes().to_vec())))
        }
    }

    fn item(name: &str, timestamp: u64) -> DecodeItem {
        let info: SampleData = serde_json::from_value(serde_json::json!({
            "token": name,
            "sample_token": "s",
            "ego_pose_token": "e",
            "calibrated_sensor_token": "c",
            "timestamp": timestamp,
            "is_key_frame": false,
            "filename": name,
        }))
        .unwrap();
        DecodeItem {
            path: PathBuf::from(name),
            info,
        }
    }

    fn task(topic: &str, category: SensorCategory, names: &[&str]) -> DecodeTask {
        DecodeTask {
            topic: topic.to_string(),
            frame_id: topic.trim_end_matches("/raw").to_string(),
            category,
            items: names
                .iter()
                .enumerate()
                .map(|(i, n)| item(n, 100 + i as u64))
                .collect(),
        }
    }

    /// Panics on every file whose name contains "boom".
    struct PanicDecoder;

    impl SensorDecoder for PanicDecoder {
        fn decode(&self, path: &Path, info: &SampleData) -> Option<Payload> {
            if path.to_string_lossy().contains("boom") {
                panic!("cannot decode {}", info.token);
            }
            NameDecoder.decode(path, info)
        }
    }

    fn pool() -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    #[test]
    fn test_pipeline_skips_bad_files() {
        let mut registry = DecoderRegistry::new();
        registry.register(SensorCategory::Camera, Box::new(NameDecoder));
        registry.register(SensorCategory::Lidar, Box::new(NameDecoder));

        let tasks = vec![
            task("cam_front/raw", SensorCategory::Camera, &["a", "bad", "b"]),
            task("cam_back/raw", SensorCategory::Camera, &["c"]),
            task("lidar_top", SensorCategory::Lidar, &["d", "e", "f", "g"]),
        ];
        let mut sink: Vec<TopicMessage> = Vec::new();
        let stats =
            run_decode_pipeline(&pool(), &registry, tasks, 1, &mut sink, &FileProgress::hidden())
                .unwrap();

        assert_eq!(stats, PipelineStats { written: 7, skipped: 1 });
        let front: Vec<u64> = sink
            .iter()
            .filter(|m| m.topic == "cam_front/raw")
            .map(|m| m.stamp_us)
            .collect();
        assert_eq!(front, vec![100, 102]);
        let lidar = sink.iter().find(|m| m.topic == "lidar_top").unwrap();
        assert_eq!(lidar.payload.header().frame_id, "lidar_top");
    }

    #[test]
    fn test_missing_decoder_counts_as_skipped() {
        let registry = DecoderRegistry::new();
        let tasks = vec![task("radar_front", SensorCategory::Radar, &["x", "y"])];
        let mut sink: Vec<TopicMessage> = Vec::new();
        let stats =
            run_decode_pipeline(&pool(), &registry, tasks, 4, &mut sink, &FileProgress::hidden())
                .unwrap();
        assert_eq!(stats.written, 0);
        assert_eq!(stats.skipped, 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_more_tasks_than_threads() {
        let mut registry = DecoderRegistry::new();
        registry.register(SensorCategory::Camera, Box::new(NameDecoder));
        let names: Vec<String> = (0..20).map(|i| format!("f{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let tasks: Vec<DecodeTask> = (0..8)
            .map(|i| task(&format!("cam_{i}/raw"), SensorCategory::Camera, &refs))
            .collect();
        let mut sink: Vec<TopicMessage> = Vec::new();
        let stats =
            run_decode_pipeline(&pool(), &registry, tasks, 2, &mut sink, &FileProgress::hidden())
                .unwrap();
        assert_eq!(stats.written, 160);
        assert_eq!(sink.len(), 160);
    }

    #[test]
    fn test_panicking_decoder_skips_file() {
        let mut registry = DecoderRegistry::new();
        registry.register(SensorCategory::Radar, Box::new(PanicDecoder));
        let tasks = vec![
            task("radar_front", SensorCategory::Radar, &["a", "boom", "b"]),
            task("radar_back", SensorCategory::Radar, &["boom-too", "c"]),
        ];
        let mut sink: Vec<TopicMessage> = Vec::new();
        let stats =
            run_decode_pipeline(&pool(), &registry, tasks, 1, &mut sink, &FileProgress::hidden())
                .unwrap();

        assert_eq!(stats, PipelineStats { written: 3, skipped: 2 });
        let front: Vec<u64> = sink
            .iter()
            .filter(|m| m.topic == "radar_front")
            .map(|m| m.stamp_us)
            .collect();
        assert_eq!(front, vec![100, 102]);
    }
}
