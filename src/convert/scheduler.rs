// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Fan-out of scenes over worker threads.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::ThreadPool;
use tracing::{debug, error, info, warn};

use super::scene::{SceneConverter, SceneReport};
use super::FileProgress;
use crate::config::ConvertConfig;
use crate::core::{ConvertError, Result, Token};
use crate::dataset::sample_sets_in_directory;
use crate::decode::DecoderRegistry;
use crate::metadata::MetadataIndex;

/// Dataset subdirectories holding raw sensor files.
const SENSOR_ROOTS: [&str; 2] = ["samples", "sweeps"];

/// A scene that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFailure {
    /// Scene token, or the selector that failed to resolve
    pub scene: String,
    pub error: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    /// Converted scenes, ordered by scene id.
    pub scenes: Vec<SceneReport>,
    pub failures: Vec<SceneFailure>,
}

impl RunReport {
    pub fn scenes_converted(&self) -> usize {
        self.scenes.len()
    }

    pub fn scenes_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn files_written(&self) -> u64 {
        self.scenes.iter().map(|s| s.files_written).sum()
    }

    pub fn files_skipped(&self) -> u64 {
        self.scenes.iter().map(|s| s.files_skipped).sum()
    }

    pub fn messages(&self) -> u64 {
        self.scenes.iter().map(|s| s.messages).sum()
    }

    /// True when no scene failed. Skipped files do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Output files, ordered by scene id.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.scenes.iter().map(|s| s.path.clone()).collect()
    }
}

/// Shared read-only state of the scene workers.
struct RunContext<'a> {
    meta: &'a MetadataIndex,
    config: &'a ConvertConfig,
    dataset_root: &'a Path,
    output_dir: &'a Path,
    pool: &'a ThreadPool,
    registry: &'a DecoderRegistry,
    progress: &'a FileProgress,
}

impl RunContext<'_> {
    fn convert(&self, scene_token: &str) -> Result<SceneReport> {
        let mut converter = SceneConverter::submit(self.meta, self.config, scene_token)?;
        let result = converter.run(
            self.dataset_root,
            self.output_dir,
            self.pool,
            self.registry,
            self.progress,
        );
        if result.is_err() {
            debug!(scene = scene_token, state = ?converter.state(), "Scene stopped early");
        }
        result
    }
}

/// Convert every scene (or the one matching `scene`) of a dataset.
///
/// `scene` may be a numeric id, a scene name or a token. Metadata, dataset
/// and configuration problems fail the whole run; a failing scene is recorded
/// in the report and its siblings continue.
pub fn convert_directory(
    meta_path: impl AsRef<Path>,
    dataset_root: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConvertConfig,
    scene: Option<&str>,
) -> Result<RunReport> {
    let started_at = Utc::now();
    let start = Instant::now();
    let (dataset_root, output_dir) = (dataset_root.as_ref(), output_dir.as_ref());

    config.validate()?;
    if !dataset_root.is_dir() {
        return Err(ConvertError::io(dataset_root, "dataset directory not found"));
    }
    std::fs::create_dir_all(output_dir)
        .map_err(|e| ConvertError::io(output_dir, format!("Failed to create output directory: {e}")))?;

    let meta = MetadataIndex::load(meta_path)?;
    survey_dataset(dataset_root);

    let tokens: Vec<Token> = match scene {
        Some(selector) => vec![meta.resolve_scene(selector).unwrap_or_else(|| {
            warn!(selector, "Scene selector matches no scene");
            selector.to_string()
        })],
        None => meta.scenes_all(),
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.decode_threads)
        .thread_name(|index| format!("decode-{index}"))
        .build()
        .map_err(|e| {
            ConvertError::encode("SceneScheduler", format!("Failed to create thread pool: {e}"))
        })?;
    let registry = DecoderRegistry::with_defaults(config);
    let progress = FileProgress::new();

    let workers = config.workers.min(tokens.len()).max(1);
    info!(scenes = tokens.len(), workers, decode_threads = config.decode_threads, "Starting conversion");

    let ctx = RunContext {
        meta: &meta,
        config,
        dataset_root,
        output_dir,
        pool: &pool,
        registry: &registry,
        progress: &progress,
    };
    let results = run_workers(tokens, workers, |token| ctx.convert(token));
    progress.finish();

    let mut scenes = Vec::new();
    let mut failures = Vec::new();
    for (token, result) in results {
        match result {
            Ok(report) => scenes.push(report),
            Err(e) => {
                error!(
                    scene = %token,
                    error = %e,
                    scene_local = e.is_scene_local(),
                    fields = ?e.log_fields(),
                    "Scene conversion failed"
                );
                failures.push(SceneFailure {
                    scene: token,
                    error: e.to_string(),
                });
            }
        }
    }
    scenes.sort_by_key(|s| s.scene_id);
    failures.sort_by(|a, b| a.scene.cmp(&b.scene));

    let report = RunReport {
        started_at,
        finished_at: Utc::now(),
        elapsed_secs: start.elapsed().as_secs_f64(),
        scenes,
        failures,
    };
    info!(
        converted = report.scenes_converted(),
        failed = report.scenes_failed(),
        files_written = report.files_written(),
        files_skipped = report.files_skipped(),
        elapsed_secs = report.elapsed_secs,
        "Conversion finished"
    );
    Ok(report)
}

/// Scene workers pull tokens from a shared queue until it is empty.
///
/// A panic while converting one scene is recorded as that scene's failure;
/// the worker moves on to the next token.
fn run_workers<F>(
    tokens: Vec<Token>,
    workers: usize,
    convert: F,
) -> Vec<(Token, Result<SceneReport>)>
where
    F: Fn(&str) -> Result<SceneReport> + Sync,
{
    let (tx, rx) = crossbeam_channel::unbounded::<Token>();
    for token in tokens {
        // The receiver is alive, so this cannot fail.
        let _ = tx.send(token);
    }
    drop(tx);

    let convert = &convert;
    let convert_guarded = move |token: &str| {
        catch_unwind(AssertUnwindSafe(|| convert(token))).unwrap_or_else(|panic| {
            let message = panic_message(panic.as_ref());
            error!(scene = token, panic = %message, "Scene conversion panicked");
            Err(ConvertError::Other(format!("scene conversion panicked: {message}")))
        })
    };
    let convert_guarded = &convert_guarded;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let rx = rx.clone();
                std::thread::Builder::new()
                    .name(format!("scene-{worker}"))
                    .spawn_scoped(scope, move || {
                        let mut results = Vec::new();
                        while let Ok(token) = rx.recv() {
                            let result = convert_guarded(&token);
                            results.push((token, result));
                        }
                        results
                    })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            match handle {
                Ok(handle) => match handle.join() {
                    Ok(worker_results) => results.extend(worker_results),
                    Err(_) => error!("Scene worker exited abnormally"),
                },
                Err(e) => error!(error = %e, "Failed to spawn scene worker"),
            }
        }
        // Tokens left behind when no worker could be spawned are converted here.
        while let Ok(token) = rx.try_recv() {
            let result = convert_guarded(&token);
            results.push((token, result));
        }
        results
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Log the sensor sets found under the dataset root.
fn survey_dataset(dataset_root: &Path) {
    for root in SENSOR_ROOTS {
        let dir = dataset_root.join(root);
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Sensor root not present");
            continue;
        }
        match sample_sets_in_directory(&dir) {
            Ok(sets) => {
                for set in sets {
                    debug!(
                        root,
                        sensor = %set.directory_name,
                        category = %set.category,
                        "Found sensor set"
                    );
                }
            }
            Err(e) => warn!(dir = %dir.display(), error = %e, "Failed to list sensor root"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn report(token: &str) -> SceneReport {
        SceneReport {
            scene_id: token.len() as u32,
            scene_name: token.to_string(),
            path: PathBuf::from(format!("{token}.mcap")),
            messages: 1,
            files_written: 1,
            files_skipped: 0,
            topics: BTreeMap::new(),
            elapsed_secs: 0.0,
        }
    }

    #[test]
    fn test_panicking_scene_is_isolated() {
        let tokens: Vec<Token> = ["a", "boom", "c", "d"].iter().map(|t| t.to_string()).collect();
        let mut results = run_workers(tokens, 1, |token| {
            if token == "boom" {
                panic!("bad sweep in {token}");
            }
            Ok(report(token))
        });
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let converted: Vec<&str> = results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(t, _)| t.as_str())
            .collect();
        assert_eq!(converted, vec!["a", "c", "d"]);

        let (token, result) = &results[1];
        assert_eq!(token, "boom");
        let err = result.as_ref().unwrap_err();
        assert!(err.to_string().contains("bad sweep in boom"));
    }

    #[test]
    fn test_every_token_is_converted_once() {
        let tokens: Vec<Token> = (0..10).map(|i| format!("scene-{i}")).collect();
        let results = run_workers(tokens, 3, |token| Ok(report(token)));
        let mut seen: Vec<&str> = results.iter().map(|(t, _)| t.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 10);
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
