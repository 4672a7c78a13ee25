//! Sequential batch driver: overlays every image of a [`GradientJob`] and reports
//! progress after each one.
//!
//! The first image that fails to load, composite or save aborts the run. The
//! completion callback fires exactly once whatever the outcome, including for
//! an empty job, a canceled run and a panic while processing.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::JoinHandle;

use core_types::{GradientJob, ProgressEvent};
use tracing::{debug, info, warn};

use crate::{output_path_for, EngineError, ImageEngine};

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
pub type CompletionCallback = Arc<dyn Fn(&BatchReport) + Send + Sync>;

#[derive(Clone, Default)]
pub struct BatchCallbacks {
    pub progress: Option<ProgressCallback>,
    pub on_complete: Option<CompletionCallback>,
    pub cancel: CancellationFlag,
}

impl BatchCallbacks {
    fn emit_progress(&self, completed: usize, total: usize) {
        let Some(event) = ProgressEvent::for_completed(completed, total) else {
            return;
        };
        debug!("progress {}% ({completed}/{total})", event.percent);
        if let Some(cb) = &self.progress {
            cb(event);
        }
    }

    fn emit_complete(&self, report: &BatchReport) {
        if let Some(cb) = &self.on_complete {
            cb(report);
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    /// Output files, in processing order.
    pub written: Vec<PathBuf>,
    pub canceled: bool,
    pub failed: Option<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        !self.canceled && self.failed.is_none() && self.written.len() == self.total
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Cannot prepare output directory: {0}")]
    OutputDir(#[source] EngineError),

    #[error("Failed to process {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("Batch worker panicked")]
    WorkerPanicked,
}

impl BatchError {
    fn failed_path(&self, output_dir: &Path) -> PathBuf {
        match self {
            Self::Image { path, .. } => path.clone(),
            Self::OutputDir(_) | Self::WorkerPanicked => output_dir.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchRunner {
    engine: ImageEngine,
}

impl BatchRunner {
    pub fn new(engine: ImageEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ImageEngine {
        &self.engine
    }

    /// Process `job` on the calling thread.
    ///
    /// Returns the report on success or cancellation. On failure the report
    /// (with `failed` set) goes to the completion callback and the error is returned.
    pub fn run(
        &self,
        job: &GradientJob,
        callbacks: &BatchCallbacks,
    ) -> Result<BatchReport, BatchError> {
        let mut report = BatchReport {
            total: job.len(),
            ..BatchReport::default()
        };

        info!(
            "gradient batch: {} image(s), {} -> {}, resolution {}, output {}",
            job.len(),
            job.top,
            job.bottom,
            job.resolution,
            job.output_dir.display()
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_images(job, callbacks, &mut report)
        }))
        .unwrap_or_else(|_| Err(BatchError::WorkerPanicked));
        if let Err(err) = &result {
            warn!("gradient batch aborted: {err}");
            report.failed = Some((err.failed_path(&job.output_dir), err.to_string()));
        } else if report.canceled {
            info!(
                "gradient batch canceled after {}/{} image(s)",
                report.written.len(),
                report.total
            );
        } else {
            info!("gradient batch finished: {} image(s)", report.written.len());
        }

        callbacks.emit_complete(&report);
        result.map(|()| report)
    }

    fn run_images(
        &self,
        job: &GradientJob,
        callbacks: &BatchCallbacks,
        report: &mut BatchReport,
    ) -> Result<(), BatchError> {
        if job.is_empty() {
            return Ok(());
        }

        self.engine
            .prepare_output_dir(&job.output_dir)
            .map_err(BatchError::OutputDir)?;

        let total = job.len();
        for (idx, src) in job.images.iter().enumerate() {
            if callbacks.cancel.is_canceled() {
                report.canceled = true;
                break;
            }

            let written = self
                .process_one(job, src)
                .map_err(|source| BatchError::Image {
                    path: src.clone(),
                    source,
                })?;
            report.written.push(written);
            callbacks.emit_progress(idx + 1, total);
        }

        Ok(())
    }

    fn process_one(&self, job: &GradientJob, src: &Path) -> Result<PathBuf, EngineError> {
        let source = self.engine.load_rgba(src)?;
        let overlaid = self
            .engine
            .composite(&source, job.top, job.bottom, job.resolution)?;
        let target = output_path_for(&job.output_dir, src)?;
        self.engine.save(&overlaid, &target)?;
        debug!("wrote {}", target.display());
        Ok(target)
    }
}

/// A batch running on its own thread.
pub struct BatchHandle {
    cancel: CancellationFlag,
    thread: JoinHandle<Result<BatchReport, BatchError>>,
}

impl BatchHandle {
    /// Ask the worker to stop before its next image.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn join(self) -> Result<BatchReport, BatchError> {
        self.thread.join().map_err(|_| BatchError::WorkerPanicked)?
    }
}

/// Start `job` on a background thread. Progress and completion arrive through
/// `callbacks` on that thread.
pub fn spawn_batch(runner: BatchRunner, job: GradientJob, callbacks: BatchCallbacks) -> BatchHandle {
    let cancel = callbacks.cancel.clone();
    let thread = std::thread::spawn(move || runner.run(&job, &callbacks));
    BatchHandle { cancel, thread }
}
