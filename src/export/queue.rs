use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{ExportError, ExportJob};

/// Messages from the export worker, drained on the UI thread
#[derive(Debug)]
pub enum ExportNotice {
    Progress(String),
    Completed(String),
    Failed(ExportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Started,
    /// The listed outputs exist; the job waits for `reply`
    AwaitingConfirmation(Vec<PathBuf>),
}

/// Single-slot queue gating exports behind an overwrite question
pub struct ExportQueue {
    pending: Option<ExportJob>,
    /// Set while a worker thread is writing
    running: Arc<AtomicBool>,
    tx: Sender<ExportNotice>,
    rx: Receiver<ExportNotice>,
}

impl Default for ExportQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            pending: None,
            running: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
        }
    }

    /// Queue a job, replacing any job still waiting. Runs at once unless an
    /// output already exists. The ffmpeg check happens on the worker.
    pub fn submit(&mut self, job: ExportJob) -> Result<Submission, ExportError> {
        if job.frames.is_empty() {
            return Err(ExportError::EmptyFrames);
        }
        if self.is_running() {
            return Err(ExportError::Busy);
        }

        let conflicts = job.conflicts();
        self.pending = Some(job);
        if conflicts.is_empty() {
            self.run_pending()?;
            Ok(Submission::Started)
        } else {
            tracing::info!(count = conflicts.len(), "export waiting for overwrite confirmation");
            Ok(Submission::AwaitingConfirmation(conflicts))
        }
    }

    /// Answer the overwrite question. Returns whether a job was started.
    pub fn reply(&mut self, overwrite: bool) -> Result<bool, ExportError> {
        if !overwrite {
            if self.pending.take().is_some() {
                tracing::info!("export cancelled, existing files kept");
            }
            return Ok(false);
        }
        self.run_pending()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> Option<&ExportJob> {
        self.pending.as_ref()
    }

    pub fn notices(&self) -> &Receiver<ExportNotice> {
        &self.rx
    }

    /// Everything the worker reported since the last poll
    pub fn poll(&self) -> Vec<ExportNotice> {
        self.rx.try_iter().collect()
    }

    fn run_pending(&mut self) -> Result<bool, ExportError> {
        if self.is_running() {
            return Err(ExportError::Busy);
        }
        let Some(job) = self.pending.take() else {
            return Ok(false);
        };
        let tx = self.tx.clone();
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::Release);
        let spawned = std::thread::Builder::new()
            .name("export".to_string())
            .spawn(move || {
                let _ = tx.send(ExportNotice::Progress("Please wait...".to_string()));
                let mut progress = |line: String| {
                    let _ = tx.send(ExportNotice::Progress(line));
                };
                let notice = match job.run(&mut progress) {
                    Ok(message) => ExportNotice::Completed(message),
                    Err(e) => {
                        tracing::error!("export failed: {e}");
                        ExportNotice::Failed(e)
                    }
                };
                running.store(false, Ordering::Release);
                let _ = tx.send(notice);
            });
        if let Err(e) = spawned {
            self.running.store(false, Ordering::Release);
            return Err(ExportError::Worker(e));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExportKind;
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    fn wait_for_end(queue: &ExportQueue) -> ExportNotice {
        loop {
            match queue.notices().recv_timeout(Duration::from_secs(10)) {
                Ok(ExportNotice::Progress(_)) => continue,
                Ok(notice) => return notice,
                Err(e) => panic!("worker went quiet: {e}"),
            }
        }
    }

    fn job(dir: &std::path::Path) -> ExportJob {
        ExportJob::for_test(
            ExportKind::PngSequence,
            dir,
            vec![RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])); 2],
        )
    }

    #[test]
    fn test_fresh_export_runs_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut queue = ExportQueue::new();
        assert_eq!(queue.submit(job(dir.path())).unwrap(), Submission::Started);
        assert!(matches!(wait_for_end(&queue), ExportNotice::Completed(_)));
        assert!(!queue.is_running());
        assert!(dir.path().join("frame_1.png").exists());
    }

    #[test]
    fn test_second_export_refused_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut queue = ExportQueue::new();
        queue.running.store(true, Ordering::Release);
        assert!(matches!(queue.submit(job(dir.path())), Err(ExportError::Busy)));
        assert!(queue.pending().is_none());
        assert!(!dir.path().join("frame_0.png").exists());

        queue.running.store(false, Ordering::Release);
        assert_eq!(queue.submit(job(dir.path())).unwrap(), Submission::Started);
        assert!(matches!(wait_for_end(&queue), ExportNotice::Completed(_)));
    }

    #[test]
    fn test_missing_tool_reported_by_worker() {
        let dir = tempfile::tempdir().unwrap();
        let mut gif = ExportJob::for_test(
            ExportKind::Gif,
            dir.path(),
            vec![RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))],
        );
        gif.tool = PathBuf::from("/nonexistent/ffmpeg");
        let mut queue = ExportQueue::new();
        assert_eq!(queue.submit(gif).unwrap(), Submission::Started);
        assert!(matches!(wait_for_end(&queue), ExportNotice::Failed(ExportError::ToolMissing)));
        assert!(!queue.is_running());
    }

    #[test]
    fn test_collision_never_overwrites_without_consent() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("frame_0.png");
        std::fs::write(&existing, b"keep me").unwrap();

        let mut queue = ExportQueue::new();
        let submission = queue.submit(job(dir.path())).unwrap();
        assert_eq!(submission, Submission::AwaitingConfirmation(vec![existing.clone()]));
        assert!(queue.pending().is_some());

        assert!(!queue.reply(false).unwrap());
        assert!(queue.pending().is_none());
        assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
        assert!(!dir.path().join("frame_1.png").exists());
    }

    #[test]
    fn test_accepting_overwrite_runs_job() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("frame_0.png");
        std::fs::write(&existing, b"old").unwrap();

        let mut queue = ExportQueue::new();
        queue.submit(job(dir.path())).unwrap();
        assert!(queue.reply(true).unwrap());
        assert!(matches!(wait_for_end(&queue), ExportNotice::Completed(_)));
        assert!(image::open(&existing).is_ok());
    }

    #[test]
    fn test_new_submission_replaces_pending() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frame_0.png"), b"old").unwrap();
        let mut queue = ExportQueue::new();
        queue.submit(job(dir.path())).unwrap();

        let mut other = job(dir.path());
        other.name = "walk".to_string();
        assert_eq!(queue.submit(other).unwrap(), Submission::Started);
        assert!(queue.pending().is_none());
        assert!(matches!(wait_for_end(&queue), ExportNotice::Completed(_)));
    }

    #[test]
    fn test_empty_frames_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut queue = ExportQueue::new();
        let empty = ExportJob::for_test(ExportKind::PngSequence, dir.path(), Vec::new());
        assert!(matches!(queue.submit(empty), Err(ExportError::EmptyFrames)));
    }
}
