//! Background document I/O.
//!
//! Reads, writes and image decodes run on a dedicated thread so the window
//! stays responsive. Completions are collected by polling once per frame.

use crate::error::{Error, Result};
use crate::files::{load_image_file, FileGateway};
use eframe::egui::ColorImage;
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Work sent to the I/O thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoJob {
    /// Read a document
    Read(PathBuf),
    /// Write a document
    Write { path: PathBuf, content: String },
    /// Decode an image referenced from a document
    DecodeImage(PathBuf),
}

/// Result of a finished job.
#[derive(Debug)]
pub enum IoCompletion {
    /// A read finished
    Read {
        path: PathBuf,
        result: Result<String>,
    },
    /// A write finished; `content` is the text that was written
    Written {
        path: PathBuf,
        content: String,
        result: Result<()>,
    },
    /// An image decode finished; `None` if it could not be loaded
    ImageDecoded {
        path: PathBuf,
        image: Option<ColorImage>,
    },
}

/// Handle to the I/O thread.
///
/// The thread exits when the handle is dropped.
#[derive(Debug)]
pub struct IoWorker {
    jobs: Sender<IoJob>,
    completions: Receiver<IoCompletion>,
    _thread: JoinHandle<()>,
}

impl IoWorker {
    /// Start the I/O thread.
    ///
    /// `on_complete` is called on the I/O thread after each completion is
    /// queued, typically to request a repaint.
    pub fn spawn<G, F>(gateway: G, on_complete: F) -> Result<Self>
    where
        G: FileGateway + Send + 'static,
        F: Fn() + Send + 'static,
    {
        let (job_tx, job_rx) = channel::<IoJob>();
        let (done_tx, done_rx) = channel();

        let thread = thread::Builder::new()
            .name("marki-mark-io".to_string())
            .spawn(move || {
                for job in job_rx {
                    let completion = run_job(&gateway, job);
                    if done_tx.send(completion).is_err() {
                        break;
                    }
                    on_complete();
                }
                debug!("I/O worker stopped");
            })
            .map_err(|e| Error::Application(format!("Failed to start I/O worker: {}", e)))?;

        Ok(Self {
            jobs: job_tx,
            completions: done_rx,
            _thread: thread,
        })
    }

    /// Queue a job.
    pub fn submit(&self, job: IoJob) {
        if let Err(e) = self.jobs.send(job) {
            warn!("I/O worker is gone, dropping job: {:?}", e.0);
        }
    }

    /// Collect completions that arrived since the last poll.
    ///
    /// This is non-blocking.
    pub fn poll(&self) -> Vec<IoCompletion> {
        let mut completions = Vec::new();
        while let Ok(completion) = self.completions.try_recv() {
            completions.push(completion);
        }
        completions
    }

    #[cfg(test)]
    fn wait(&self) -> Option<IoCompletion> {
        self.completions
            .recv_timeout(std::time::Duration::from_secs(5))
            .ok()
    }
}

fn run_job(gateway: &dyn FileGateway, job: IoJob) -> IoCompletion {
    match job {
        IoJob::Read(path) => {
            let result = gateway.read_file(&path);
            IoCompletion::Read { path, result }
        }
        IoJob::Write { path, content } => {
            let result = gateway.write_file(&path, &content);
            IoCompletion::Written {
                path,
                content,
                result,
            }
        }
        IoJob::DecodeImage(path) => {
            let image = load_image_file(&path);
            IoCompletion::ImageDecoded { path, image }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FsGateway;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_read_completion() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "# A").unwrap();

        let worker = IoWorker::spawn(FsGateway, || {}).unwrap();
        worker.submit(IoJob::Read(path.clone()));

        match worker.wait() {
            Some(IoCompletion::Read { path: p, result }) => {
                assert_eq!(p, path);
                assert_eq!(result.unwrap(), "# A");
            }
            other => panic!("Expected read completion, got {:?}", other),
        }
    }

    #[test]
    fn test_write_completion_carries_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("b.md");

        let worker = IoWorker::spawn(FsGateway, || {}).unwrap();
        worker.submit(IoJob::Write {
            path: path.clone(),
            content: "saved".to_string(),
        });

        match worker.wait() {
            Some(IoCompletion::Written {
                content, result, ..
            }) => {
                assert!(result.is_ok());
                assert_eq!(content, "saved");
            }
            other => panic!("Expected write completion, got {:?}", other),
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "saved");
    }

    #[test]
    fn test_jobs_complete_in_submission_order() {
        let dir = TempDir::new().unwrap();
        let worker = IoWorker::spawn(FsGateway, || {}).unwrap();
        let paths: Vec<PathBuf> = (0..3).map(|i| dir.path().join(format!("{}.md", i))).collect();
        for path in &paths {
            worker.submit(IoJob::Read(path.clone()));
        }

        for expected in &paths {
            match worker.wait() {
                Some(IoCompletion::Read { path, result }) => {
                    assert_eq!(&path, expected);
                    assert!(matches!(result, Err(Error::NotFound { .. })));
                }
                other => panic!("Expected read completion, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_image_decode_completion() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        std::fs::write(&good, crate::files::image_decode::png_bytes(3, 2)).unwrap();
        std::fs::write(&bad, b"garbage").unwrap();

        let worker = IoWorker::spawn(FsGateway, || {}).unwrap();
        worker.submit(IoJob::DecodeImage(good.clone()));
        worker.submit(IoJob::DecodeImage(bad.clone()));

        match worker.wait() {
            Some(IoCompletion::ImageDecoded { path, image }) => {
                assert_eq!(path, good);
                assert_eq!(image.map(|i| i.size), Some([3, 2]));
            }
            other => panic!("Expected image completion, got {:?}", other),
        }
        match worker.wait() {
            Some(IoCompletion::ImageDecoded { path, image }) => {
                assert_eq!(path, bad);
                assert!(image.is_none());
            }
            other => panic!("Expected image completion, got {:?}", other),
        }
    }

    #[test]
    fn test_on_complete_called_per_job() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let worker = IoWorker::spawn(FsGateway, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        worker.submit(IoJob::Read(dir.path().join("x.md")));
        assert!(worker.wait().is_some());
        // The callback runs right after the completion is queued
        for _ in 0..100 {
            if calls.load(Ordering::SeqCst) == 1 {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(worker.poll().is_empty());
    }
}
