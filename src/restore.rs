//! Background decoding of persisted images.
//!
//! Restoring a surface is the one asynchronous step of the sheet: encoded
//! images are decoded on a worker thread and the results are drawn later, when
//! the owner drains completions. Nothing orders a completion against strokes
//! made in the meantime; a restore that lands after the user started signing
//! composites over that ink.
//!
//! Every job carries the mount generation of the surface that queued it, so a
//! completion meant for an earlier mount can be recognized and dropped.

use crate::codec;
use crate::roster::RowId;
use crate::Result;
use image::RgbaImage;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

struct RestoreJob {
    row: RowId,
    generation: u64,
    encoded: String,
}

/// A finished decode for one row.
pub struct RestoreOutcome {
    pub row: RowId,
    /// Mount generation of the surface when the job was queued
    pub generation: u64,
    pub image: Result<RgbaImage>,
}

pub struct RestoreWorker {
    jobs: Option<Sender<RestoreJob>>,
    done: Receiver<RestoreOutcome>,
    handle: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl RestoreWorker {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<RestoreJob>();
        let (done_tx, done_rx) = mpsc::channel::<RestoreOutcome>();
        let handle = std::thread::Builder::new()
            .name("signsheet-restore".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    let image = codec::decode_data_url(&job.encoded);
                    let outcome = RestoreOutcome {
                        row: job.row,
                        generation: job.generation,
                        image,
                    };
                    if done_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                log::warn!("failed to spawn restore worker: {}", e);
                None
            }
        };
        let jobs = handle.as_ref().map(|_| tx);
        RestoreWorker {
            jobs,
            done: done_rx,
            handle,
            in_flight: 0,
        }
    }

    /// Queue a decode. Returns false when the worker is gone and the image
    /// will never be restored.
    pub fn submit(&mut self, row: RowId, generation: u64, encoded: String) -> bool {
        let Some(jobs) = &self.jobs else {
            return false;
        };
        if jobs.send(RestoreJob { row, generation, encoded }).is_err() {
            log::warn!("restore worker stopped; dropping restore for row {}", row);
            self.jobs = None;
            return false;
        }
        self.in_flight += 1;
        true
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Completions available right now, without blocking.
    pub fn try_completed(&mut self) -> Vec<RestoreOutcome> {
        let mut out = Vec::new();
        while self.in_flight > 0 {
            match self.done.try_recv() {
                Ok(outcome) => {
                    self.in_flight -= 1;
                    out.push(outcome);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.in_flight = 0;
                    break;
                }
            }
        }
        out
    }

    /// Block until every queued decode has completed.
    pub fn wait_all(&mut self) -> Vec<RestoreOutcome> {
        let mut out = Vec::with_capacity(self.in_flight);
        while self.in_flight > 0 {
            match self.done.recv() {
                Ok(outcome) => {
                    self.in_flight -= 1;
                    out.push(outcome);
                }
                Err(_) => {
                    self.in_flight = 0;
                }
            }
        }
        out
    }
}

impl Drop for RestoreWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}
