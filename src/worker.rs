//! Export worker
//!
//! Runs exports on a dedicated thread so the TUI keeps drawing while a frame
//! is rasterized and encoded.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use image::RgbaImage;
use tracing::{debug, warn};

use crate::capture::{CaptureExporter, ExportSink, Rasterizer};
use crate::preview::PreviewNode;

/// Messages sent from the main thread to the worker
#[derive(Debug)]
pub enum WorkerMessage {
    /// Export a snapshot of the preview
    ExportRequest { node: PreviewNode },
    /// Shutdown signal
    Shutdown,
}

/// Responses sent from the worker to the main thread
#[derive(Debug)]
pub enum WorkerResponse {
    /// File written
    Saved {
        path: std::path::PathBuf,
        image: RgbaImage,
        elapsed_ms: u64,
    },
    /// Export produced no file
    Failed(String),
}

/// Handle to the worker thread and its channels
pub struct WorkerHandle {
    pub request_tx: Sender<WorkerMessage>,
    pub response_rx: Receiver<WorkerResponse>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Stop the worker and wait for it to finish the current export
    pub fn shutdown(mut self) {
        let _ = self.request_tx.send(WorkerMessage::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the export worker, moving the exporter onto its thread
pub fn spawn_worker<R, S>(exporter: CaptureExporter<R, S>) -> std::io::Result<WorkerHandle>
where
    R: Rasterizer + Send + 'static,
    S: ExportSink + Send + 'static,
{
    let (request_tx, request_rx) = unbounded::<WorkerMessage>();
    let (response_tx, response_rx) = unbounded::<WorkerResponse>();

    let thread = thread::Builder::new()
        .name("export-worker".to_string())
        .spawn(move || worker_loop(exporter, request_rx, response_tx))?;

    Ok(WorkerHandle {
        request_tx,
        response_rx,
        thread: Some(thread),
    })
}

/// Main worker loop - processes messages until shutdown
fn worker_loop<R: Rasterizer, S: ExportSink>(
    exporter: CaptureExporter<R, S>,
    rx: Receiver<WorkerMessage>,
    tx: Sender<WorkerResponse>,
) {
    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMessage::Shutdown => break,
            WorkerMessage::ExportRequest { node } => {
                debug!(style = %node.style, "export requested");
                let response = match exporter.export(&node) {
                    Ok(outcome) => WorkerResponse::Saved {
                        path: outcome.path,
                        image: outcome.image,
                        elapsed_ms: outcome.elapsed_ms,
                    },
                    Err(e) => {
                        warn!(error = %e, "export failed");
                        WorkerResponse::Failed(e.to_string())
                    }
                };
                if tx.send(response).is_err() {
                    break;
                }
            }
        }
    }
}
