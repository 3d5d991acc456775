//! JSONL file writer for council events.
//!
//! Each [`CouncilEvent`] is serialized as a single JSON line carrying its
//! `type` tag plus an RFC3339 `timestamp`. Serialization happens on the
//! caller's thread; file I/O happens on a dedicated writer thread fed by a
//! channel, so `emit` never waits on the disk.

use council_application::{CouncilEvent, TelemetrySink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use tracing::warn;

/// JSONL telemetry sink that appends one JSON object per line.
///
/// Lines are flushed as they are written. Dropping the sink drains the
/// channel and joins the writer thread.
pub struct JsonlTelemetrySink {
    sender: Option<Sender<String>>,
    writer: Option<JoinHandle<()>>,
    path: PathBuf,
}

impl JsonlTelemetrySink {
    /// Open (append) the given path and start the writer thread.
    ///
    /// Creates parent directories if needed. Returns `None` if the file
    /// cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create telemetry directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open telemetry file {}: {}", path.display(), e);
                return None;
            }
        };

        let (sender, receiver) = mpsc::channel::<String>();
        let writer = std::thread::Builder::new()
            .name("council-telemetry".to_string())
            .spawn(move || write_lines(BufWriter::new(file), receiver));

        let writer = match writer {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Could not start telemetry writer: {}", e);
                return None;
            }
        };

        Some(Self {
            sender: Some(sender),
            writer: Some(writer),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the event file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(event: &CouncilEvent) -> Option<String> {
        let mut record = serde_json::to_value(event).ok()?;
        if let serde_json::Value::Object(map) = &mut record {
            let timestamp =
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
        }
        serde_json::to_string(&record).ok()
    }
}

fn write_lines(mut writer: BufWriter<File>, receiver: mpsc::Receiver<String>) {
    for line in receiver {
        let _ = writeln!(writer, "{}", line).and_then(|_| writer.flush());
    }
    let _ = writer.flush();
}

impl TelemetrySink for JsonlTelemetrySink {
    fn emit(&self, event: &CouncilEvent) {
        let Some(line) = Self::render(event) else {
            return;
        };
        if let Some(sender) = &self.sender {
            let _ = sender.send(line);
        }
    }
}

impl Drop for JsonlTelemetrySink {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop.
        self.sender.take();
        if let Some(handle) = self.writer.take() {
            let _ = handle.join();
        }
    }
}
