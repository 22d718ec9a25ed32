//! Structured JSONL logger for debugging and event reconstruction.
//!
//! Every session command and event, plus subscription mutations, is appended
//! to `logs/events.jsonl` with a monotonic sequence number and an ISO 8601
//! timestamp, so a support request can be answered by replaying the log.
//! Secrets never reach this file: commands are logged through redacted
//! summaries (see `SessionCommand::summary`).

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::session_machine::{SessionCommand, SessionEvent};

pub struct StructuredLogger {
    client_id: String,
    seq: AtomicU64,
    log_file: Mutex<File>,
}

/// A single log entry in JSONL format.
#[derive(Serialize)]
struct LogEntry {
    /// Monotonic sequence number, unique within this logger's lifetime.
    seq: u64,
    /// ISO 8601 timestamp with microseconds.
    ts: String,
    /// Client instance ID for correlation.
    client_id: String,
    /// Component that emitted the log.
    component: String,
    /// Structured event data.
    event: Value,
}

impl StructuredLogger {
    /// Creates a logger appending to `<logs_dir>/events.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the logs directory cannot be created or the log
    /// file cannot be opened.
    pub fn new(client_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join("events.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            client_id: client_id.to_string(),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
        })
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Logs a structured event as a single JSONL line. Thread-safe; logging
    /// failures are swallowed because the log must never take the client down.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            client_id: self.client_id.clone(),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    /// Logs a session command receipt. `machine_seq` is the state machine's
    /// own counter, distinct from this logger's entry sequence.
    pub fn log_command(&self, machine_seq: u64, command: &SessionCommand) {
        self.log(
            "Session",
            serde_json::json!({
                "type": "SessionCommand",
                "machine_seq": machine_seq,
                "command": command.summary(),
            }),
        );
    }

    /// Logs an event emitted by the session state machine.
    pub fn log_event(&self, machine_seq: u64, event: &SessionEvent) {
        self.log(
            "Session",
            serde_json::json!({
                "type": "SessionEvent",
                "machine_seq": machine_seq,
                "event": event,
            }),
        );
    }
}
