// src/rl/telemetry.rs
//
// JSONL training telemetry.
//
// One JSON object per line:
// - {"record":"step", ...}         after every Q-update
// - {"record":"episode_end", ...}  with the episode summary and a Q-table
//                                  snapshot
//
// Controlled by environment variables when built via `from_env`:
// - TUMMYTIME_TELEMETRY_MODE: "off" (default) or "jsonl"
// - TUMMYTIME_TELEMETRY_PATH: path to the JSONL file (appended to)
//
// Telemetry never fails training: the file is opened lazily, and any I/O
// error disables the sink for the rest of the run.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::logging::StepObserver;

use super::learner::{EpisodeSummary, StepEvent};
use super::q_table::QTable;

pub const TELEMETRY_MODE_ENV: &str = "TUMMYTIME_TELEMETRY_MODE";
pub const TELEMETRY_PATH_ENV: &str = "TUMMYTIME_TELEMETRY_PATH";

/// Bumped whenever a record's field set changes.
pub const TELEMETRY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum TelemetryRecord<'a> {
    Step {
        schema_version: u32,
        #[serde(flatten)]
        event: &'a StepEvent,
    },
    EpisodeEnd {
        schema_version: u32,
        #[serde(flatten)]
        summary: &'a EpisodeSummary,
        q_table: &'a QTable,
    },
}

/// Observer that appends JSONL records to a file.
#[derive(Debug)]
pub struct JsonlSink {
    enabled: bool,
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    log_steps: bool,
    records_written: u64,
}

impl Default for JsonlSink {
    fn default() -> Self {
        Self::disabled()
    }
}

impl JsonlSink {
    /// Sink that writes nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: None,
            writer: None,
            log_steps: true,
            records_written: 0,
        }
    }

    /// Enabled sink appending to `path`. The file is created on first write.
    pub fn enable(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            path: Some(path.into()),
            writer: None,
            log_steps: true,
            records_written: 0,
        }
    }

    /// Create from `TUMMYTIME_TELEMETRY_MODE` / `TUMMYTIME_TELEMETRY_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let jsonl = lookup(TELEMETRY_MODE_ENV)
            .map(|s| s.trim().eq_ignore_ascii_case("jsonl"))
            .unwrap_or(false);
        let path = lookup(TELEMETRY_PATH_ENV).map(PathBuf::from);

        match path {
            Some(path) if jsonl => Self::enable(path),
            None if jsonl => {
                eprintln!(
                    "[telemetry] WARN: {}=jsonl but {} is not set; telemetry disabled",
                    TELEMETRY_MODE_ENV, TELEMETRY_PATH_ENV
                );
                Self::disabled()
            }
            _ => Self::disabled(),
        }
    }

    /// Only write episode-end records.
    pub fn episodes_only(mut self) -> Self {
        self.log_steps = false;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lines successfully handed to the writer so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn flush(&mut self) {
        if let Some(writer) = &mut self.writer {
            if writer.flush().is_err() {
                self.disable();
            }
        }
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.writer = None;
    }

    fn ensure_writer(&mut self) -> Option<&mut BufWriter<File>> {
        if !self.enabled {
            return None;
        }

        if self.writer.is_none() {
            let path = self.path.as_ref()?;

            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => self.writer = Some(BufWriter::new(file)),
                Err(e) => {
                    eprintln!(
                        "[telemetry] WARN: could not open {}: {e}; telemetry disabled",
                        path.display()
                    );
                    self.disable();
                    return None;
                }
            }
        }

        self.writer.as_mut()
    }

    fn write_record(&mut self, record: &TelemetryRecord<'_>) {
        let line = match serde_json::to_string(record) {
            Ok(s) => s,
            Err(_) => return,
        };

        let Some(writer) = self.ensure_writer() else {
            return;
        };

        if writeln!(writer, "{}", line).is_err() {
            self.disable();
        } else {
            self.records_written += 1;
        }
    }
}

impl StepObserver for JsonlSink {
    fn on_step(&mut self, event: &StepEvent) {
        if !self.log_steps {
            return;
        }
        self.write_record(&TelemetryRecord::Step {
            schema_version: TELEMETRY_SCHEMA_VERSION,
            event,
        });
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary, q_table: &QTable) {
        self.write_record(&TelemetryRecord::EpisodeEnd {
            schema_version: TELEMETRY_SCHEMA_VERSION,
            summary,
            q_table,
        });
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        self.flush();
    }
}
