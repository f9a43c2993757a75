//! Structured event stream for exercise milestones.
//!
//! Discrete, typed events serialized as newline-delimited JSON with a
//! monotonically increasing sequence number. The emitter is the usual
//! implementation handed to the core's log and workflow sinks by the
//! CLI; the core itself only knows the sink functions.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AttackId, AttackStatus, LogEntry, WorkflowEvent};

/// A discrete event emitted while an exercise runs.
///
/// Each variant is tagged with `"type"` when serialized so consumers can
/// dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An exercise run has started.
    ExerciseStarted {
        /// When the run started.
        timestamp: DateTime<Utc>,
        /// Exercise name from the scenario.
        exercise: String,
        /// Target description.
        target: String,
    },

    /// A lifecycle transition produced a log entry.
    Log {
        /// The entry as produced by the core.
        entry: LogEntry,
    },

    /// A workflow step emitted an event.
    Workflow {
        /// The event as produced by the executor.
        event: WorkflowEvent,
    },

    /// An attack reached a terminal status.
    AttackResolved {
        /// When the resolution was observed.
        timestamp: DateTime<Utc>,
        /// Resolved attack identity.
        attack_id: AttackId,
        /// Terminal status.
        status: AttackStatus,
    },

    /// An exercise run has finished.
    ExerciseCompleted {
        /// When the run finished.
        timestamp: DateTime<Utc>,
        /// Attacks launched during the run.
        attacks: usize,
        /// Defenses that ended in BLOCKED.
        blocked: usize,
        /// Defenses that ended in FAILED.
        failed: usize,
    },
}

/// Wraps an [`Event`] with its sequence number.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event, flattened into the same JSON object.
    #[serde(flatten)]
    event: &'a Event,
}

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization and I/O failures are silently dropped — observability
/// must never take down a run.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl EventEmitter {
    /// Creates an emitter over an arbitrary writer.
    #[must_use]
    pub fn to_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::to_writer(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that writes to stderr, leaving stdout free for
    /// other output.
    #[must_use]
    pub fn stderr() -> Self {
        Self::to_writer(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::to_writer(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn to_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::to_writer(Box::new(file)))
    }

    /// Emits an event as a single JSONL line and flushes.
    pub fn emit(&self, event: &Event) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = Envelope { sequence, event };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("emitted", &self.emitted())
            .finish_non_exhaustive()
    }
}
