//! Processing session state
//!
//! A session owns one batch of parsed records, the cursor into it and the
//! outcome counters. It progresses IDLE → RUNNING → FINISHED (or CANCELLED)
//! and is discarded once its summary has been produced.

use crate::parser::ImportRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    /// Batch loaded, nothing submitted yet
    Idle,
    /// Records are being submitted
    Running,
    /// Cursor reached the end of the batch
    Finished,
    /// Stopped by the operator between records
    Cancelled,
}

/// Result of submitting one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Item created by the backend
    Created,
    /// Backend reported the item already existed
    Skipped,
    /// Transport failure, non-2xx status, or `ok: false`
    Failed(String),
}

/// Outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub success: usize,
    pub skipped: usize,
    pub error: usize,
}

impl ImportCounts {
    pub fn processed(&self) -> usize {
        self.success + self.skipped + self.error
    }
}

/// One batch being submitted
#[derive(Debug, Clone)]
pub struct ProcessingSession {
    pub session_id: Uuid,
    pub state: SessionState,
    records: Vec<ImportRecord>,
    current_index: usize,
    pub counts: ImportCounts,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ProcessingSession {
    /// Create an idle session over a parsed batch
    pub fn new(records: Vec<ImportRecord>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Idle,
            records,
            current_index: 0,
            counts: ImportCounts::default(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Transition to new state, stamping start and end times
    pub fn transition_to(&mut self, new_state: SessionState) {
        tracing::debug!(
            session_id = %self.session_id,
            old_state = ?self.state,
            new_state = ?new_state,
            "Session state transition"
        );
        self.state = new_state;

        match new_state {
            SessionState::Running => {
                self.started_at.get_or_insert_with(Utc::now);
            }
            SessionState::Finished | SessionState::Cancelled => {
                self.ended_at = Some(Utc::now());
            }
            SessionState::Idle => {}
        }
    }

    /// Record at the cursor, `None` once the batch is exhausted
    pub fn current(&self) -> Option<&ImportRecord> {
        self.records.get(self.current_index)
    }

    /// Count an outcome for the current record and advance the cursor
    pub fn record(&mut self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Created => self.counts.success += 1,
            SubmitOutcome::Skipped => self.counts.skipped += 1,
            SubmitOutcome::Failed(_) => self.counts.error += 1,
        }
        self.current_index += 1;
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.records.len()
    }

    /// `n/total` label for the record about to be submitted
    pub fn progress_label(&self) -> String {
        format!("{}/{}", (self.current_index + 1).min(self.total()), self.total())
    }

    /// Check if session is terminal (finished)
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SessionState::Finished | SessionState::Cancelled)
    }

    /// Close the session and produce its summary
    pub fn finish(mut self, cancelled: bool) -> ImportSummary {
        self.transition_to(if cancelled {
            SessionState::Cancelled
        } else {
            SessionState::Finished
        });

        let elapsed_ms = match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => (end - start).num_milliseconds().max(0) as u64,
            _ => 0,
        };

        ImportSummary {
            session_id: self.session_id,
            total: self.records.len(),
            counts: self.counts,
            cancelled,
            elapsed_ms,
        }
    }
}

/// End-of-batch report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub session_id: Uuid,
    pub total: usize,
    pub counts: ImportCounts,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

impl ImportSummary {
    /// The item listing is stale only if something was created
    pub fn should_refresh(&self) -> bool {
        self.counts.success > 0
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cancelled {
            writeln!(
                f,
                "Import cancelled after {}/{} items",
                self.counts.processed(),
                self.total
            )?;
        } else {
            writeln!(f, "Import completed")?;
        }

        writeln!(f, "Results:")?;
        if self.counts.success > 0 {
            writeln!(f, "  {} items added", self.counts.success)?;
        }
        if self.counts.skipped > 0 {
            writeln!(f, "  {} items already existed", self.counts.skipped)?;
        }
        if self.counts.error > 0 {
            writeln!(f, "  {} errors", self.counts.error)?;
        }
        if self.counts.processed() == 0 {
            writeln!(f, "  No items were processed")?;
        }
        write!(f, "Elapsed: {:.1}s", self.elapsed_ms as f64 / 1000.0)
    }
}
