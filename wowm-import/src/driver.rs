//! Sequential submission driver
//!
//! Submits a parsed batch to the backend one record at a time. The next
//! request is only sent after the previous outcome has been recorded and
//! the inter-record pause has elapsed. A failed record is counted and
//! logged; it never stops the batch. The cancellation token is checked
//! between records.

use crate::client::{AddItemRequest, ItemCreator, ListingRefresher};
use crate::error::{ImportError, ImportResult};
use crate::parser::ImportRecord;
use crate::prompt::Confirmer;
use crate::session::{ImportSummary, ProcessingSession, SessionState, SubmitOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wowm_common::config::ImportConfig;

/// Pacing and confirmation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSettings {
    /// Pause after an "already existed" response
    pub skip_delay: Duration,
    /// Pause after a created item or a failure
    pub submit_delay: Duration,
    /// Batches larger than this need operator confirmation
    pub confirm_threshold: usize,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for DriverSettings {
    fn from(config: &ImportConfig) -> Self {
        Self {
            skip_delay: config.skip_delay(),
            submit_delay: config.submit_delay(),
            confirm_threshold: config.confirm_threshold,
        }
    }
}

impl DriverSettings {
    /// Pause before the record following `outcome`
    pub fn delay_after(&self, outcome: &SubmitOutcome) -> Duration {
        match outcome {
            SubmitOutcome::Skipped => self.skip_delay,
            SubmitOutcome::Created | SubmitOutcome::Failed(_) => self.submit_delay,
        }
    }
}

/// Clears the active flag when a run ends, however it ends
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives one import batch at a time
pub struct ImportDriver {
    creator: Arc<dyn ItemCreator>,
    refresher: Option<Arc<dyn ListingRefresher>>,
    settings: DriverSettings,
    active: AtomicBool,
}

impl ImportDriver {
    pub fn new(creator: Arc<dyn ItemCreator>, settings: DriverSettings) -> Self {
        Self {
            creator,
            refresher: None,
            settings,
            active: AtomicBool::new(false),
        }
    }

    /// Refresh the item listing after a batch that created something
    pub fn with_refresher(mut self, refresher: Arc<dyn ListingRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// True while a batch is being processed
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn begin(&self) -> ImportResult<ActiveGuard<'_>> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ImportError::SessionActive)?;
        Ok(ActiveGuard(&self.active))
    }

    /// Process a batch to completion or cancellation
    ///
    /// # Errors
    ///
    /// - `EmptyBatch` if `records` is empty
    /// - `SessionActive` if another batch is running on this driver
    /// - `ConfirmationDeclined` if the operator refuses a large batch or
    ///   cancels while the confirmation is pending
    ///
    /// Per-record failures are not errors; they are counted in the summary.
    pub async fn run(
        &self,
        records: Vec<ImportRecord>,
        confirmer: &dyn Confirmer,
        cancel_token: &CancellationToken,
    ) -> ImportResult<ImportSummary> {
        if records.is_empty() {
            return Err(ImportError::EmptyBatch);
        }

        let _guard = self.begin()?;

        let total = records.len();
        if total > self.settings.confirm_threshold {
            let confirmed = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => false,
                answer = confirmer.confirm_large_batch(total) => answer,
            };
            if !confirmed {
                info!(total, "Import declined by operator");
                return Err(ImportError::ConfirmationDeclined(total));
            }
        }

        let mut session = ProcessingSession::new(records);
        session.transition_to(SessionState::Running);
        info!(session_id = %session.session_id, total, "Starting import");

        let mut cancelled = false;
        while let Some(record) = session.current().cloned() {
            if cancel_token.is_cancelled() {
                cancelled = true;
                break;
            }

            let progress = session.progress_label();
            let outcome = self.submit_one(&record).await;
            log_outcome(&record, &outcome, &progress);

            let delay = self.settings.delay_after(&outcome);
            session.record(&outcome);
            if session.is_complete() {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if cancelled {
            warn!(
                session_id = %session.session_id,
                processed = session.current_index(),
                total,
                "Import cancelled"
            );
        }

        let summary = session.finish(cancelled);
        info!(
            session_id = %summary.session_id,
            success = summary.counts.success,
            skipped = summary.counts.skipped,
            errors = summary.counts.error,
            elapsed_ms = summary.elapsed_ms,
            "Import finished"
        );

        if summary.should_refresh() {
            if let Some(refresher) = &self.refresher {
                if let Err(e) = refresher.refresh_listing().await {
                    warn!("Failed to refresh item listing: {}", e);
                }
            }
        }

        Ok(summary)
    }

    /// Submit a single record; failures become `SubmitOutcome::Failed`
    pub async fn submit_one(&self, record: &ImportRecord) -> SubmitOutcome {
        let request = AddItemRequest::from(record);
        match self.creator.create_item(&request).await {
            Ok(response) => response.outcome(),
            Err(e) => SubmitOutcome::Failed(e.to_string()),
        }
    }
}

fn log_outcome(record: &ImportRecord, outcome: &SubmitOutcome, progress: &str) {
    let profession = record.profession.map(|p| p.as_str()).unwrap_or("-");
    match outcome {
        SubmitOutcome::Created => info!(
            progress,
            name = %record.name,
            decor = record.is_decor,
            profession,
            "Item added"
        ),
        SubmitOutcome::Skipped => info!(
            progress,
            name = %record.name,
            decor = record.is_decor,
            profession,
            "Item already existed"
        ),
        SubmitOutcome::Failed(reason) => error!(
            progress,
            line = record.line_number,
            original_line = %record.original_line,
            error = %reason,
            "Failed to import line"
        ),
    }
}
