//! Suggestion Orchestrator
//!
//! Single-field suggestions and the sequential "refresh all" batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::{Pipeline, PipelineError, RefreshError, RequestTracker};
use crate::domain::{Language, SuggestionField, SuggestionSink, SuggestionValue};

/// What happened to one suggestion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// The value was written to the sink
    Applied(SuggestionValue),
    /// A newer request for the same field started; the value was dropped
    Superseded,
}

/// Per-field results of a refresh-all batch
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub updated: Vec<SuggestionField>,
    pub superseded: Vec<SuggestionField>,
    pub failed: Vec<(SuggestionField, PipelineError)>,
}

impl RefreshReport {
    /// Every field was attempted, in order
    pub fn attempted(&self) -> usize {
        self.updated.len() + self.superseded.len() + self.failed.len()
    }

    pub fn is_fully_updated(&self) -> bool {
        self.updated.len() == SuggestionField::ALL.len()
    }

    pub fn failed_fields(&self) -> Vec<SuggestionField> {
        self.failed.iter().map(|(field, _)| *field).collect()
    }
}

/// Clears the in-progress flag when the batch ends or its future is dropped
struct RefreshGuard<'a>(&'a AtomicBool);

impl<'a> RefreshGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives per-field suggestions into a [`SuggestionSink`]
pub struct SuggestionOrchestrator {
    pipeline: Arc<Pipeline>,
    tracker: RequestTracker<SuggestionField>,
    refreshing: AtomicBool,
}

impl SuggestionOrchestrator {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        debug!("SuggestionOrchestrator::new: called");
        Self {
            pipeline,
            tracker: RequestTracker::new(),
            refreshing: AtomicBool::new(false),
        }
    }

    /// True while a refresh-all batch is in flight
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Suggest one field and apply it unless a newer request superseded it
    ///
    /// Errors are returned so the caller can show an inline indicator.
    pub async fn suggest_one<S>(
        &self,
        field: SuggestionField,
        sink: &mut S,
        language: Language,
    ) -> Result<SuggestionOutcome, PipelineError>
    where
        S: SuggestionSink + Send + ?Sized,
    {
        debug!(%field, %language, "suggest_one: called");
        let token = self.tracker.begin(field);
        let outcome = self.pipeline.suggest(field, language).await;

        if !self.tracker.is_current(&token) {
            debug!(%field, seq = token.seq, "suggest_one: superseded, dropping resolution");
            return Ok(SuggestionOutcome::Superseded);
        }

        let value = outcome?;
        sink.apply(field, value.clone());
        debug!(%field, "suggest_one: applied");
        Ok(SuggestionOutcome::Applied(value))
    }

    /// Refresh all seven fields, one after another, in fixed order
    ///
    /// A failed field is logged and left unchanged; the batch continues.
    /// A second call while one is running is rejected.
    pub async fn refresh_all<S>(&self, sink: &mut S, language: Language) -> Result<RefreshReport, RefreshError>
    where
        S: SuggestionSink + Send + ?Sized,
    {
        debug!(%language, "refresh_all: called");
        let _guard = RefreshGuard::acquire(&self.refreshing).ok_or_else(|| {
            debug!("refresh_all: already running");
            RefreshError::AlreadyRunning
        })?;

        let mut report = RefreshReport::default();
        for field in SuggestionField::ALL {
            match self.suggest_one(field, sink, language).await {
                Ok(SuggestionOutcome::Applied(_)) => report.updated.push(field),
                Ok(SuggestionOutcome::Superseded) => report.superseded.push(field),
                Err(e) => {
                    warn!(%field, error = %e, "Suggestion failed during refresh, continuing");
                    report.failed.push((field, e));
                }
            }
        }

        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            superseded = report.superseded.len(),
            "Refreshed all fields"
        );
        Ok(report)
    }
}
