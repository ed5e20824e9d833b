//! Sequential, partial-failure-tolerant resolution of many records.
//!
//! Records are processed strictly in input order, one provider lookup at a
//! time. Each processed record yields exactly one [`BatchOutcome`] and one
//! progress callback. Failures stay per-item; the batch only stops early
//! when cancelled.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use roomgeo_core::{GeocodeResult, GeocodingStatus, LocationRecord, LocationUpdate};
use serde::Serialize;

use crate::error::GeocodeError;
use crate::resolver::LocationResolver;

const NO_ADDRESS: &str = "no address";
const MANUAL_PRESERVED: &str = "manual coordinates preserved";

/// Persistence collaborator: writes one update back to the record store.
pub trait LocationStore {
    type Error: std::fmt::Display;

    fn persist(
        &self,
        record_id: &str,
        update: &LocationUpdate,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Result of processing one record.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub record_id: String,
    pub success: bool,
    pub result: Option<GeocodeResult>,
    pub error: Option<String>,
    pub used_fallback: bool,
    /// The record was not sent to the provider and nothing was persisted.
    pub skipped: bool,
}

impl BatchOutcome {
    fn skipped(record_id: &str, reason: &str) -> Self {
        Self {
            record_id: record_id.to_owned(),
            success: false,
            result: None,
            error: Some(reason.to_owned()),
            used_fallback: false,
            skipped: true,
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
    pub label: String,
    pub skipped: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    pub cancelled: bool,
}

impl BatchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.success && !o.skipped)
            .count()
    }

    #[must_use]
    pub fn used_fallback(&self) -> usize {
        self.outcomes.iter().filter(|o| o.used_fallback).count()
    }
}

/// Cooperative stop flag, checked between records.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Re-resolve records whose status is `manual`.
    pub overwrite_manual: bool,
}

pub struct BatchResolver<S> {
    resolver: LocationResolver,
    store: S,
    options: BatchOptions,
}

impl<S: LocationStore> BatchResolver<S> {
    #[must_use]
    pub fn new(resolver: LocationResolver, store: S) -> Self {
        Self::with_options(resolver, store, BatchOptions::default())
    }

    #[must_use]
    pub fn with_options(resolver: LocationResolver, store: S, options: BatchOptions) -> Self {
        Self {
            resolver,
            store,
            options,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves and persists every record in order.
    ///
    /// `on_progress` fires once per processed record, after its outcome is
    /// known. A panic inside it is logged and swallowed. When `cancel` is
    /// set, the batch stops before the next record and returns what it has.
    pub async fn resolve_batch<P>(
        &self,
        records: &[LocationRecord],
        mut on_progress: P,
        cancel: &CancelSignal,
    ) -> BatchReport
    where
        P: FnMut(&BatchProgress),
    {
        let total = records.len();
        let mut report = BatchReport {
            outcomes: Vec::with_capacity(total),
            cancelled: false,
        };

        for (index, record) in records.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(processed = index, total, "batch cancelled");
                report.cancelled = true;
                break;
            }

            let outcome = self.process_record(record).await;

            let progress = BatchProgress {
                done: index + 1,
                total,
                label: record.label().to_owned(),
                skipped: outcome.skipped,
            };
            if catch_unwind(AssertUnwindSafe(|| on_progress(&progress))).is_err() {
                tracing::warn!(
                    record_id = %record.id,
                    "progress callback panicked, continuing batch"
                );
            }

            report.outcomes.push(outcome);
        }

        tracing::info!(
            total,
            processed = report.outcomes.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            cancelled = report.cancelled,
            "geocoding batch finished"
        );

        report
    }

    async fn process_record(&self, record: &LocationRecord) -> BatchOutcome {
        let Some(address) = record.usable_address() else {
            tracing::warn!(record_id = %record.id, "record has no address, skipping");
            return BatchOutcome::skipped(&record.id, NO_ADDRESS);
        };

        if record.status == GeocodingStatus::Manual && !self.options.overwrite_manual {
            tracing::debug!(record_id = %record.id, "skipping manually placed record");
            return BatchOutcome::skipped(&record.id, MANUAL_PRESERVED);
        }

        let resolution = self
            .resolver
            .resolve_detailed(address, self.resolver.region())
            .await;
        let used_fallback = resolution.used_fallback();
        let failure = resolution.failure.map(|e| e.to_string());

        if let Err(e) = self.store.persist(&record.id, &resolution.update).await {
            let err = GeocodeError::Persistence {
                record_id: record.id.clone(),
                reason: e.to_string(),
            };
            tracing::error!(record_id = %record.id, error = %err, "persisting location update failed");
            let error = match failure {
                Some(resolution_error) => format!("{resolution_error}; {err}"),
                None => err.to_string(),
            };
            return BatchOutcome {
                record_id: record.id.clone(),
                success: false,
                result: resolution.result,
                error: Some(error),
                used_fallback,
                skipped: false,
            };
        }

        BatchOutcome {
            record_id: record.id.clone(),
            success: failure.is_none(),
            result: resolution.result,
            error: failure,
            used_fallback,
            skipped: false,
        }
    }
}
