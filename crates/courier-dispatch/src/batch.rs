use std::sync::Arc;

use serde::{Deserialize, Serialize};

use courier_core::channel::DeliveryChannel;
use courier_core::envelope::{self, RawRecord, RequestKind};
use courier_core::errors::DispatchError;
use courier_core::events::OutboundEvent;

use crate::executor::RunExecutor;
use crate::notify::FailureNotifier;

/// Per-record verdict inside a [`BatchOutcome`].
#[derive(Debug)]
pub enum RecordDisposition {
    Success,
    Fail { error: DispatchError },
}

#[derive(Debug)]
pub struct RecordResult {
    pub record: RawRecord,
    pub disposition: RecordDisposition,
}

impl RecordResult {
    pub fn is_success(&self) -> bool {
        matches!(self.disposition, RecordDisposition::Success)
    }
}

/// Ordered per-record results for one batch. Built by the coordinator,
/// consumed once by the failure notifier and the acknowledgment report.
#[derive(Debug)]
pub struct BatchOutcome {
    results: Vec<RecordResult>,
}

impl BatchOutcome {
    pub fn new(results: Vec<RecordResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[RecordResult] {
        &self.results
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }

    /// Failures in batch order, each with the original record.
    pub fn failures(&self) -> impl Iterator<Item = (&DispatchError, &RawRecord)> {
        self.results.iter().filter_map(|r| match &r.disposition {
            RecordDisposition::Fail { error } => Some((error, &r.record)),
            RecordDisposition::Success => None,
        })
    }

    /// Translate into the acknowledgment shape the queue infrastructure
    /// expects: every failed record that carries a message id is named, so
    /// the infra can redeliver exactly the failed subset (its own policy
    /// decides what to do with non-redeliverable failures).
    pub fn report(&self) -> BatchReport {
        BatchReport {
            item_failures: self
                .failures()
                .filter_map(|(_, record)| record.message_id.clone())
                .map(|item_identifier| BatchItemFailure { item_identifier })
                .collect(),
        }
    }
}

/// Partial-batch acknowledgment response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub item_failures: Vec<BatchItemFailure>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

/// Iterates an inbound batch, dispatching each record independently and
/// isolating per-record failures: one record's failure never aborts the
/// batch. After the loop, failed records produce error notifications.
pub struct BatchCoordinator {
    executor: RunExecutor,
    channel: Arc<dyn DeliveryChannel>,
    notifier: FailureNotifier,
}

impl BatchCoordinator {
    pub fn new(executor: RunExecutor, channel: Arc<dyn DeliveryChannel>) -> Self {
        let notifier = FailureNotifier::new(Arc::clone(&channel));
        Self {
            executor,
            channel,
            notifier,
        }
    }

    /// Never returns an error: everything record-level is captured in the
    /// outcome, and infrastructure-level concerns live with the caller.
    pub async fn process_batch(&self, records: Vec<RawRecord>) -> BatchOutcome {
        let mut results = Vec::with_capacity(records.len());

        for record in records {
            let disposition = match self.handle_record(&record).await {
                Ok(()) => RecordDisposition::Success,
                Err(error) => {
                    tracing::warn!(
                        %error,
                        kind = error.error_kind(),
                        message_id = ?record.message_id,
                        "record failed"
                    );
                    RecordDisposition::Fail { error }
                }
            };
            results.push(RecordResult { record, disposition });
        }

        let outcome = BatchOutcome::new(results);
        self.notifier.notify_failures(outcome.failures());

        tracing::info!(
            success = outcome.success_count(),
            failed = outcome.failure_count(),
            "batch processed"
        );
        outcome
    }

    async fn handle_record(&self, record: &RawRecord) -> Result<(), DispatchError> {
        let descriptor = envelope::decode(record)?;

        match descriptor.kind {
            RequestKind::Run(payload) => self.executor.execute(&descriptor.user_id, payload).await,
            RequestKind::Heartbeat(payload) => {
                let event = OutboundEvent::heartbeat(&descriptor.user_id, &payload.session_id);
                if let Err(error) = self.channel.send(&event) {
                    tracing::debug!(%error, "heartbeat delivery dropped");
                }
                Ok(())
            }
            RequestKind::Unrecognized { action } => {
                tracing::debug!(action = %action, "ignoring unrecognized action");
                Ok(())
            }
        }
    }
}
