//! Notifications emitted by the multisig engine

use crate::multisig::transaction::TxId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventKind {
    PublicKeySet { owner: String },
    TransactionSubmitted { owner: String, tx_id: TxId },
    TransactionConfirmed { owner: String, tx_id: TxId, confirmations: u32 },
    TransactionExecuted { executor: String, tx_id: TxId },
}

/// A notification with its emission time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultisigEvent {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl MultisigEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Receiver for notifications.
///
/// Events are emitted only after an operation has fully succeeded.
pub trait EventSink {
    fn emit(&mut self, event: MultisigEvent);
}

/// Collect events in memory
impl EventSink for Vec<MultisigEvent> {
    fn emit(&mut self, event: MultisigEvent) {
        self.push(event);
    }
}

/// Render events through the `log` facade
#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: MultisigEvent) {
        match &event.kind {
            EventKind::PublicKeySet { owner } => {
                log::info!("event: public key set for {}", owner)
            }
            EventKind::TransactionSubmitted { owner, tx_id } => {
                log::info!("event: transaction {} submitted by {}", tx_id, owner)
            }
            EventKind::TransactionConfirmed {
                owner,
                tx_id,
                confirmations,
            } => log::info!(
                "event: transaction {} confirmed by {} ({} confirmations)",
                tx_id,
                owner,
                confirmations
            ),
            EventKind::TransactionExecuted { executor, tx_id } => {
                log::info!("event: transaction {} executed by {}", tx_id, executor)
            }
        }
    }
}
