//! Call records stored in the transaction ledger

use crate::core::Call;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transaction identifier. Dense, starting at 1.
pub type TxId = u64;

/// Lifecycle status of a submitted transaction.
///
/// `Open` and `Executable` are the same stored state; they differ only by
/// comparing the live confirmation count against the threshold.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxStatus {
    /// Waiting for more confirmations
    Open,
    /// Quorum reached, not yet executed
    Executable,
    /// Dispatched; terminal
    Executed,
}

/// A submitted call with its confirmation bookkeeping
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CallRecord {
    pub call: Call,
    /// Number of distinct owners that confirmed
    pub confirmations: u32,
    pub executed: bool,
    /// Owner who submitted the call
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl CallRecord {
    pub fn new(call: Call, submitted_by: String) -> Self {
        Self {
            call,
            confirmations: 0,
            executed: false,
            submitted_by,
            submitted_at: Utc::now(),
            executed_at: None,
        }
    }

    /// Equality with the threshold is enough
    pub fn has_quorum(&self, threshold: u32) -> bool {
        self.confirmations >= threshold
    }

    pub fn status(&self, threshold: u32) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else if self.has_quorum(threshold) {
            TxStatus::Executable
        } else {
            TxStatus::Open
        }
    }

    pub(crate) fn mark_executed(&mut self) {
        self.executed = true;
        self.executed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Felt;

    #[test]
    fn test_status_transitions() {
        let call = Call::new("target", Felt::from_name("ping"), vec![]);
        let mut record = CallRecord::new(call, "alice".to_string());

        assert_eq!(record.confirmations, 0);
        assert_eq!(record.status(2), TxStatus::Open);

        record.confirmations = 1;
        assert_eq!(record.status(2), TxStatus::Open);

        record.confirmations = 2;
        assert!(record.has_quorum(2));
        assert_eq!(record.status(2), TxStatus::Executable);

        record.mark_executed();
        assert_eq!(record.status(2), TxStatus::Executed);
        assert!(record.executed_at.is_some());
    }
}
