//! Transaction ledger and confirmation tracker
//!
//! The ledger hands out dense, strictly increasing ids and stores one
//! `CallRecord` per id. The tracker remembers which owner confirmed which
//! id so a confirmation is never counted twice.

use crate::core::Call;
use crate::multisig::error::MultisigError;
use crate::multisig::owners::OwnerRegistry;
use crate::multisig::transaction::{CallRecord, TxId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Submitted call records keyed by transaction id
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionLedger {
    /// Last issued id; 0 before the first submission
    last_tx_id: TxId,
    records: BTreeMap<TxId, CallRecord>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_tx_id(&self) -> TxId {
        self.last_tx_id
    }

    /// Ids above `last_tx_id` (and 0) do not exist
    pub fn contains(&self, tx_id: TxId) -> bool {
        tx_id >= 1 && tx_id <= self.last_tx_id
    }

    /// Store a new record under the next id and return that id
    pub(crate) fn append(&mut self, call: Call, submitted_by: &str) -> TxId {
        let tx_id = self.last_tx_id + 1;
        self.records
            .insert(tx_id, CallRecord::new(call, submitted_by.to_string()));
        self.last_tx_id = tx_id;
        tx_id
    }

    pub fn get(&self, tx_id: TxId) -> Result<&CallRecord, MultisigError> {
        if !self.contains(tx_id) {
            return Err(MultisigError::TxNotFound(tx_id));
        }
        self.records
            .get(&tx_id)
            .ok_or(MultisigError::TxNotFound(tx_id))
    }

    pub(crate) fn get_mut(&mut self, tx_id: TxId) -> Result<&mut CallRecord, MultisigError> {
        if !self.contains(tx_id) {
            return Err(MultisigError::TxNotFound(tx_id));
        }
        self.records
            .get_mut(&tx_id)
            .ok_or(MultisigError::TxNotFound(tx_id))
    }

    /// Records in id order
    pub fn iter(&self) -> impl Iterator<Item = (TxId, &CallRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per (owner, transaction id) confirmation flags
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfirmationTracker {
    confirmed: BTreeMap<TxId, BTreeSet<String>>,
}

impl ConfirmationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_confirmed(&self, owner: &str, tx_id: TxId) -> bool {
        self.confirmed
            .get(&tx_id)
            .map(|owners| owners.contains(owner))
            .unwrap_or(false)
    }

    /// Fail with `AlreadyConfirmed` if `owner` already confirmed `tx_id`
    pub fn ensure_unconfirmed(&self, owner: &str, tx_id: TxId) -> Result<(), MultisigError> {
        if self.has_confirmed(owner, tx_id) {
            return Err(MultisigError::AlreadyConfirmed {
                owner: owner.to_string(),
                tx_id,
            });
        }
        Ok(())
    }

    /// Set the flag. Flags never revert.
    pub(crate) fn record(&mut self, owner: &str, tx_id: TxId) {
        self.confirmed
            .entry(tx_id)
            .or_default()
            .insert(owner.to_string());
    }

    /// Owners that confirmed `tx_id`, in address order
    pub fn confirmers(&self, tx_id: TxId) -> Vec<&str> {
        self.confirmed
            .get(&tx_id)
            .map(|owners| owners.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn count(&self, tx_id: TxId) -> usize {
        self.confirmed.get(&tx_id).map(BTreeSet::len).unwrap_or(0)
    }
}

/// Audit ledger and tracker against each other.
///
/// Checks that ids are exactly `1..=last_tx_id`, that each record's count
/// equals its number of confirmers, and that only owners confirmed.
pub fn check_consistency(
    ledger: &TransactionLedger,
    tracker: &ConfirmationTracker,
    owners: &OwnerRegistry,
) -> Result<(), MultisigError> {
    let inconsistent = |reason: String| Err(MultisigError::Inconsistent(reason));

    if ledger.records.len() as u64 != ledger.last_tx_id {
        return inconsistent(format!(
            "ledger holds {} records but last id is {}",
            ledger.records.len(),
            ledger.last_tx_id
        ));
    }

    for (expected, (tx_id, record)) in (1..).zip(ledger.iter()) {
        if tx_id != expected {
            return inconsistent(format!(
                "transaction id gap: expected {}, found {}",
                expected, tx_id
            ));
        }
        let confirmers = tracker.count(tx_id);
        if record.confirmations as usize != confirmers {
            return inconsistent(format!(
                "transaction {} counts {} confirmations but {} owners confirmed",
                tx_id, record.confirmations, confirmers
            ));
        }
        if record.executed_at.is_some() != record.executed {
            return inconsistent(format!(
                "transaction {} has inconsistent execution time",
                tx_id
            ));
        }
    }

    for (tx_id, confirmers) in &tracker.confirmed {
        if !ledger.contains(*tx_id) {
            return inconsistent(format!(
                "confirmations recorded for unknown transaction {}",
                tx_id
            ));
        }
        if let Some(stranger) = confirmers.iter().find(|o| !owners.is_owner(o)) {
            return inconsistent(format!(
                "non-owner {} confirmed transaction {}",
                stranger, tx_id
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Felt;

    fn call(n: u64) -> Call {
        Call::new("target", Felt::from_name("ping"), vec![n.into()])
    }

    #[test]
    fn test_ids_are_dense_from_one() {
        let mut ledger = TransactionLedger::new();
        assert_eq!(ledger.last_tx_id(), 0);
        assert!(!ledger.contains(0));
        assert!(!ledger.contains(1));

        assert_eq!(ledger.append(call(1), "alice"), 1);
        assert_eq!(ledger.append(call(2), "bob"), 2);
        assert_eq!(ledger.append(call(3), "alice"), 3);

        assert_eq!(ledger.last_tx_id(), 3);
        assert_eq!(ledger.get(2).unwrap().call, call(2));
        assert_eq!(ledger.get(2).unwrap().submitted_by, "bob");
        assert!(matches!(ledger.get(0), Err(MultisigError::TxNotFound(0))));
        assert!(matches!(ledger.get(4), Err(MultisigError::TxNotFound(4))));
        assert!(matches!(ledger.get(u64::MAX), Err(MultisigError::TxNotFound(_))));
    }

    #[test]
    fn test_tracker_flags() {
        let mut tracker = ConfirmationTracker::new();
        assert!(!tracker.has_confirmed("alice", 1));
        assert!(tracker.ensure_unconfirmed("alice", 1).is_ok());

        tracker.record("alice", 1);
        assert!(tracker.has_confirmed("alice", 1));
        assert!(!tracker.has_confirmed("alice", 2));
        assert!(!tracker.has_confirmed("bob", 1));
        assert!(matches!(
            tracker.ensure_unconfirmed("alice", 1),
            Err(MultisigError::AlreadyConfirmed { tx_id: 1, .. })
        ));

        tracker.record("bob", 1);
        assert_eq!(tracker.confirmers(1), vec!["alice", "bob"]);
        assert!(tracker.confirmers(7).is_empty());
    }

    #[test]
    fn test_consistency_audit() {
        let owners = OwnerRegistry::from_owners(&["alice".to_string(), "bob".to_string()]);
        let mut ledger = TransactionLedger::new();
        let mut tracker = ConfirmationTracker::new();

        ledger.append(call(1), "alice");
        tracker.record("alice", 1);
        ledger.get_mut(1).unwrap().confirmations = 1;
        assert!(check_consistency(&ledger, &tracker, &owners).is_ok());

        // Count drifted from tracker
        ledger.get_mut(1).unwrap().confirmations = 2;
        assert!(check_consistency(&ledger, &tracker, &owners).is_err());
        ledger.get_mut(1).unwrap().confirmations = 1;

        // Confirmation by a stranger
        tracker.record("mallory", 1);
        ledger.get_mut(1).unwrap().confirmations = 2;
        assert!(check_consistency(&ledger, &tracker, &owners).is_err());
    }

    #[test]
    fn test_consistency_rejects_orphan_confirmations() {
        let owners = OwnerRegistry::from_owners(&["alice".to_string(), "bob".to_string()]);
        let ledger = TransactionLedger::new();
        let mut tracker = ConfirmationTracker::new();

        tracker.record("alice", 5);
        assert!(matches!(
            check_consistency(&ledger, &tracker, &owners),
            Err(MultisigError::Inconsistent(_))
        ));
    }
}
