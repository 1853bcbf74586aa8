//! File-backed execution gateway
//!
//! Appends every dispatched call to a JSON-lines outbox for an external
//! relayer to pick up. An executor bound to a transaction id writes at most
//! one entry for that id, so re-running an execution whose state was never
//! saved does not dispatch the call twice.

use crate::core::{Call, Felt};
use crate::multisig::{CallExecutor, ExecutorError, TxId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One line of the outbox
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutboxEntry {
    #[serde(default)]
    pub tx_id: Option<TxId>,
    pub call: Call,
    pub call_hash: Felt,
    pub dispatched_at: DateTime<Utc>,
}

/// Gateway that writes dispatched calls to an outbox file.
///
/// Result data is the 32-byte call hash.
pub struct OutboxExecutor {
    path: PathBuf,
    tx_id: Option<TxId>,
}

impl OutboxExecutor {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            tx_id: None,
        }
    }

    /// Executor for one ledger transaction
    pub fn for_transaction(path: &Path, tx_id: TxId) -> Self {
        Self {
            path: path.to_path_buf(),
            tx_id: Some(tx_id),
        }
    }

    /// Read back every entry written so far
    pub fn entries(&self) -> Result<Vec<OutboxEntry>, ExecutorError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        fs::read_to_string(&self.path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ExecutorError::from))
            .collect()
    }
}

impl CallExecutor for OutboxExecutor {
    fn dispatch(
        &mut self,
        target: &str,
        selector: &Felt,
        payload: &[Felt],
    ) -> Result<Vec<u8>, ExecutorError> {
        let call = Call::new(target, *selector, payload.to_vec());

        if let Some(tx_id) = self.tx_id {
            let previous = self
                .entries()?
                .into_iter()
                .find(|entry| entry.tx_id == Some(tx_id));
            if let Some(previous) = previous {
                if previous.call != call {
                    return Err(ExecutorError::Rejected {
                        target: target.to_string(),
                        reason: format!(
                            "outbox already holds a different call for transaction {}",
                            tx_id
                        ),
                    });
                }
                log::info!("Transaction {} already in outbox; not dispatching again", tx_id);
                return Ok(previous.call_hash.as_bytes().to_vec());
            }
        }

        let entry = OutboxEntry {
            tx_id: self.tx_id,
            call_hash: call.hash(),
            call,
            dispatched_at: Utc::now(),
        };

        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;

        log::debug!("Dispatched call {} to outbox {:?}", entry.call_hash, self.path);
        Ok(entry.call_hash.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbox_appends_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut outbox = OutboxExecutor::new(&temp_dir.path().join("outbox.jsonl"));
        assert!(outbox.entries().unwrap().is_empty());

        let selector = Felt::from_name("transfer");
        let first = outbox.dispatch("vault", &selector, &[Felt::from_u64(1)]).unwrap();
        outbox.dispatch("vault", &selector, &[Felt::from_u64(2)]).unwrap();

        let entries = outbox.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].call.payload, vec![Felt::from_u64(1)]);
        assert_eq!(first, entries[0].call_hash.as_bytes().to_vec());
        assert_eq!(entries[0].tx_id, None);
    }

    #[test]
    fn test_transaction_is_dispatched_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("outbox.jsonl");
        let selector = Felt::from_name("transfer");
        let payload = [Felt::from_u64(9)];

        let first = OutboxExecutor::for_transaction(&path, 1)
            .dispatch("vault", &selector, &payload)
            .unwrap();
        let again = OutboxExecutor::for_transaction(&path, 1)
            .dispatch("vault", &selector, &payload)
            .unwrap();
        assert_eq!(first, again);

        OutboxExecutor::for_transaction(&path, 2)
            .dispatch("vault", &selector, &payload)
            .unwrap();

        let entries = OutboxExecutor::new(&path).entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tx_id, Some(1));
        assert_eq!(entries[1].tx_id, Some(2));

        // Same id, different call
        let other = OutboxExecutor::for_transaction(&path, 1).dispatch("vault", &selector, &[]);
        assert!(matches!(other, Err(ExecutorError::Rejected { .. })));
    }
}
