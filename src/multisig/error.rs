//! Multisig error taxonomy

use crate::multisig::executor::ExecutorError;
use crate::multisig::transaction::TxId;
use thiserror::Error;

/// Errors raised by the multisig engine.
///
/// Every failure aborts the whole operation; no state is changed.
#[derive(Error, Debug)]
pub enum MultisigError {
    // Configuration
    #[error("Invalid owner count: {0} (need at least 2)")]
    InvalidOwnerCount(usize),
    #[error("Invalid threshold: {threshold} for {owners} owners")]
    InvalidThreshold { threshold: u32, owners: usize },
    #[error("Duplicate owner: {0}")]
    DuplicateOwner(String),
    #[error("Owner is not a key address: {0}")]
    InvalidOwnerAddress(String),

    // Authorization
    #[error("Caller is not an owner: {0}")]
    NotOwner(String),
    #[error("Public key not set for {0}")]
    PublicKeyNotSet(String),
    #[error("Public key does not derive to caller address {0}")]
    KeyAddressMismatch(String),
    #[error("Invalid nonce for {caller}: expected {expected}, got {got}")]
    InvalidNonce {
        caller: String,
        expected: u64,
        got: u64,
    },

    // State
    #[error("Transaction not found: {0}")]
    TxNotFound(TxId),
    #[error("Transaction {tx_id} already confirmed by {owner}")]
    AlreadyConfirmed { owner: String, tx_id: TxId },
    #[error("Transaction already executed: {0}")]
    AlreadyExecuted(TxId),
    #[error("Threshold not met: have {have}, need {need}")]
    ThresholdNotMet { have: u32, need: u32 },

    // Authentication
    #[error("Invalid signature length: {0} (expected 2)")]
    InvalidSignatureLength(usize),
    #[error("Invalid signature")]
    InvalidSignature,

    // Persisted state
    #[error("Inconsistent account state: {0}")]
    Inconsistent(String),

    #[error("Execution failed: {0}")]
    Execution(#[from] ExecutorError),
}
