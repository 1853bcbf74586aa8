//! Multisig Account: a threshold-authorized account engine in Rust
//!
//! This crate provides:
//! - A fixed owner set with an M-of-N confirmation threshold
//! - Per-owner secp256k1 public keys and a single signature validator
//! - A transaction ledger with one-shot, quorum-gated execution
//! - Signed, nonce-ordered request handling for hosts
//! - JSON persistence, an outbox execution gateway and an owner keystore
//!
//! # Example
//!
//! ```rust
//! use multisig_account::core::{Call, Felt};
//! use multisig_account::crypto::KeyPair;
//! use multisig_account::multisig::{MultisigAccount, RecordingExecutor};
//!
//! let mut account = MultisigAccount::initialize(vec!["A".into(), "B".into(), "C".into()], 2).unwrap();
//! let mut executor = RecordingExecutor::new();
//! let mut events = Vec::new();
//!
//! for owner in ["A", "B", "C"] {
//!     account.set_public_key(owner, KeyPair::generate().public_key, &mut events).unwrap();
//! }
//!
//! let call = Call::new("X", Felt::from_name("S"), vec![Felt::from_u64(1)]);
//! let tx_id = account.submit_transaction("A", call, &mut events).unwrap();
//! account.confirm_transaction("B", tx_id, &mut events).unwrap();
//! account.confirm_transaction("C", tx_id, &mut events).unwrap();
//! account.execute_transaction("anyone", tx_id, &mut executor, &mut events).unwrap();
//!
//! assert_eq!(executor.dispatched.len(), 1);
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod multisig;
pub mod storage;
pub mod wallet;

// Re-export commonly used types
pub use crate::core::{Call, Felt};
pub use crypto::KeyPair;
pub use multisig::{
    CallExecutor, EventSink, Invocation, MultisigAccount, MultisigConfig, MultisigError, Outcome,
    SignedRequest, TxId,
};
pub use storage::{OutboxExecutor, Storage, StorageConfig};
pub use wallet::{Wallet, WalletManager};
