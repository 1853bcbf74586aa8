//! Multi-signature account engine
//!
//! A fixed set of owners collectively authorizes delegated calls. A call is
//! submitted by one owner, confirmed by distinct owners, and dispatched once
//! the number of confirmations reaches the threshold.
//!
//! # Example
//!
//! ```rust
//! use multisig_account::core::{Call, Felt};
//! use multisig_account::crypto::KeyPair;
//! use multisig_account::multisig::{Invocation, MultisigAccount, RecordingExecutor, SignedRequest};
//!
//! let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! let owners: Vec<String> = keys.iter().map(|k| k.address()).collect();
//! let mut account = MultisigAccount::initialize(owners.clone(), 2).unwrap();
//! let mut executor = RecordingExecutor::new();
//! let mut events = Vec::new();
//!
//! let mut send = |account: &mut MultisigAccount, who: usize, invocation: Invocation| {
//!     let nonce = account.get_nonce(&owners[who]);
//!     let request = SignedRequest::sign(&keys[who], &owners[who], nonce, invocation, account.address())
//!         .unwrap();
//!     account.invoke(&request, &mut executor, &mut events).unwrap()
//! };
//!
//! for who in 0..3 {
//!     send(&mut account, who, Invocation::SetPublicKey { key: keys[who].public_key });
//! }
//!
//! let call = Call::new("vault", Felt::from_name("transfer"), vec![Felt::from_u64(100)]);
//! send(&mut account, 0, Invocation::Submit { call });
//! send(&mut account, 1, Invocation::Confirm { tx_id: 1 });
//! send(&mut account, 2, Invocation::Confirm { tx_id: 1 });
//! send(&mut account, 0, Invocation::Execute { tx_id: 1 });
//!
//! assert!(account.get_transaction(1).unwrap().executed);
//! ```

pub mod account;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod ledger;
pub mod owners;
pub mod public_keys;
pub mod request;
pub mod signature;
pub mod transaction;

pub use account::MultisigAccount;
pub use config::{MultisigConfig, MIN_OWNERS};
pub use error::MultisigError;
pub use events::{EventKind, EventSink, LogEventSink, MultisigEvent};
pub use executor::{CallExecutor, ExecutorError, RecordingExecutor};
pub use ledger::{ConfirmationTracker, TransactionLedger};
pub use owners::OwnerRegistry;
pub use public_keys::PublicKeyRegistry;
pub use request::{request_hash, Invocation, Outcome, RequestContext, SignedRequest};
pub use signature::{validate, Validated, SIGNATURE_LEN};
pub use transaction::{CallRecord, TxId, TxStatus};
