//! Signed requests and entry-point orchestration
//!
//! A host hands the account a `SignedRequest`: who is calling, their next
//! nonce, what they want to do, and an `[r, s]` signature over the request
//! hash. `MultisigAccount::invoke` authenticates the request and routes it
//! to the matching entry point.

use crate::core::{Call, Felt};
use crate::crypto::{public_key_to_address, sha256, KeyError, KeyPair};
use crate::multisig::account::MultisigAccount;
use crate::multisig::error::MultisigError;
use crate::multisig::events::EventSink;
use crate::multisig::executor::CallExecutor;
use crate::multisig::signature;
use crate::multisig::transaction::TxId;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

/// Domain tag mixed into every request hash
const REQUEST_TAG: &[u8] = b"multisig-request";

/// Authentication input for the validation hooks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestContext {
    /// Address the request claims to come from
    pub caller: String,
    /// Hash the signature must cover
    pub tx_hash: Felt,
    /// `[r, s]`
    pub signature: Vec<Felt>,
}

/// A write operation on the account
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Invocation {
    SetPublicKey { key: PublicKey },
    Submit { call: Call },
    Confirm { tx_id: TxId },
    Execute { tx_id: TxId },
}

impl Invocation {
    pub fn entry_point(&self) -> &'static str {
        match self {
            Invocation::SetPublicKey { .. } => "set_public_key",
            Invocation::Submit { .. } => "submit_transaction",
            Invocation::Confirm { .. } => "confirm_transaction",
            Invocation::Execute { .. } => "execute_transaction",
        }
    }

    fn calldata(&self) -> Vec<Felt> {
        match self {
            Invocation::SetPublicKey { key } => {
                // Compressed key: parity byte, then the 32-byte x coordinate
                let bytes = key.serialize();
                let mut x = [0u8; 32];
                x.copy_from_slice(&bytes[1..]);
                vec![Felt::from_u64(bytes[0] as u64), Felt::from_bytes(x)]
            }
            Invocation::Submit { call } => vec![call.hash()],
            Invocation::Confirm { tx_id } | Invocation::Execute { tx_id } => {
                vec![Felt::from_u64(*tx_id)]
            }
        }
    }

    /// The invocation as a call on the account itself
    pub fn as_call(&self, account_address: &str) -> Call {
        Call::new(
            account_address,
            Felt::from_name(self.entry_point()),
            self.calldata(),
        )
    }
}

/// Hash signed by the caller for one request
pub fn request_hash(
    account_address: &str,
    caller: &str,
    nonce: u64,
    invocation: &Invocation,
) -> Felt {
    let mut data = Vec::new();
    data.extend_from_slice(REQUEST_TAG);
    for part in [account_address, caller] {
        data.extend_from_slice(&(part.len() as u32).to_be_bytes());
        data.extend_from_slice(part.as_bytes());
    }
    data.extend_from_slice(&nonce.to_be_bytes());
    data.extend_from_slice(&invocation.as_call(account_address).encode());

    let mut out = [0u8; 32];
    out.copy_from_slice(&sha256(&data));
    Felt::from_bytes(out)
}

/// A request envelope as submitted by a host
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedRequest {
    pub caller: String,
    pub nonce: u64,
    pub invocation: Invocation,
    pub signature: Vec<Felt>,
}

impl SignedRequest {
    /// Build and sign a request with `key_pair`
    pub fn sign(
        key_pair: &KeyPair,
        caller: &str,
        nonce: u64,
        invocation: Invocation,
        account_address: &str,
    ) -> Result<Self, KeyError> {
        let hash = request_hash(account_address, caller, nonce, &invocation);
        Ok(Self {
            caller: caller.to_string(),
            nonce,
            signature: key_pair.sign(&hash)?,
            invocation,
        })
    }

    /// An unsigned request; enough for `Execute`, which is not authenticated
    pub fn unsigned(caller: &str, invocation: Invocation) -> Self {
        Self {
            caller: caller.to_string(),
            nonce: 0,
            invocation,
            signature: Vec::new(),
        }
    }

    pub fn hash(&self, account_address: &str) -> Felt {
        request_hash(account_address, &self.caller, self.nonce, &self.invocation)
    }

    pub fn context(&self, account_address: &str) -> RequestContext {
        RequestContext {
            caller: self.caller.clone(),
            tx_hash: self.hash(account_address),
            signature: self.signature.clone(),
        }
    }
}

/// Result of a successful invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    PublicKeySet,
    Submitted { tx_id: TxId },
    Confirmed { tx_id: TxId, confirmations: u32 },
    Executed { tx_id: TxId, result: Vec<u8> },
}

impl MultisigAccount {
    /// Authenticate and run one request.
    ///
    /// `Execute` is open to any caller and consumes no nonce. Every other
    /// invocation must carry the caller's next nonce and a valid signature;
    /// the nonce advances only when the operation succeeds.
    pub fn invoke(
        &mut self,
        request: &SignedRequest,
        executor: &mut dyn CallExecutor,
        events: &mut dyn EventSink,
    ) -> Result<Outcome, MultisigError> {
        let caller = request.caller.as_str();

        let outcome = match &request.invocation {
            Invocation::Execute { tx_id } => {
                let result = self.execute_transaction(caller, *tx_id, executor, events)?;
                return Ok(Outcome::Executed {
                    tx_id: *tx_id,
                    result,
                });
            }
            Invocation::SetPublicKey { key } => {
                self.authorize(request)?;
                self.set_public_key(caller, *key, events)?;
                Outcome::PublicKeySet
            }
            Invocation::Submit { call } => {
                self.authorize(request)?;
                let tx_id = self.submit_transaction(caller, call.clone(), events)?;
                Outcome::Submitted { tx_id }
            }
            Invocation::Confirm { tx_id } => {
                self.authorize(request)?;
                let confirmations = self.confirm_transaction(caller, *tx_id, events)?;
                Outcome::Confirmed {
                    tx_id: *tx_id,
                    confirmations,
                }
            }
        };

        self.advance_nonce(caller);
        Ok(outcome)
    }

    /// Nonce and signature checks for authenticated invocations
    fn authorize(&self, request: &SignedRequest) -> Result<(), MultisigError> {
        let caller = request.caller.as_str();
        let registered = self.get_owner_public_key(caller)?.copied();

        let expected = self.get_nonce(caller);
        if request.nonce != expected {
            return Err(MultisigError::InvalidNonce {
                caller: caller.to_string(),
                expected,
                got: request.nonce,
            });
        }

        let ctx = request.context(self.address());
        match (&request.invocation, registered) {
            // First key registration: prove possession of the key being
            // registered, and that it is the key the owner address came from
            (Invocation::SetPublicKey { key }, None) => {
                if public_key_to_address(key) != caller {
                    return Err(MultisigError::KeyAddressMismatch(caller.to_string()));
                }
                signature::validate(&ctx.tx_hash, key, &ctx.signature)?;
                log::debug!("Bootstrapped key registration for {}", caller);
            }
            _ => {
                let call = request.invocation.as_call(self.address());
                self.validate_transaction(&ctx, &call)?;
            }
        }
        Ok(())
    }
}
