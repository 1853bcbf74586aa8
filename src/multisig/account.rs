//! Multisig account
//!
//! The single owned state object: owner registry, public keys, ledger and
//! confirmation tracker, plus every entry point that reads or mutates them.
//!
//! Each mutating entry point checks all of its preconditions before it
//! touches state, so a failed call leaves the account exactly as it was.

use crate::core::{Call, Felt};
use crate::multisig::config::MultisigConfig;
use crate::multisig::error::MultisigError;
use crate::multisig::events::{EventKind, EventSink, MultisigEvent};
use crate::multisig::executor::CallExecutor;
use crate::multisig::ledger::{check_consistency, ConfirmationTracker, TransactionLedger};
use crate::multisig::owners::OwnerRegistry;
use crate::multisig::public_keys::PublicKeyRegistry;
use crate::multisig::request::RequestContext;
use crate::multisig::signature::{self, Validated};
use crate::multisig::transaction::{CallRecord, TxId, TxStatus};
use chrono::{DateTime, Utc};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An M-of-N multisig account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultisigAccount {
    address: String,
    config: MultisigConfig,
    owners: OwnerRegistry,
    public_keys: PublicKeyRegistry,
    ledger: TransactionLedger,
    confirmations: ConfirmationTracker,
    /// Next expected request nonce per caller
    nonces: BTreeMap<String, u64>,
    created_at: DateTime<Utc>,
}

impl MultisigAccount {
    /// Initialize an account from a configuration.
    ///
    /// The configuration is re-validated, so hand-built configs get the
    /// same checks as `MultisigConfig::new`.
    pub fn new(config: MultisigConfig) -> Result<Self, MultisigError> {
        let config = MultisigConfig::new(config.threshold, config.owners, config.label)?;
        let address = config.account_address();
        let owners = OwnerRegistry::from_owners(&config.owners);

        log::info!(
            "Initialized {} multisig account {}",
            config.description(),
            address
        );

        Ok(Self {
            address,
            config,
            owners,
            public_keys: PublicKeyRegistry::new(),
            ledger: TransactionLedger::new(),
            confirmations: ConfirmationTracker::new(),
            nonces: BTreeMap::new(),
            created_at: Utc::now(),
        })
    }

    /// Initialize from an owner list and threshold
    pub fn initialize(owners: Vec<String>, threshold: u32) -> Result<Self, MultisigError> {
        Self::new(MultisigConfig::new(threshold, owners, None)?)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn config(&self) -> &MultisigConfig {
        &self.config
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_owner(&self, address: &str) -> bool {
        self.owners.is_owner(address)
    }

    /// Owners in address order
    pub fn owners(&self) -> Vec<&str> {
        self.owners.iter().map(String::as_str).collect()
    }

    pub fn get_num_owners(&self) -> usize {
        self.owners.len()
    }

    pub fn get_threshold(&self) -> u32 {
        self.config.threshold
    }

    pub fn get_last_tx_id(&self) -> TxId {
        self.ledger.last_tx_id()
    }

    pub fn get_confirmations(&self, tx_id: TxId) -> Result<u32, MultisigError> {
        Ok(self.ledger.get(tx_id)?.confirmations)
    }

    pub fn get_transaction(&self, tx_id: TxId) -> Result<&CallRecord, MultisigError> {
        self.ledger.get(tx_id)
    }

    /// Status computed against the live threshold
    pub fn get_transaction_status(&self, tx_id: TxId) -> Result<TxStatus, MultisigError> {
        Ok(self.ledger.get(tx_id)?.status(self.config.threshold))
    }

    pub fn transactions(&self) -> impl Iterator<Item = (TxId, &CallRecord)> {
        self.ledger.iter()
    }

    pub fn has_confirmed(&self, owner: &str, tx_id: TxId) -> bool {
        self.confirmations.has_confirmed(owner, tx_id)
    }

    pub fn confirmers(&self, tx_id: TxId) -> Vec<&str> {
        self.confirmations.confirmers(tx_id)
    }

    /// Registered key of an owner, `None` when unset
    pub fn get_owner_public_key(&self, address: &str) -> Result<Option<&PublicKey>, MultisigError> {
        self.owners.require_owner(address)?;
        Ok(self.public_keys.get(address))
    }

    /// Next request nonce expected from `address`
    pub fn get_nonce(&self, address: &str) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    pub(crate) fn advance_nonce(&mut self, address: &str) {
        *self.nonces.entry(address.to_string()).or_insert(0) += 1;
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Set the caller's own public key. No one can set another owner's key.
    pub fn set_public_key(
        &mut self,
        caller: &str,
        key: PublicKey,
        events: &mut dyn EventSink,
    ) -> Result<(), MultisigError> {
        self.owners.require_owner(caller)?;

        if self.public_keys.set(caller, key).is_some() {
            log::info!("Rotated public key for owner {}", caller);
        } else {
            log::info!("Registered public key for owner {}", caller);
        }

        events.emit(MultisigEvent::new(EventKind::PublicKeySet {
            owner: caller.to_string(),
        }));
        Ok(())
    }

    /// Store a new call with zero confirmations and return its id
    pub fn submit_transaction(
        &mut self,
        caller: &str,
        call: Call,
        events: &mut dyn EventSink,
    ) -> Result<TxId, MultisigError> {
        self.owners.require_owner(caller)?;
        self.public_keys.require(caller)?;

        let target = call.target.clone();
        let tx_id = self.ledger.append(call, caller);

        log::info!(
            "Transaction {} submitted by {} (target {})",
            tx_id,
            caller,
            target
        );
        events.emit(MultisigEvent::new(EventKind::TransactionSubmitted {
            owner: caller.to_string(),
            tx_id,
        }));
        Ok(tx_id)
    }

    /// Add the caller's confirmation; returns the new confirmation count
    pub fn confirm_transaction(
        &mut self,
        caller: &str,
        tx_id: TxId,
        events: &mut dyn EventSink,
    ) -> Result<u32, MultisigError> {
        self.owners.require_owner(caller)?;
        if !self.ledger.contains(tx_id) {
            return Err(MultisigError::TxNotFound(tx_id));
        }
        self.public_keys.require(caller)?;
        self.confirmations.ensure_unconfirmed(caller, tx_id)?;

        let record = self.ledger.get_mut(tx_id)?;
        record.confirmations += 1;
        let confirmations = record.confirmations;
        self.confirmations.record(caller, tx_id);

        log::info!(
            "Transaction {} confirmed by {} ({}/{})",
            tx_id,
            caller,
            confirmations,
            self.config.threshold
        );
        events.emit(MultisigEvent::new(EventKind::TransactionConfirmed {
            owner: caller.to_string(),
            tx_id,
            confirmations,
        }));
        Ok(confirmations)
    }

    /// Dispatch a call that reached quorum. Anyone may trigger this.
    ///
    /// One-shot: the record is marked executed only after the gateway
    /// returns, and a second attempt fails before any dispatch.
    pub fn execute_transaction(
        &mut self,
        caller: &str,
        tx_id: TxId,
        executor: &mut dyn CallExecutor,
        events: &mut dyn EventSink,
    ) -> Result<Vec<u8>, MultisigError> {
        let threshold = self.config.threshold;
        let record = self.ledger.get(tx_id)?;

        if record.executed {
            return Err(MultisigError::AlreadyExecuted(tx_id));
        }
        if !record.has_quorum(threshold) {
            return Err(MultisigError::ThresholdNotMet {
                have: record.confirmations,
                need: threshold,
            });
        }

        let call = &record.call;
        let result = executor
            .dispatch(&call.target, &call.selector, &call.payload)
            .map_err(|e| {
                log::warn!("Dispatch of transaction {} failed: {}", tx_id, e);
                MultisigError::from(e)
            })?;

        self.ledger.get_mut(tx_id)?.mark_executed();

        log::info!(
            "Transaction {} executed by {} ({} bytes returned)",
            tx_id,
            caller,
            result.len()
        );
        events.emit(MultisigEvent::new(EventKind::TransactionExecuted {
            executor: caller.to_string(),
            tx_id,
        }));
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Authentication hooks
    // ------------------------------------------------------------------

    /// Resolve the caller's key and check the signature over the host hash
    fn authenticate(&self, ctx: &RequestContext) -> Result<Validated, MultisigError> {
        self.owners.require_owner(&ctx.caller)?;
        let key = self.public_keys.require(&ctx.caller)?;

        match signature::validate(&ctx.tx_hash, key, &ctx.signature) {
            Ok(validated) => {
                log::debug!("Authenticated {} for request {}", ctx.caller, ctx.tx_hash);
                Ok(validated)
            }
            Err(e) => {
                log::warn!("Rejected request {} from {}: {}", ctx.tx_hash, ctx.caller, e);
                Err(e)
            }
        }
    }

    pub fn validate_declare(
        &self,
        ctx: &RequestContext,
        class_hash: &Felt,
    ) -> Result<Validated, MultisigError> {
        log::debug!("Validating declare of class {}", class_hash);
        self.authenticate(ctx)
    }

    pub fn validate_deployment(
        &self,
        ctx: &RequestContext,
        class_hash: &Felt,
        salt: &Felt,
        public_key: &PublicKey,
    ) -> Result<Validated, MultisigError> {
        log::debug!(
            "Validating deployment of class {} (salt {}, key {})",
            class_hash,
            salt,
            hex::encode(public_key.serialize())
        );
        self.authenticate(ctx)
    }

    pub fn validate_transaction(
        &self,
        ctx: &RequestContext,
        call: &Call,
    ) -> Result<Validated, MultisigError> {
        log::debug!(
            "Validating call to {} selector {} ({} payload items)",
            call.target,
            call.selector,
            call.payload.len()
        );
        self.authenticate(ctx)
    }

    // ------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------

    /// Audit every stored invariant; used when loading persisted state
    pub fn check_invariants(&self) -> Result<(), MultisigError> {
        let config = MultisigConfig::new(
            self.config.threshold,
            self.config.owners.clone(),
            self.config.label.clone(),
        )?;

        if config.account_address() != self.address {
            return Err(MultisigError::Inconsistent(
                "account address does not match configuration".to_string(),
            ));
        }
        if OwnerRegistry::from_owners(&config.owners) != self.owners {
            return Err(MultisigError::Inconsistent(
                "owner registry does not match configuration".to_string(),
            ));
        }
        if let Some(stranger) = self.nonces.keys().find(|a| !self.owners.is_owner(a)) {
            return Err(MultisigError::Inconsistent(format!(
                "nonce recorded for non-owner {}",
                stranger
            )));
        }

        check_consistency(&self.ledger, &self.confirmations, &self.owners)
    }
}
