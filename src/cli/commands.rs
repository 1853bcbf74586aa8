//! CLI commands for the multisig account
//!
//! Every handler loads the persisted account, runs one operation, and
//! saves the account only if that operation succeeded.

use crate::core::{Call, Felt, FeltError};
use crate::multisig::{
    Invocation, LogEventSink, MultisigAccount, MultisigConfig, Outcome, SignedRequest, TxId,
};
use crate::storage::{OutboxExecutor, Storage, StorageConfig};
use crate::wallet::WalletManager;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Caller recorded for `execute` when none is given
pub const DEFAULT_EXECUTOR: &str = "cli";

/// Application state
pub struct AppState {
    pub account: MultisigAccount,
    pub storage: Storage,
    pub wallet_manager: WalletManager,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load the persisted account and keystore
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = open_storage(&data_dir)?;

        if !storage.exists() {
            return Err(format!(
                "no account in {:?}; run `multisig init` first",
                data_dir
            )
            .into());
        }

        let account = storage.load()?;
        let wallet_manager = WalletManager::new(&data_dir.join("wallets"))?;

        Ok(Self {
            account,
            storage,
            wallet_manager,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.account)?;
        Ok(())
    }

    /// Run a request against the account and persist on success
    fn apply(&mut self, request: &SignedRequest) -> CliResult<Outcome> {
        let outbox_path = self.storage.outbox_path();
        let mut executor = match &request.invocation {
            Invocation::Execute { tx_id } => OutboxExecutor::for_transaction(&outbox_path, *tx_id),
            _ => OutboxExecutor::new(&outbox_path),
        };
        let mut events = LogEventSink;

        let outcome = self.account.invoke(request, &mut executor, &mut events)?;
        self.save()?;
        Ok(outcome)
    }

    fn signed(&self, owner: &str, invocation: Invocation) -> CliResult<SignedRequest> {
        let wallet = self.wallet_manager.load_wallet(owner)?;
        Ok(wallet.sign_request(&self.account, invocation)?)
    }
}

fn open_storage(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

/// Parse a selector: a field element literal, or an entry-point name
pub fn parse_selector(input: &str) -> Felt {
    input
        .parse()
        .unwrap_or_else(|_| Felt::from_name(input.trim()))
}

/// Parse a comma-separated payload of field elements
pub fn parse_payload(input: &str) -> Result<Vec<Felt>, FeltError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::parse)
        .collect()
}

/// Initialize a new account
pub fn cmd_init(
    data_dir: &Path,
    owners: Vec<String>,
    threshold: u32,
    label: Option<String>,
) -> CliResult<()> {
    let storage = open_storage(data_dir)?;

    if storage.exists() {
        return Err(format!(
            "an account already exists in {:?}; owners and threshold are fixed once initialized",
            data_dir
        )
        .into());
    }

    let config = MultisigConfig::new(threshold, owners, label)?;
    config.require_key_addresses()?;
    let account = MultisigAccount::new(config)?;
    storage.save(&account)?;

    println!("✅ Multisig account initialized!");
    println!("   📍 Address: {}", account.address());
    println!("   🔐 Policy: {}", account.config().description());
    for owner in account.owners() {
        println!("   └─ Owner: {}", owner);
    }
    println!("\n   Each owner must now run: multisig set-key --owner <address>");

    Ok(())
}

/// Create a new owner wallet
pub fn cmd_wallet_new(data_dir: &Path, label: Option<&str>) -> CliResult<()> {
    let manager = WalletManager::new(&data_dir.join("wallets"))?;
    let wallet = manager.create_wallet(label)?;

    println!("🔐 New wallet created!");
    println!("   📍 Address: {}", wallet.address());
    println!("   🔑 Public Key: {}", wallet.public_key());
    if let Some(l) = &wallet.label {
        println!("   🏷️  Label: {}", l);
    }
    println!("\n   ⚠️  IMPORTANT: Your private key is stored in the wallets directory.");
    println!("   Back up this directory to avoid losing control of the account!");

    Ok(())
}

/// List owner wallets
pub fn cmd_wallet_list(data_dir: &Path) -> CliResult<()> {
    let manager = WalletManager::new(&data_dir.join("wallets"))?;
    let addresses = manager.list_wallets()?;

    if addresses.is_empty() {
        println!("📭 No wallets found. Create one with: multisig wallet new");
        return Ok(());
    }

    let storage = open_storage(data_dir)?;
    let account = if storage.exists() {
        Some(storage.load()?)
    } else {
        None
    };

    println!("📋 Wallets:");
    for address in &addresses {
        let wallet = manager.load_wallet(address)?;
        let label = wallet.label.as_deref().unwrap_or("-");
        let role = match &account {
            Some(a) if a.is_owner(address) => {
                if a.get_owner_public_key(address)?.is_some() {
                    "owner, key set"
                } else {
                    "owner, key not set"
                }
            }
            Some(_) => "not an owner",
            None => "no account",
        };
        println!("   {} ({}) - {}", address, label, role);
    }

    Ok(())
}

/// Register the owner's wallet key with the account
pub fn cmd_set_key(state: &mut AppState, owner: &str) -> CliResult<()> {
    let wallet = state.wallet_manager.load_wallet(owner)?;
    let key = wallet.key_pair().public_key;
    let request = state.signed(owner, Invocation::SetPublicKey { key })?;

    state.apply(&request)?;

    println!("🔑 Public key registered for {}", owner);
    println!("   {}", wallet.public_key());
    Ok(())
}

/// Submit a new call
pub fn cmd_submit(
    state: &mut AppState,
    owner: &str,
    target: &str,
    selector: &str,
    payload: &str,
) -> CliResult<()> {
    let call = Call::new(target, parse_selector(selector), parse_payload(payload)?);
    let request = state.signed(owner, Invocation::Submit { call: call.clone() })?;

    if let Outcome::Submitted { tx_id } = state.apply(&request)? {
        println!("📤 Transaction submitted:");
        println!("   ID: {}", tx_id);
        println!("   Target: {}", call.target);
        println!("   Selector: {}", call.selector);
        println!("   Payload: {} item(s)", call.payload.len());
        println!(
            "\n   Needs {} confirmation(s) before it can be executed.",
            state.account.get_threshold()
        );
    }
    Ok(())
}

/// Confirm a transaction
pub fn cmd_confirm(state: &mut AppState, owner: &str, tx_id: TxId) -> CliResult<()> {
    let request = state.signed(owner, Invocation::Confirm { tx_id })?;

    if let Outcome::Confirmed { confirmations, .. } = state.apply(&request)? {
        let threshold = state.account.get_threshold();
        println!("✍️  Transaction {} confirmed by {}", tx_id, owner);
        println!("   Confirmations: {}/{}", confirmations, threshold);
        if confirmations >= threshold {
            println!("   ✅ Quorum reached; anyone can now execute it.");
        }
    }
    Ok(())
}

/// Execute a transaction that reached quorum
pub fn cmd_execute(state: &mut AppState, caller: Option<&str>, tx_id: TxId) -> CliResult<()> {
    let caller = caller.unwrap_or(DEFAULT_EXECUTOR);
    let request = SignedRequest::unsigned(caller, Invocation::Execute { tx_id });

    if let Outcome::Executed { result, .. } = state.apply(&request)? {
        println!("🚀 Transaction {} executed", tx_id);
        println!("   Result: 0x{}", hex::encode(&result));
        println!("   Dispatched to outbox {:?}", state.storage.outbox_path());
    }
    Ok(())
}

/// Display account information
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let account = &state.account;
    let executed = account.transactions().filter(|(_, r)| r.executed).count();

    println!("🔐 Multisig Account");
    println!("   ├─ Address: {}", account.address());
    if let Some(label) = &account.config().label {
        println!("   ├─ Label: {}", label);
    }
    println!("   ├─ Policy: {}", account.config().description());
    println!(
        "   ├─ Created: {}",
        account.created_at().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "   ├─ Transactions: {} ({} executed)",
        account.get_last_tx_id(),
        executed
    );
    println!("   └─ Owners:");
    for owner in account.owners() {
        let key = match account.get_owner_public_key(owner)? {
            Some(key) => hex::encode(key.serialize()),
            None => "key not set".to_string(),
        };
        println!("      {} ({}, nonce {})", owner, key, account.get_nonce(owner));
    }

    Ok(())
}

/// Show one transaction
pub fn cmd_tx(state: &AppState, tx_id: TxId) -> CliResult<()> {
    let account = &state.account;
    let record = account.get_transaction(tx_id)?;

    println!("📄 Transaction {}", tx_id);
    println!("   ├─ Status: {:?}", account.get_transaction_status(tx_id)?);
    println!("   ├─ Target: {}", record.call.target);
    println!("   ├─ Selector: {}", record.call.selector);
    println!("   ├─ Payload: [{}]", join_felts(&record.call.payload));
    println!(
        "   ├─ Submitted: {} by {}",
        record.submitted_at.format("%Y-%m-%d %H:%M:%S"),
        record.submitted_by
    );
    if let Some(at) = record.executed_at {
        println!("   ├─ Executed: {}", at.format("%Y-%m-%d %H:%M:%S"));
    }
    println!(
        "   └─ Confirmations: {}/{}",
        record.confirmations,
        account.get_threshold()
    );
    for owner in account.confirmers(tx_id) {
        println!("      ✓ {}", owner);
    }

    Ok(())
}

/// List all transactions
pub fn cmd_txs(state: &AppState) -> CliResult<()> {
    let account = &state.account;

    if account.get_last_tx_id() == 0 {
        println!("📭 No transactions submitted yet.");
        return Ok(());
    }

    println!("📋 Transactions:");
    for (tx_id, record) in account.transactions() {
        println!(
            "   #{} | {:?} | {}/{} | {} {}",
            tx_id,
            record.status(account.get_threshold()),
            record.confirmations,
            account.get_threshold(),
            record.call.target,
            record.call.selector
        );
    }

    Ok(())
}

fn join_felts(items: &[Felt]) -> String {
    items
        .iter()
        .map(Felt::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
