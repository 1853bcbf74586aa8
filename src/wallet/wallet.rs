//! Owner wallet implementation
//!
//! Holds an owner's secp256k1 key pair and signs multisig requests.

use crate::crypto::KeyPair;
use crate::multisig::{Invocation, MultisigAccount, SignedRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] crate::crypto::KeyError),
}

/// Serializable wallet data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct WalletData {
    private_key_hex: String,
    address: String,
    label: Option<String>,
}

/// An owner wallet
pub struct Wallet {
    key_pair: KeyPair,
    /// Optional label for the wallet
    pub label: Option<String>,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: None,
        }
    }

    /// Create a wallet with a label
    pub fn with_label(label: &str) -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: Some(label.to_string()),
        }
    }

    /// Import a wallet from a private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        Ok(Self {
            key_pair,
            label: None,
        })
    }

    /// Owner address of this wallet
    pub fn address(&self) -> String {
        self.key_pair.address()
    }

    /// Public key (hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Get the wallet's private key (hex)
    /// WARNING: Keep this secret!
    pub fn private_key(&self) -> String {
        self.key_pair.private_key_hex()
    }

    /// Sign `invocation` for `account` with this wallet's next nonce
    pub fn sign_request(
        &self,
        account: &MultisigAccount,
        invocation: Invocation,
    ) -> Result<SignedRequest, WalletError> {
        let address = self.address();
        let nonce = account.get_nonce(&address);
        Ok(SignedRequest::sign(
            &self.key_pair,
            &address,
            nonce,
            invocation,
            account.address(),
        )?)
    }

    /// Save wallet to file
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let data = WalletData {
            private_key_hex: self.private_key(),
            address: self.address(),
            label: self.label.clone(),
        };

        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load wallet from file
    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let json = fs::read_to_string(path)?;
        let data: WalletData = serde_json::from_str(&json)?;

        let mut wallet = Self::from_private_key(&data.private_key_hex)?;
        wallet.label = data.label;
        Ok(wallet)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Wallet manager for handling multiple owner wallets
pub struct WalletManager {
    wallets_dir: PathBuf,
}

impl WalletManager {
    /// Create a new wallet manager
    pub fn new(wallets_dir: &Path) -> Result<Self, WalletError> {
        fs::create_dir_all(wallets_dir)?;
        Ok(Self {
            wallets_dir: wallets_dir.to_path_buf(),
        })
    }

    fn wallet_path(&self, address: &str) -> PathBuf {
        self.wallets_dir.join(format!("{}.json", address))
    }

    /// Create and save a new wallet
    pub fn create_wallet(&self, label: Option<&str>) -> Result<Wallet, WalletError> {
        let wallet = match label {
            Some(l) => Wallet::with_label(l),
            None => Wallet::new(),
        };

        wallet.save(&self.wallet_path(&wallet.address()))?;
        Ok(wallet)
    }

    /// List all wallet addresses
    pub fn list_wallets(&self) -> Result<Vec<String>, WalletError> {
        let mut addresses = Vec::new();

        for entry in fs::read_dir(&self.wallets_dir)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Ok(wallet) = Wallet::load(&path) {
                    addresses.push(wallet.address());
                }
            }
        }

        addresses.sort();
        Ok(addresses)
    }

    /// Load a specific wallet by address
    pub fn load_wallet(&self, address: &str) -> Result<Wallet, WalletError> {
        let path = self.wallet_path(address);
        if !path.exists() {
            return Err(WalletError::NotFound(address.to_string()));
        }
        Wallet::load(&path)
    }

    /// Delete a wallet
    pub fn delete_wallet(&self, address: &str) -> Result<(), WalletError> {
        fs::remove_file(self.wallet_path(address))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::{Outcome, RecordingExecutor};

    #[test]
    fn test_wallet_creation() {
        let wallet = Wallet::new();
        assert!(!wallet.address().is_empty());
        assert!(!wallet.public_key().is_empty());
        assert!(!wallet.private_key().is_empty());
    }

    #[test]
    fn test_wallet_import() {
        let wallet1 = Wallet::new();
        let wallet2 = Wallet::from_private_key(&wallet1.private_key()).unwrap();
        assert_eq!(wallet1.address(), wallet2.address());
    }

    #[test]
    fn test_wallet_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("test_wallet.json");

        let wallet1 = Wallet::with_label("Treasurer");
        wallet1.save(&path).unwrap();

        let wallet2 = Wallet::load(&path).unwrap();
        assert_eq!(wallet1.address(), wallet2.address());
        assert_eq!(wallet1.label, wallet2.label);
    }

    #[test]
    fn test_manager_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = WalletManager::new(temp_dir.path()).unwrap();

        let a = manager.create_wallet(Some("a")).unwrap();
        let b = manager.create_wallet(None).unwrap();

        let listed = manager.list_wallets().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&a.address()));
        assert!(listed.contains(&b.address()));

        let loaded = manager.load_wallet(&a.address()).unwrap();
        assert_eq!(loaded.label.as_deref(), Some("a"));
        assert!(matches!(
            manager.load_wallet("missing"),
            Err(WalletError::NotFound(_))
        ));

        manager.delete_wallet(&b.address()).unwrap();
        assert_eq!(manager.list_wallets().unwrap(), vec![a.address()]);
    }

    #[test]
    fn test_signed_request_is_accepted() {
        let wallets: Vec<Wallet> = (0..2).map(|_| Wallet::new()).collect();
        let owners = wallets.iter().map(|w| w.address()).collect();
        let mut account = MultisigAccount::initialize(owners, 2).unwrap();
        let mut executor = RecordingExecutor::new();
        let mut events = Vec::new();

        let request = wallets[0]
            .sign_request(
                &account,
                Invocation::SetPublicKey {
                    key: wallets[0].key_pair().public_key,
                },
            )
            .unwrap();
        let outcome = account.invoke(&request, &mut executor, &mut events).unwrap();

        assert_eq!(outcome, Outcome::PublicKeySet);
        assert_eq!(account.get_nonce(&wallets[0].address()), 1);
    }
}
