//! Account persistence layer
//!
//! Provides save/load functionality for the multisig account state.

use crate::multisig::{MultisigAccount, MultisigError};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid account state: {0}")]
    InvalidState(#[from] MultisigError),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub account_file: String,
    pub outbox_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".multisig_data"),
            account_file: "account.json".to_string(),
            outbox_file: "outbox.jsonl".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Account storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn account_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.account_file)
    }

    /// Path of the dispatched-call outbox
    pub fn outbox_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.outbox_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.account_file, index))
    }

    /// Save the account to disk
    pub fn save(&self, account: &MultisigAccount) -> Result<(), StorageError> {
        let path = self.account_path();

        if self.config.backup_enabled && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self.config.data_dir.join("account.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, account)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        log::debug!("Saved account {} to {:?}", account.address(), path);
        Ok(())
    }

    /// Load the account from disk, rejecting snapshots that break invariants
    pub fn load(&self) -> Result<MultisigAccount, StorageError> {
        let path = self.account_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Account file not found".to_string(),
            ));
        }

        load_from_file(&path)
    }

    /// Check if a saved account exists
    pub fn exists(&self) -> bool {
        self.account_path().exists()
    }

    /// Delete the saved account
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.account_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        if self.config.max_backups == 0 {
            return Ok(());
        }

        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<MultisigAccount, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        load_from_file(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }
}

/// Load an account from a specific file path
pub fn load_from_file(path: &Path) -> Result<MultisigAccount, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let account: MultisigAccount = serde_json::from_reader(reader)?;

    account.check_invariants()?;

    Ok(account)
}
