//! Storage module for account persistence

pub mod outbox;
pub mod persistence;

pub use outbox::{OutboxEntry, OutboxExecutor};
pub use persistence::{load_from_file, Storage, StorageConfig, StorageError};
