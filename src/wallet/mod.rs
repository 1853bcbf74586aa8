//! Owner keystore: key files and request signing

pub mod wallet;

pub use wallet::{Wallet, WalletError, WalletManager};
