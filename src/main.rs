//! Multisig account CLI
//!
//! A command-line interface for operating an M-of-N multisig account.

use clap::{Parser, Subcommand};
use multisig_account::cli::{self, AppState};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "multisig")]
#[command(version = "0.1.0")]
#[command(about = "Threshold-authorized multisig account", long_about = None)]
struct Cli {
    /// Data directory for account state and wallets
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new account
    Init {
        /// Owner addresses (comma-separated, at least 2)
        #[arg(short, long, value_delimiter = ',')]
        owners: Vec<String>,

        /// Confirmations required before execution
        #[arg(short, long)]
        threshold: u32,

        /// Optional label for the account
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Owner wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },

    /// Register an owner's public key from its wallet
    SetKey {
        /// Owner address (must have a wallet)
        #[arg(short, long)]
        owner: String,
    },

    /// Submit a call for confirmation
    Submit {
        /// Submitting owner's address
        #[arg(short, long)]
        owner: String,

        /// Call target
        #[arg(long)]
        target: String,

        /// Selector: a field element (0x.. or decimal) or an entry-point name
        #[arg(short, long)]
        selector: String,

        /// Payload field elements (comma-separated)
        #[arg(short, long, default_value = "")]
        payload: String,
    },

    /// Confirm a submitted transaction
    Confirm {
        /// Confirming owner's address
        #[arg(short, long)]
        owner: String,

        /// Transaction id
        #[arg(long)]
        tx_id: u64,
    },

    /// Execute a transaction that reached quorum
    Execute {
        /// Transaction id
        #[arg(long)]
        tx_id: u64,

        /// Caller recorded as executor
        #[arg(short, long)]
        caller: Option<String>,
    },

    /// Display account information
    Info,

    /// Show one transaction
    Tx {
        /// Transaction id
        #[arg(long)]
        tx_id: u64,
    },

    /// List all transactions
    Txs,
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Create a new owner wallet
    New {
        /// Optional label for the wallet
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List all wallets
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Init {
            owners,
            threshold,
            label,
        } => cli::cmd_init(&data_dir, owners, threshold, label),

        Commands::Wallet { action } => match action {
            WalletCommands::New { label } => cli::cmd_wallet_new(&data_dir, label.as_deref()),
            WalletCommands::List => cli::cmd_wallet_list(&data_dir),
        },

        Commands::SetKey { owner } => cli::cmd_set_key(&mut load_state(&data_dir)?, &owner),

        Commands::Submit {
            owner,
            target,
            selector,
            payload,
        } => cli::cmd_submit(
            &mut load_state(&data_dir)?,
            &owner,
            &target,
            &selector,
            &payload,
        ),

        Commands::Confirm { owner, tx_id } => {
            cli::cmd_confirm(&mut load_state(&data_dir)?, &owner, tx_id)
        }

        Commands::Execute { tx_id, caller } => {
            cli::cmd_execute(&mut load_state(&data_dir)?, caller.as_deref(), tx_id)
        }

        Commands::Info => cli::cmd_info(&load_state(&data_dir)?),

        Commands::Tx { tx_id } => cli::cmd_tx(&load_state(&data_dir)?, tx_id),

        Commands::Txs => cli::cmd_txs(&load_state(&data_dir)?),
    }
}

/// Load the persisted account for commands that operate on it
fn load_state(data_dir: &Path) -> cli::CliResult<AppState> {
    AppState::new(data_dir.to_path_buf())
}
