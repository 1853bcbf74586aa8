//! Execution gateway
//!
//! The engine never performs calls itself; it hands the stored call to a
//! `CallExecutor` and marks the record executed only if dispatch succeeds.

use crate::core::{Call, Felt};
use thiserror::Error;

/// Dispatch failures. Any of these aborts `execute_transaction`.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Call to {target} rejected: {reason}")]
    Rejected { target: String, reason: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Performs an external call and returns its raw result data
pub trait CallExecutor {
    fn dispatch(
        &mut self,
        target: &str,
        selector: &Felt,
        payload: &[Felt],
    ) -> Result<Vec<u8>, ExecutorError>;
}

/// In-memory gateway that records every dispatched call.
///
/// Returns the 32-byte call hash as result data.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub dispatched: Vec<Call>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CallExecutor for RecordingExecutor {
    fn dispatch(
        &mut self,
        target: &str,
        selector: &Felt,
        payload: &[Felt],
    ) -> Result<Vec<u8>, ExecutorError> {
        let call = Call::new(target, *selector, payload.to_vec());
        let result = call.hash().as_bytes().to_vec();
        self.dispatched.push(call);
        Ok(result)
    }
}
