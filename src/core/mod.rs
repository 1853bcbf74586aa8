//! Core value types
//!
//! - `Felt`: 32-byte field element used for selectors, payloads, hashes
//!   and signature scalars
//! - `Call`: a delegated call (target, selector, payload)

pub mod call;
pub mod felt;

pub use call::Call;
pub use felt::{Felt, FeltError};
