//! Nullable infrastructure for deterministic testing.
//!
//! The engines reach the outside world through two seams: the [`Clock`]
//! the keeper reads `now` from, and the [`Settlement`] value moves
//! through. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what they were asked to do
//!
//! [`Clock`]: tavern_types::Clock
//! [`Settlement`]: tavern_types::Settlement

pub mod clock;
pub mod settlement;

pub use clock::NullClock;
pub use settlement::{NullSettlement, Transfer, TransferKind};
