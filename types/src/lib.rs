//! Fundamental types for the tavern keeper.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, timestamps and clocks, fixed-point amounts, assets, and the
//! settlement boundary through which value enters and leaves the engines.

pub mod address;
pub mod asset;
pub mod error;
pub mod fixed;
pub mod settlement;
pub mod time;

pub use address::Address;
pub use asset::Asset;
pub use error::{MathError, TypesError};
pub use fixed::{bps_of, mul_div, Wad, BPS_DENOMINATOR, SCALE};
pub use settlement::{Settlement, SettlementError};
pub use time::{Clock, SystemClock, Timestamp, SECS_PER_DAY};
