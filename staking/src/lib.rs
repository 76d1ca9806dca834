//! Lock-weighted staking.
//!
//! Accounts stake `Keep` with an optional lock. Longer locks earn a higher
//! multiplier, and rewards (paid in `Payment`) are shared in proportion to
//! weighted stake using reward-per-weighted-stake accounting: each
//! distribution raises a global accumulator, and each account's pending
//! reward is its weighted stake times the accumulator minus a debt
//! checkpoint taken at its last change.

pub mod error;
pub mod event;
pub mod ledger;
pub mod policy;
pub mod schedule;
pub mod stake;

pub use error::StakingError;
pub use event::StakingEvent;
pub use ledger::{StakingLedger, StakingParams};
pub use policy::EarlyExitPolicy;
pub use schedule::{LockSchedule, LockTier};
pub use stake::StakeInfo;
