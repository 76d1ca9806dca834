//! Decaying-price slot auctions.
//!
//! A slot is held by one address at a time. The price to take it decays
//! from `init_price` as time passes since `start_time`; whoever pays the
//! current price becomes the holder, the epoch advances, and the price
//! restarts higher. Price is never stored, always derived:
//! `price(now) = max(min_price, curve(init_price, now − start_time))`.
//!
//! Two variants share the core in [`slot`]:
//! - [`OfficeAuction`]: the holder accrues `dps` rewards while holding and is
//!   paid a share of the next winning bid; holders that outstay the max-hold
//!   window can be evicted by anyone.
//! - [`CellarAuction`]: a pot of fees is won outright by whoever raids it,
//!   paying in LP tokens.

pub mod cellar;
pub mod cooldown;
pub mod decay;
pub mod error;
pub mod event;
pub mod office;
pub mod params;
pub mod slot;

pub use cellar::{CellarAuction, Raid, RaidReceipt};
pub use cooldown::CooldownBook;
pub use decay::DecayCurve;
pub use error::AuctionError;
pub use event::AuctionEvent;
pub use office::{FeeDistribution, HoldStatus, HolderCredit, OfficeAuction, TakeOffice, TakeReceipt};
pub use params::{CellarParams, DpsSchedule, FeeSplit, OfficeParams, PriceParams};
pub use slot::{Slot0, SlotAuction};
