//! TavernKeeper service layer.
//!
//! Wires the office and cellar auctions and the staking ledger together:
//! - Serializes every state transition behind ordered locks
//! - Routes the pot and staking shares of each office sale
//! - Settles transfers against an in-memory balance book
//! - Emits events to subscribers and counts them in Prometheus metrics
//! - Snapshots the whole state to disk and restores it on start

pub mod balances;
pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod service;
pub mod shutdown;
pub mod snapshot;

pub use balances::BalanceBook;
pub use config::KeeperConfig;
pub use error::KeeperError;
pub use event::{EventBus, TavernEvent};
pub use metrics::KeeperMetrics;
pub use service::{AccountBalances, Tavern};
pub use shutdown::{ShutdownController, ShutdownSignal};
pub use snapshot::{TavernSnapshot, SNAPSHOT_VERSION};
