//! HTTP/JSON server for the tavern keeper.
//!
//! Provides endpoints for:
//! - Office reads, bids, claims, relinquish and eviction
//! - Cellar reads, raids, harvests and pot deposits
//! - Staking writes and reads
//! - Pause and operator withdrawals
//! - Account balances, the test faucet and Prometheus metrics
//!
//! State-changing routes require a signed request; see [`auth`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::{signature_headers, RpcState, Signed};
pub use error::RpcError;
pub use server::{router, RpcServer};
