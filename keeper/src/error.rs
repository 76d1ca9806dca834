use tavern_auction::AuctionError;
use tavern_staking::StakingError;
use tavern_types::SettlementError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeeperError {
    #[error("auction error: {0}")]
    Auction(#[from] AuctionError),

    #[error("staking error: {0}")]
    Staking(#[from] StakingError),

    #[error("settlement error: {0}")]
    Settlement(#[from] SettlementError),

    #[error("faucet is disabled")]
    FaucetDisabled,

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KeeperError {
    /// Stable snake_case name of the underlying failure.
    pub fn kind(&self) -> &'static str {
        match self {
            KeeperError::Auction(e) => e.kind(),
            KeeperError::Staking(e) => e.kind(),
            KeeperError::Settlement(_) => "settlement",
            KeeperError::FaucetDisabled => "faucet_disabled",
            KeeperError::Config(_) => "config",
            KeeperError::Snapshot(_) => "snapshot",
            KeeperError::Metrics(_) => "metrics",
            KeeperError::Io(_) => "io",
        }
    }
}
