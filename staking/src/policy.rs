use serde::{Deserialize, Serialize};

/// What `unstake` does with principal that is still locked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyExitPolicy {
    /// Refuse with `LockActive`.
    #[default]
    Reject,
    /// Return the principal minus `penalty_bps`; the penalty stays with the ledger.
    Penalize { penalty_bps: u32 },
}
