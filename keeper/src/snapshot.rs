//! Whole-state snapshots, written with bincode.
//!
//! The file is written to a sibling temp path and renamed into place, so a
//! crash mid-write leaves the previous snapshot intact.

use crate::balances::BalanceBook;
use crate::KeeperError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tavern_auction::{CellarAuction, OfficeAuction};
use tavern_staking::StakingLedger;
use tavern_types::Timestamp;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TavernSnapshot {
    pub version: u32,
    pub taken_at: Timestamp,
    pub office: OfficeAuction,
    pub cellar: CellarAuction,
    pub staking: StakingLedger,
    pub balances: BalanceBook,
}

impl TavernSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, KeeperError> {
        bincode::serialize(self).map_err(|e| KeeperError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeeperError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| KeeperError::Snapshot(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(KeeperError::Snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<(), KeeperError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("snapshot.tmp");
        std::fs::write(&tmp, self.to_bytes()?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// `Ok(None)` when no snapshot exists yet.
    pub fn load(path: &Path) -> Result<Option<Self>, KeeperError> {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
