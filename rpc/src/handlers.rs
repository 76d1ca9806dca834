//! RPC request handlers.
//!
//! Amounts cross the wire as decimal strings of raw 18-decimal units,
//! addresses as `0x` hex and timestamps as Unix seconds.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use tavern_auction::{FeeDistribution, HoldStatus, Raid, Slot0, TakeOffice};
use tavern_keeper::{AccountBalances, Tavern};
use tavern_staking::StakeInfo;
use tavern_types::fixed::amount_str;
use tavern_types::{Address, Asset, Timestamp};

use crate::auth::{ClaimsAccount, Signed};
use crate::error::RpcError;

pub type AppState = Arc<Tavern>;

impl From<JsonRejection> for RpcError {
    fn from(e: JsonRejection) -> Self {
        RpcError::InvalidRequest(e.body_text())
    }
}

impl From<PathRejection> for RpcError {
    fn from(e: PathRejection) -> Self {
        RpcError::InvalidRequest(e.body_text())
    }
}

fn parse_address(raw: &str) -> Result<Address, RpcError> {
    raw.parse()
        .map_err(|e| RpcError::InvalidRequest(format!("bad address {raw:?}: {e}")))
}

// ── Shared shapes ────────────────────────────────────────────────────────

/// Body of a signed call that carries nothing but, optionally, the caller.
#[derive(Default, Deserialize)]
pub struct CallerRequest {
    #[serde(default)]
    pub caller: Option<Address>,
}

impl ClaimsAccount for CallerRequest {
    fn claimed_account(&self) -> Option<Address> {
        self.caller
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AmountResponse {
    #[serde(with = "amount_str")]
    pub amount: u128,
}

impl From<u128> for AmountResponse {
    fn from(amount: u128) -> Self {
        Self { amount }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceResponse {
    #[serde(with = "amount_str")]
    pub price: u128,
    pub at: Timestamp,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ── Office ───────────────────────────────────────────────────────────────

pub async fn office_slot0(State(tavern): State<AppState>) -> Json<Slot0> {
    Json(tavern.office_slot0().await)
}

pub async fn office_price(State(tavern): State<AppState>) -> Json<PriceResponse> {
    let price = tavern.office_price().await;
    Json(PriceResponse {
        price,
        at: tavern.now(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DpsResponse {
    #[serde(with = "amount_str")]
    pub dps: u128,
}

pub async fn office_dps(State(tavern): State<AppState>) -> Json<DpsResponse> {
    Json(DpsResponse {
        dps: tavern.office_dps().await,
    })
}

#[derive(Deserialize)]
pub struct TakeOfficeRequest {
    #[serde(default)]
    pub bidder: Option<Address>,
    pub epoch_id: u64,
    pub deadline: Timestamp,
    #[serde(with = "amount_str")]
    pub max_price: u128,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TakeOfficeResponse {
    /// Epoch opened by this take.
    pub epoch_id: u64,
    #[serde(with = "amount_str")]
    pub price_paid: u128,
    pub previous_holder: Option<Address>,
    #[serde(with = "amount_str")]
    pub settled_accrual: u128,
    pub fees: FeeDistribution,
}

impl ClaimsAccount for TakeOfficeRequest {
    fn claimed_account(&self) -> Option<Address> {
        self.bidder
    }
}

pub async fn take_office(
    State(tavern): State<AppState>,
    Signed { signer, body: req }: Signed<TakeOfficeRequest>,
) -> Result<Json<TakeOfficeResponse>, RpcError> {
    let receipt = tavern
        .take_office(TakeOffice {
            bidder: signer,
            epoch_id: req.epoch_id,
            deadline: req.deadline,
            max_price: req.max_price,
            uri: req.uri,
        })
        .await?;
    Ok(Json(TakeOfficeResponse {
        epoch_id: receipt.epoch_id,
        price_paid: receipt.price_paid,
        previous_holder: receipt.previous_holder,
        settled_accrual: receipt.settled_accrual,
        fees: receipt.fees,
    }))
}

pub async fn claim_office_rewards(
    State(tavern): State<AppState>,
    Signed { signer, .. }: Signed<CallerRequest>,
) -> Result<Json<AmountResponse>, RpcError> {
    Ok(Json(tavern.claim_office_rewards(signer).await?.into()))
}

pub async fn withdraw_proceeds(
    State(tavern): State<AppState>,
    Signed { signer, .. }: Signed<CallerRequest>,
) -> Result<Json<AmountResponse>, RpcError> {
    Ok(Json(tavern.withdraw_proceeds(signer).await?.into()))
}

pub async fn relinquish(
    State(tavern): State<AppState>,
    Signed { signer, .. }: Signed<CallerRequest>,
) -> Result<Json<Slot0>, RpcError> {
    Ok(Json(tavern.relinquish(signer).await?))
}

pub async fn evict(
    State(tavern): State<AppState>,
    Signed { signer, .. }: Signed<CallerRequest>,
) -> Result<Json<Slot0>, RpcError> {
    Ok(Json(tavern.evict(signer).await?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CanClaimResponse {
    pub can_claim: bool,
    pub cooldown_remaining: u64,
}

pub async fn can_claim_office(
    State(tavern): State<AppState>,
    address: Result<Path<String>, PathRejection>,
) -> Result<Json<CanClaimResponse>, RpcError> {
    let Path(raw) = address?;
    let account = parse_address(&raw)?;
    let (can_claim, cooldown_remaining) = tavern.can_claim_office(&account).await;
    Ok(Json(CanClaimResponse {
        can_claim,
        cooldown_remaining,
    }))
}

pub async fn check_max_hold_time(State(tavern): State<AppState>) -> Json<HoldStatus> {
    Json(tavern.check_max_hold_time().await)
}

pub async fn claimable_office_rewards(
    State(tavern): State<AppState>,
    address: Result<Path<String>, PathRejection>,
) -> Result<Json<AmountResponse>, RpcError> {
    let Path(raw) = address?;
    let account = parse_address(&raw)?;
    Ok(Json(tavern.claimable_office_rewards(&account).await?.into()))
}

// ── Cellar ───────────────────────────────────────────────────────────────

pub async fn cellar_slot0(State(tavern): State<AppState>) -> Json<Slot0> {
    Json(tavern.cellar_slot0().await)
}

pub async fn cellar_price(State(tavern): State<AppState>) -> Json<PriceResponse> {
    let price = tavern.cellar_price().await;
    Json(PriceResponse {
        price,
        at: tavern.now(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PotResponse {
    #[serde(with = "amount_str")]
    pub pot: u128,
}

pub async fn cellar_pot(State(tavern): State<AppState>) -> Json<PotResponse> {
    Json(PotResponse {
        pot: tavern.cellar_pot().await,
    })
}

#[derive(Deserialize)]
pub struct RaidRequest {
    #[serde(default)]
    pub raider: Option<Address>,
    pub epoch_id: u64,
    pub deadline: Timestamp,
    #[serde(with = "amount_str")]
    pub max_payment: u128,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RaidResponse {
    pub epoch_id: u64,
    #[serde(with = "amount_str")]
    pub price_paid: u128,
    #[serde(with = "amount_str")]
    pub pot_won: u128,
}

impl ClaimsAccount for RaidRequest {
    fn claimed_account(&self) -> Option<Address> {
        self.raider
    }
}

pub async fn raid(
    State(tavern): State<AppState>,
    Signed { signer, body: req }: Signed<RaidRequest>,
) -> Result<Json<RaidResponse>, RpcError> {
    let receipt = tavern
        .raid(Raid {
            raider: signer,
            epoch_id: req.epoch_id,
            deadline: req.deadline,
            max_payment: req.max_payment,
        })
        .await?;
    Ok(Json(RaidResponse {
        epoch_id: receipt.epoch_id,
        price_paid: receipt.price_paid,
        pot_won: receipt.pot_won,
    }))
}

pub async fn harvest(
    State(tavern): State<AppState>,
    Signed { signer, .. }: Signed<CallerRequest>,
) -> Result<Json<AmountResponse>, RpcError> {
    Ok(Json(tavern.harvest(signer).await?.into()))
}

#[derive(Deserialize)]
pub struct DepositRequest {
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(with = "amount_str")]
    pub amount: u128,
}

impl ClaimsAccount for DepositRequest {
    fn claimed_account(&self) -> Option<Address> {
        self.from
    }
}

pub async fn deposit_to_pot(
    State(tavern): State<AppState>,
    Signed { signer, body: req }: Signed<DepositRequest>,
) -> Result<Json<PotResponse>, RpcError> {
    let pot = tavern.deposit_to_pot(signer, req.amount).await?;
    Ok(Json(PotResponse { pot }))
}

// ── Pause and operator ───────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct PausedResponse {
    pub paused: bool,
}

pub async fn paused(State(tavern): State<AppState>) -> Json<PausedResponse> {
    Json(PausedResponse {
        paused: tavern.paused().await,
    })
}

#[derive(Deserialize)]
pub struct SetPausedRequest {
    #[serde(default)]
    pub caller: Option<Address>,
    pub paused: bool,
}

impl ClaimsAccount for SetPausedRequest {
    fn claimed_account(&self) -> Option<Address> {
        self.caller
    }
}

/// Operator only: the signer must be the configured operator.
pub async fn set_paused(
    State(tavern): State<AppState>,
    Signed { signer, body: req }: Signed<SetPausedRequest>,
) -> Result<Json<PausedResponse>, RpcError> {
    tavern.set_paused(signer, req.paused).await?;
    Ok(Json(PausedResponse { paused: req.paused }))
}

pub async fn withdraw_treasury(
    State(tavern): State<AppState>,
    Signed { signer, .. }: Signed<CallerRequest>,
) -> Result<Json<AmountResponse>, RpcError> {
    Ok(Json(tavern.withdraw_treasury(signer).await?.into()))
}

pub async fn withdraw_penalties(
    State(tavern): State<AppState>,
    Signed { signer, .. }: Signed<CallerRequest>,
) -> Result<Json<AmountResponse>, RpcError> {
    Ok(Json(tavern.withdraw_penalties(signer).await?.into()))
}

// ── Staking ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StakeRequest {
    #[serde(default)]
    pub account: Option<Address>,
    #[serde(with = "amount_str")]
    pub amount: u128,
    #[serde(default)]
    pub lock_days: u64,
}

impl ClaimsAccount for StakeRequest {
    fn claimed_account(&self) -> Option<Address> {
        self.account
    }
}

pub async fn stake(
    State(tavern): State<AppState>,
    Signed { signer, body: req }: Signed<StakeRequest>,
) -> Result<Json<StakeInfo>, RpcError> {
    Ok(Json(tavern.stake(signer, req.amount, req.lock_days).await?))
}

#[derive(Deserialize)]
pub struct UnstakeRequest {
    #[serde(default)]
    pub account: Option<Address>,
    #[serde(with = "amount_str")]
    pub amount: u128,
}

impl ClaimsAccount for UnstakeRequest {
    fn claimed_account(&self) -> Option<Address> {
        self.account
    }
}

pub async fn unstake(
    State(tavern): State<AppState>,
    Signed { signer, body: req }: Signed<UnstakeRequest>,
) -> Result<Json<StakeInfo>, RpcError> {
    Ok(Json(tavern.unstake(signer, req.amount).await?))
}

#[derive(Default, Deserialize)]
pub struct AccountRequest {
    #[serde(default)]
    pub account: Option<Address>,
}

impl ClaimsAccount for AccountRequest {
    fn claimed_account(&self) -> Option<Address> {
        self.account
    }
}

pub async fn claim_staking_rewards(
    State(tavern): State<AppState>,
    Signed { signer, .. }: Signed<AccountRequest>,
) -> Result<Json<AmountResponse>, RpcError> {
    Ok(Json(tavern.claim_staking_rewards(signer).await?.into()))
}

/// Permissionless: drops an expired lock back to the base multiplier.
pub async fn poke_stake(
    State(tavern): State<AppState>,
    address: Result<Path<String>, PathRejection>,
) -> Result<Json<StakeInfo>, RpcError> {
    let Path(raw) = address?;
    let account = parse_address(&raw)?;
    Ok(Json(tavern.poke_stake(account).await?))
}

pub async fn pending_rewards(
    State(tavern): State<AppState>,
    address: Result<Path<String>, PathRejection>,
) -> Result<Json<AmountResponse>, RpcError> {
    let Path(raw) = address?;
    let account = parse_address(&raw)?;
    Ok(Json(tavern.pending_rewards(&account).await.into()))
}

pub async fn user_stake(
    State(tavern): State<AppState>,
    address: Result<Path<String>, PathRejection>,
) -> Result<Json<StakeInfo>, RpcError> {
    let Path(raw) = address?;
    let account = parse_address(&raw)?;
    Ok(Json(tavern.user_stake(&account).await))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalWeightedResponse {
    #[serde(with = "amount_str")]
    pub total_weighted_stake: u128,
}

pub async fn total_weighted_stake(State(tavern): State<AppState>) -> Json<TotalWeightedResponse> {
    Json(TotalWeightedResponse {
        total_weighted_stake: tavern.total_weighted_stake().await,
    })
}

// ── Balances ─────────────────────────────────────────────────────────────

pub async fn balances(
    State(tavern): State<AppState>,
    address: Result<Path<String>, PathRejection>,
) -> Result<Json<AccountBalances>, RpcError> {
    let Path(raw) = address?;
    let account = parse_address(&raw)?;
    Ok(Json(tavern.balances_of(account).await))
}

#[derive(Deserialize)]
pub struct FaucetRequest {
    pub account: Address,
    pub asset: Asset,
    #[serde(with = "amount_str")]
    pub amount: u128,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FaucetResponse {
    pub asset: Asset,
    #[serde(with = "amount_str")]
    pub balance: u128,
}

/// Unsigned; refused unless the keeper runs with the faucet enabled.
pub async fn faucet(
    State(tavern): State<AppState>,
    payload: Result<Json<FaucetRequest>, JsonRejection>,
) -> Result<Json<FaucetResponse>, RpcError> {
    let Json(req) = payload?;
    let balance = tavern.faucet(req.account, req.asset, req.amount).await?;
    Ok(Json(FaucetResponse {
        asset: req.asset,
        balance,
    }))
}

// ── Telemetry ────────────────────────────────────────────────────────────

pub async fn metrics(State(tavern): State<AppState>) -> Result<impl IntoResponse, RpcError> {
    let text = tavern.metrics_text()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    ))
}
