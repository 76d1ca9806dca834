//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tavern_auction::AuctionError;
use tavern_keeper::KeeperError;
use tavern_staking::StakingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Keeper(#[from] KeeperError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("server error: {0}")]
    Server(String),
}

impl From<AuctionError> for RpcError {
    fn from(e: AuctionError) -> Self {
        RpcError::Keeper(e.into())
    }
}

impl From<StakingError> for RpcError {
    fn from(e: StakingError) -> Self {
        RpcError::Keeper(e.into())
    }
}

impl RpcError {
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::Keeper(e) => e.kind(),
            RpcError::InvalidRequest(_) => "invalid_request",
            RpcError::Unauthenticated(_) => "unauthenticated",
            RpcError::Forbidden(_) => "forbidden",
            RpcError::Server(_) => "server",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::Keeper(KeeperError::Auction(e)) => auction_status(e),
            RpcError::Keeper(KeeperError::Staking(e)) => staking_status(e),
            RpcError::Keeper(KeeperError::Settlement(_)) => StatusCode::CONFLICT,
            RpcError::Keeper(KeeperError::FaucetDisabled) => StatusCode::FORBIDDEN,
            RpcError::Keeper(_) | RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            RpcError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

fn auction_status(e: &AuctionError) -> StatusCode {
    match e {
        AuctionError::DeadlineExpired { .. } => StatusCode::REQUEST_TIMEOUT,
        AuctionError::Paused => StatusCode::SERVICE_UNAVAILABLE,
        AuctionError::Unauthorized | AuctionError::NotEntitled => StatusCode::FORBIDDEN,
        AuctionError::InvalidParams(_) => StatusCode::BAD_REQUEST,
        AuctionError::Math(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::CONFLICT,
    }
}

fn staking_status(e: &StakingError) -> StatusCode {
    match e {
        StakingError::Paused => StatusCode::SERVICE_UNAVAILABLE,
        StakingError::Unauthorized => StatusCode::FORBIDDEN,
        StakingError::InvalidParams(_) => StatusCode::BAD_REQUEST,
        StakingError::Math(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::CONFLICT,
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        }
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
