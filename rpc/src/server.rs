//! Axum-based RPC server.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use tavern_keeper::Tavern;

use crate::auth::RpcState;
use crate::error::RpcError;
use crate::handlers;

/// Build the full route table over a shared keeper.
///
/// POST routes other than `/faucet` and `/staking/poke/:address` need a signed request.
pub fn router(tavern: Arc<Tavern>) -> Router {
    let enable_metrics = tavern.config().enable_metrics;
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        // Office
        .route("/office/slot0", get(handlers::office_slot0))
        .route("/office/price", get(handlers::office_price))
        .route("/office/dps", get(handlers::office_dps))
        .route("/office/take", post(handlers::take_office))
        .route("/office/claim", post(handlers::claim_office_rewards))
        .route("/office/withdraw", post(handlers::withdraw_proceeds))
        .route("/office/relinquish", post(handlers::relinquish))
        .route("/office/evict", post(handlers::evict))
        .route("/office/can-claim/:address", get(handlers::can_claim_office))
        .route("/office/claimable/:address", get(handlers::claimable_office_rewards))
        .route("/office/max-hold", get(handlers::check_max_hold_time))
        // Cellar
        .route("/cellar/slot0", get(handlers::cellar_slot0))
        .route("/cellar/price", get(handlers::cellar_price))
        .route("/cellar/pot", get(handlers::cellar_pot))
        .route("/cellar/raid", post(handlers::raid))
        .route("/cellar/harvest", post(handlers::harvest))
        .route("/cellar/deposit", post(handlers::deposit_to_pot))
        // Pause and operator
        .route("/paused", get(handlers::paused))
        .route("/admin/pause", post(handlers::set_paused))
        .route("/admin/withdraw-treasury", post(handlers::withdraw_treasury))
        .route("/admin/withdraw-penalties", post(handlers::withdraw_penalties))
        // Staking
        .route("/staking/stake", post(handlers::stake))
        .route("/staking/unstake", post(handlers::unstake))
        .route("/staking/claim", post(handlers::claim_staking_rewards))
        .route("/staking/pending/:address", get(handlers::pending_rewards))
        .route("/staking/stake/:address", get(handlers::user_stake))
        .route("/staking/total-weighted", get(handlers::total_weighted_stake))
        .route("/staking/poke/:address", post(handlers::poke_stake))
        // Balances and telemetry
        .route("/balances/:address", get(handlers::balances))
        .route("/faucet", post(handlers::faucet));
    if enable_metrics {
        app = app.route("/metrics", get(handlers::metrics));
    }
    app.layer(CorsLayer::permissive())
        .with_state(RpcState::new(tavern))
}

pub struct RpcServer {
    pub addr: String,
    pub tavern: Arc<Tavern>,
}

impl RpcServer {
    pub fn new(addr: impl Into<String>, tavern: Arc<Tavern>) -> Self {
        Self {
            addr: addr.into(),
            tavern,
        }
    }

    /// Serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(Arc::clone(&self.tavern));
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.addr)))?;
        info!("RPC server listening on {}", self.addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("RPC server stopped");
        Ok(())
    }
}
