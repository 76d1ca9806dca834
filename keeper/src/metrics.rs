//! Prometheus metrics for the keeper.
//!
//! [`KeeperMetrics`] owns a dedicated [`Registry`] that the HTTP
//! `/metrics` endpoint encodes into the Prometheus text format.

use prometheus::{
    register_gauge_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, Gauge,
    IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use tavern_types::SCALE;

pub struct KeeperMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub office_takes: IntCounter,
    pub cellar_raids: IntCounter,
    pub evictions: IntCounter,
    /// Failed acquisitions, labelled by error kind.
    pub rejected_bids: IntCounterVec,
    pub stakes: IntCounter,
    pub unstakes: IntCounter,
    /// Successful reward payouts of any kind.
    pub claims: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub office_epoch: IntGauge,
    pub cellar_epoch: IntGauge,
    /// Whole units; the raw value is 18-decimal.
    pub total_weighted_stake: Gauge,
    /// Whole units of `Payment` waiting in the cellar.
    pub cellar_pot: Gauge,
}

impl KeeperMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let office_takes = register_int_counter_with_registry!(
            Opts::new("tavern_office_takes_total", "Successful office acquisitions"),
            registry
        )?;
        let cellar_raids = register_int_counter_with_registry!(
            Opts::new("tavern_cellar_raids_total", "Successful cellar raids"),
            registry
        )?;
        let evictions = register_int_counter_with_registry!(
            Opts::new("tavern_office_evictions_total", "Forced max-hold evictions"),
            registry
        )?;
        let rejected_bids = register_int_counter_vec_with_registry!(
            Opts::new("tavern_rejected_bids_total", "Rejected office and cellar bids"),
            &["reason"],
            registry
        )?;
        let stakes = register_int_counter_with_registry!(
            Opts::new("tavern_stakes_total", "Successful stake calls"),
            registry
        )?;
        let unstakes = register_int_counter_with_registry!(
            Opts::new("tavern_unstakes_total", "Successful unstake calls"),
            registry
        )?;
        let claims = register_int_counter_with_registry!(
            Opts::new("tavern_claims_total", "Non-zero reward, proceeds and harvest payouts"),
            registry
        )?;

        let office_epoch = register_int_gauge_with_registry!(
            Opts::new("tavern_office_epoch", "Current office epoch id"),
            registry
        )?;
        let cellar_epoch = register_int_gauge_with_registry!(
            Opts::new("tavern_cellar_epoch", "Current cellar epoch id"),
            registry
        )?;
        let total_weighted_stake = register_gauge_with_registry!(
            Opts::new("tavern_total_weighted_stake", "Total lock-weighted stake"),
            registry
        )?;
        let cellar_pot = register_gauge_with_registry!(
            Opts::new("tavern_cellar_pot", "Payment held in the cellar pot"),
            registry
        )?;

        Ok(Self {
            registry,
            office_takes,
            cellar_raids,
            evictions,
            rejected_bids,
            stakes,
            unstakes,
            claims,
            office_epoch,
            cellar_epoch,
            total_weighted_stake,
            cellar_pot,
        })
    }

    pub fn reject(&self, reason: &str) {
        self.rejected_bids.with_label_values(&[reason]).inc();
    }

    /// Prometheus text exposition of every registered metric.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// 18-decimal amount as a float of whole units, for gauges.
pub fn whole_units(amount: u128) -> f64 {
    (amount / SCALE) as f64 + (amount % SCALE) as f64 / SCALE as f64
}
