//! Events emitted by the keeper for subscribers.

use serde::Serialize;
use tavern_auction::AuctionEvent;
use tavern_staking::StakingEvent;

/// Every committed transition, from either engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TavernEvent {
    Auction(AuctionEvent),
    Staking(StakingEvent),
}

impl TavernEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TavernEvent::Auction(e) => e.kind(),
            TavernEvent::Staking(e) => e.kind(),
        }
    }
}

impl From<AuctionEvent> for TavernEvent {
    fn from(e: AuctionEvent) -> Self {
        TavernEvent::Auction(e)
    }
}

impl From<StakingEvent> for TavernEvent {
    fn from(e: StakingEvent) -> Self {
        TavernEvent::Staking(e)
    }
}

/// Synchronous fan-out event bus.
///
/// Listeners run inline while the emitting operation still holds its
/// locks; keep handlers fast and never call back into the keeper.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&TavernEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&TavernEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &TavernEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tavern_types::Address;

    fn pause_event() -> TavernEvent {
        AuctionEvent::PauseChanged {
            paused: true,
            by: Address::ZERO,
        }
        .into()
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&pause_event());
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::default();
        assert!(bus.is_empty());
        bus.emit(&pause_event());
    }

    #[test]
    fn listener_sees_engine_of_origin() {
        let staking_seen = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        let seen = Arc::clone(&staking_seen);
        bus.subscribe(Box::new(move |event| {
            if let TavernEvent::Staking(_) = event {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        }));

        bus.emit(&pause_event());
        bus.emit(&StakingEvent::RewardsClaimed {
            account: Address::ZERO,
            amount: 1,
        }
        .into());
        assert_eq!(staking_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn untagged_json_keeps_inner_type() {
        let json = serde_json::to_value(pause_event()).unwrap();
        assert_eq!(json["type"], "pause_changed");
        assert_eq!(json["paused"], true);
    }
}
