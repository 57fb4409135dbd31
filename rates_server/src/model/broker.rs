//! Registry of streaming subscribers and per-subscriber fan-out.
//!
//! The `SubscriptionBroker` keeps every live subscription together with its outbound
//! sink. Each subscription watches a de-duplicated list of currencies and wants values
//! expressed against its own base currency, so every push is personalised:
//!
//! - `subscribe` validates the request, registers it, and immediately sends a snapshot
//!   of the whole watch set.
//! - `broadcast` sends each subscription only the watched currencies that changed,
//!   skipping subscriptions with nothing to receive.
//!
//! A push that fails removes the subscription on the spot; the remaining subscribers
//! are still served in the same pass. A subscription with nothing to receive is asked
//! whether its transport has closed and is removed the same way if so.

use crate::model::rate_store::RateStore;
use crate::model::sink::UpdateSink;
use log::{debug, info, warn};
use rates_common::{RateUpdate, RatesError, Result, SubscribeRequest};
use std::collections::HashSet;
use std::fmt;

/// Process-unique handle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Counters describing one `broadcast` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscriptions that received an update.
    pub delivered: usize,
    /// Subscriptions skipped because none of their currencies changed.
    pub suppressed: usize,
    /// Subscriptions removed because their push failed or their transport closed.
    pub dropped: usize,
}

enum Delivery {
    Sent,
    Suppressed,
    Failed,
}

struct Subscription<S> {
    id: SubscriptionId,
    base_currency: String,
    watch: Vec<String>,
    sink: S,
}

impl<S: UpdateSink> Subscription<S> {
    /// Build this subscription's update. `None` selects the whole watch set.
    fn build_update(
        &self,
        store: &RateStore,
        changed: Option<&HashSet<String>>,
    ) -> Result<RateUpdate> {
        let mut update = RateUpdate::default();
        for code in &self.watch {
            if changed.is_some_and(|changed| !changed.contains(code)) {
                continue;
            }
            let value = store.convert(&self.base_currency, code)?;
            if !value.is_finite() {
                warn!(
                    "Skipping {} for {}: no finite rate against {}",
                    code, self.id, self.base_currency
                );
                continue;
            }
            update.push(code, value);
        }
        Ok(update)
    }

    fn deliver(&mut self, store: &RateStore, changed: Option<&HashSet<String>>) -> Delivery {
        let update = match self.build_update(store, changed) {
            Ok(update) => update,
            Err(e) => {
                warn!("Failed to build update for {}: {}", self.id, e);
                return Delivery::Suppressed;
            }
        };
        if update.is_empty() {
            if self.sink.is_closed() {
                info!("Subscriber {} closed its connection", self.id);
                return Delivery::Failed;
            }
            return Delivery::Suppressed;
        }
        match self.sink.push(&update) {
            Ok(()) => {
                debug!("Pushed {} rate(s) to {}", update.len(), self.id);
                Delivery::Sent
            }
            Err(e) => {
                warn!("Dropping {}: {}", self.id, e);
                Delivery::Failed
            }
        }
    }
}

/// Owns the set of active subscriptions.
pub struct SubscriptionBroker<S: UpdateSink> {
    subscriptions: Vec<Subscription<S>>,
    next_id: u64,
}

impl<S: UpdateSink> SubscriptionBroker<S> {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` when nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Returns `true` if `id` is still registered.
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.subscriptions.iter().any(|s| s.id == id)
    }

    /// Register a subscriber and send it the full snapshot of its watch set.
    ///
    /// Fails with `UnknownCurrency` if the requested base currency is not in `store`;
    /// nothing is registered in that case. Unknown watched codes are dropped silently.
    /// If the snapshot push fails the subscription is discarded, same as in
    /// [`Self::broadcast`], and its id is still returned.
    pub fn subscribe(
        &mut self,
        store: &RateStore,
        request: SubscribeRequest,
        sink: S,
    ) -> Result<SubscriptionId> {
        if !store.contains(&request.base_currency) {
            return Err(RatesError::UnknownCurrency(request.base_currency));
        }

        let mut seen = HashSet::new();
        let mut watch = Vec::new();
        for code in request.requested_currencies {
            if !store.contains(&code) {
                debug!("Ignoring unknown currency {} in subscription", code);
                continue;
            }
            if seen.insert(code.clone()) {
                watch.push(code);
            }
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let mut subscription = Subscription {
            id,
            base_currency: request.base_currency,
            watch,
            sink,
        };
        info!(
            "New subscription {}: base={} currencies={:?}",
            id, subscription.base_currency, subscription.watch
        );

        match subscription.deliver(store, None) {
            Delivery::Failed => {
                info!("Subscription {} lost before registration completed", id);
            }
            Delivery::Sent | Delivery::Suppressed => {
                self.subscriptions.push(subscription);
                info!("Active subscriptions: {}", self.subscriptions.len());
            }
        }
        Ok(id)
    }

    /// Push the changed currencies to every subscription that watches any of them.
    ///
    /// `None` sends every subscription its whole watch set. Subscriptions whose push
    /// fails, or whose transport reports closure while they had nothing to receive, are
    /// removed; the pass continues with the rest.
    pub fn broadcast(
        &mut self,
        store: &RateStore,
        changed: Option<&HashSet<String>>,
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        self.subscriptions
            .retain_mut(|subscription| match subscription.deliver(store, changed) {
                Delivery::Sent => {
                    report.delivered += 1;
                    true
                }
                Delivery::Suppressed => {
                    report.suppressed += 1;
                    true
                }
                Delivery::Failed => {
                    report.dropped += 1;
                    false
                }
            });
        if report.dropped > 0 {
            info!(
                "Removed {} subscription(s), {} active",
                report.dropped,
                self.subscriptions.len()
            );
        }
        report
    }
}

impl<S: UpdateSink> Default for SubscriptionBroker<S> {
    fn default() -> Self {
        Self::new()
    }
}
