//! Event loop owning the rate table and the subscription registry.
//!
//! Everything that reads or mutates shared state goes through one `RatesServer` value
//! driven by a single thread, so a broadcast never observes a half-applied tick and a
//! new subscriber's snapshot is always sent before any tick update reaches it.

use crate::model::broker::{SubscriptionBroker, SubscriptionId};
use crate::model::rate_simulator::RateSimulator;
use crate::model::rate_store::RateStore;
use crate::model::sink::UpdateSink;
use crossbeam_channel::{Receiver, select};
use log::{debug, info, warn};
use rand::Rng;
use rates_common::{RatesError, Result, SubscribeRequest};
use std::time::Instant;

/// Rate table, subscribers and the simulator that moves the rates.
pub struct RatesServer<S: UpdateSink> {
    store: RateStore,
    broker: SubscriptionBroker<S>,
    simulator: RateSimulator,
}

impl<S: UpdateSink> RatesServer<S> {
    /// Create a server over `store` with no subscribers.
    pub fn new(store: RateStore, simulator: RateSimulator) -> Self {
        Self {
            store,
            broker: SubscriptionBroker::new(),
            simulator,
        }
    }

    /// Current rate table.
    #[cfg(test)]
    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Active subscriptions.
    #[cfg(test)]
    pub fn broker(&self) -> &SubscriptionBroker<S> {
        &self.broker
    }

    /// Register a new subscriber; see [`SubscriptionBroker::subscribe`].
    pub fn handle_subscription(
        &mut self,
        request: SubscribeRequest,
        sink: S,
    ) -> Result<SubscriptionId> {
        self.broker.subscribe(&self.store, request, sink)
    }

    /// Move the rates once and push what changed to every subscriber.
    pub fn handle_tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let changed = self.simulator.simulate(&mut self.store, rng)?;
        let report = self.broker.broadcast(&self.store, Some(&changed));
        debug!(
            "Tick: {} changed, {} delivered, {} suppressed, {} dropped",
            changed.len(),
            report.delivered,
            report.suppressed,
            report.dropped
        );
        Ok(())
    }

    /// Serve until the subscription channel closes.
    ///
    /// `ticks` drives the simulator (typically `crossbeam_channel::tick`), `incoming`
    /// delivers subscriptions accepted by the transport layer.
    pub fn run(
        mut self,
        ticks: Receiver<Instant>,
        incoming: Receiver<(SubscribeRequest, S)>,
    ) -> Result<()> {
        let mut rng = rand::rng();
        info!("Rates server event loop started");

        loop {
            select! {
                recv(ticks) -> tick => match tick {
                    Ok(_) => self.handle_tick(&mut rng)?,
                    Err(e) => return Err(RatesError::ChannelRecv(e.to_string())),
                },
                recv(incoming) -> msg => match msg {
                    Ok((request, sink)) => {
                        if let Err(e) = self.handle_subscription(request, sink) {
                            warn!("Subscription rejected: {}", e);
                        }
                    }
                    Err(_) => {
                        info!("Subscription channel closed, stopping event loop");
                        return Ok(());
                    }
                },
            }
        }
    }
}
