//! Exchange rates streaming server.
//!
//! Clients open a TCP connection, send one JSON subscription request and then receive
//! a stream of rate updates on the same connection. Internally the binary wires
//! together three building blocks:
//!
//! - `SubscriptionReceiver`: accepts connections on a background thread, decodes the
//!   subscription request and hands the request plus the connection to the event loop.
//! - `RatesServer`: single-threaded event loop owning the `RateStore` and the
//!   `SubscriptionBroker`. It multiplexes new subscriptions and simulation ticks with
//!   crossbeam `select!`, so state is never touched from two threads.
//! - `RateSimulator`: moves a random subset of rates on every tick; the broker then
//!   pushes each subscriber the changed currencies it watches, converted to the
//!   subscriber's base currency.
//!
//! Network protocol (high-level):
//! - Bind address: `0.0.0.0:50051` by default (see `net::SUBSCRIBE_PORT`).
//! - Client sends `{"baseCurrency":"EUR","requestedCurrencies":["USD","GBP"]}\n`.
//! - Server answers with newline-delimited `{"rates":[{"currency":"USD","value":1.1155}]}`
//!   frames: a full snapshot first, then only the currencies that changed.
//! - A subscriber whose connection fails is dropped on the next push, or on the next
//!   tick that has nothing for it once its peer has closed the connection.
#![warn(missing_docs)]
use crate::args::Args;
use crate::model::rate_simulator::RateSimulator;
use crate::model::rate_store::RateStore;
use crate::receiver::{Subscription, SubscriptionReceiver};
use crate::server::RatesServer;
use crate::transport::TcpSink;
use clap::Parser;
use crossbeam_channel::{tick, unbounded};
use log::{error, info};
use rates_common::net::addr;
use rates_common::{RatesError, Result};
use std::thread;
use std::time::Duration;

mod args;
pub mod model;
mod receiver;
mod server;
mod transport;

fn main() -> Result<(), RatesError> {
    init_logger();
    let args = Args::parse();
    if args.interval_ms == 0 {
        return Err(RatesError::Format(String::from(
            "tick interval must be greater than zero",
        )));
    }
    let simulator = RateSimulator::new(args.probability, args.max_change)?;

    let store = RateStore::default();
    info!(
        "Rate table seeded with {} currencies, base {}",
        store.len(),
        store.base_currency()
    );

    let receiver = SubscriptionReceiver::new(
        &addr(&args.host, args.port),
        Duration::from_millis(args.handshake_timeout_ms),
        Duration::from_millis(args.write_timeout_ms),
    )?;
    info!("Server has been bound to {}", receiver.local_addr()?);

    let (incoming_tx, incoming_rx) = unbounded::<Subscription>();
    thread::spawn(move || {
        if let Err(e) = receiver.receive_loop_with_channel(incoming_tx) {
            error!("Receiver loop failed: {:?}", e);
        }
    });

    info!(
        "Simulating changes every {} ms (probability {}, max change {})",
        args.interval_ms,
        simulator.probability(),
        simulator.max_change()
    );
    let ticks = tick(Duration::from_millis(args.interval_ms));
    RatesServer::<TcpSink>::new(store, simulator).run(ticks, incoming_rx)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
