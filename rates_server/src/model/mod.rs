//! Domain models of the rates server.
//!
//! This module groups the core types the event loop is built from:
//! - `rate_store`: the in-memory exchange rate table.
//! - `rate_simulator`: random market movement applied on every tick.
//! - `broker`: registry of subscribers and per-subscriber fan-out.
//! - `sink`: the delivery seam between the broker and a subscriber's transport.

pub mod broker;
pub mod rate_simulator;
pub mod rate_store;
pub mod sink;
