//! Error types shared between client and server.
//!
//! The `RatesError` enum unifies I/O, serialization, channel communication and the
//! domain failures of the rate feed (unknown currency codes, attempts to move the
//! base currency, broken subscriber transports), allowing every crate in the
//! workspace to propagate a single error type.
use std::io;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum RatesError {
    /// I/O error originating from the standard library or sockets.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Crossbeam/channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Currency code outside the seeded rate table.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// The base currency's rate is pinned to 1.0 and cannot be changed.
    #[error("Base currency rate is immutable: {0}")]
    BaseCurrencyImmutable(String),

    /// A subscriber's transport refused a push.
    #[error("Transport failure: {0}")]
    Transport(String),
}
