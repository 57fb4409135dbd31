//! Command-line arguments for the Rates Server.
use clap::Parser;
use rates_common::net::SUBSCRIBE_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to bind the subscription listener to.
    #[clap(long, default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port to accept subscriptions on.
    #[clap(short, long, default_value_t = SUBSCRIBE_PORT)]
    pub port: u16,

    /// Milliseconds between simulated rate changes.
    #[clap(long, default_value_t = 5000)]
    pub interval_ms: u64,

    /// Probability that a single currency moves on a tick, within [0, 1].
    #[clap(long, default_value_t = 0.3)]
    pub probability: f64,

    /// Largest absolute change of a rate per tick.
    #[clap(long, default_value_t = 0.2)]
    pub max_change: f64,

    /// Milliseconds a client may take to send its subscription request.
    #[clap(long, default_value_t = 5000)]
    pub handshake_timeout_ms: u64,

    /// Milliseconds a push may block before the subscriber is considered gone.
    #[clap(long, default_value_t = 1000)]
    pub write_timeout_ms: u64,
}
