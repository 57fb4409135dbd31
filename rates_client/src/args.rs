//! Command-line arguments for the Rates Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use rates_common::Currency;
use rates_common::net::SUBSCRIBE_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Server IP address (IPv4 or IPv6) where the rates service is running.
    #[clap(long)]
    pub server_ip: String,

    /// Server subscription port.
    #[clap(long, default_value_t = SUBSCRIBE_PORT)]
    pub port: u16,

    /// Currency the received rates are expressed against.
    #[clap(long, value_enum, ignore_case = true, default_value_t = Currency::EUR)]
    pub base: Currency,

    /// Currencies to watch, separated by commas.
    #[clap(long, value_enum, ignore_case = true, value_delimiter = ',', required = true)]
    pub currencies: Vec<Currency>,

    /// Seconds to wait before reconnecting after the stream drops.
    #[clap(long, default_value_t = 5)]
    pub retry_secs: u64,
}
