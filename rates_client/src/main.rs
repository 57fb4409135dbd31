//! Rates Client: subscribes to the exchange rates server and keeps a local, auto-updated
//! rates table. It sends one subscription request naming the base currency and the
//! currencies to watch, then logs the refreshed table after every update it receives.
//! When the stream drops it reconnects after a pause until Ctrl+C is pressed.
//!
//! Usage example (CLI):
//! ```bash
//! rates_client --server-ip 127.0.0.1 --base EUR --currencies USD,GBP,PLN
//! ```
#![warn(missing_docs)]
mod args;
mod model;
mod sender;

use crate::args::Args;
use crate::model::exchange_rates::ExchangeRates;
use crate::sender::CommandSender;
use clap::Parser;
use log::{info, warn};
use rates_common::net::addr;
use rates_common::{RateUpdate, RatesError, Result, SubscribeRequest};
use std::io::{BufRead, BufReader, ErrorKind};
use std::net::TcpStream;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

/// How often blocking reads wake up to check for shutdown.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Opens one subscription and applies incoming updates to `rates` until the server
/// closes the stream, an I/O error occurs, or `shutdown` is set.
fn stream_updates(
    server_address: &str,
    rates: &mut ExchangeRates,
    shutdown: &AtomicBool,
) -> Result<(), RatesError> {
    let mut stream = TcpStream::connect(server_address)?;
    info!("Connected to rates server at {}", server_address);

    let request =
        SubscribeRequest::for_currencies(rates.base_currency(), rates.requested_currencies());
    CommandSender::send_subscription(&mut stream, &request)?;
    stream.set_read_timeout(Some(POLL_INTERVAL))?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    while !shutdown.load(Ordering::Relaxed) {
        match reader.read_line(&mut line) {
            Ok(0) => {
                return Err(RatesError::Format(String::from(
                    "server closed the stream",
                )));
            }
            Ok(_) => {
                match RateUpdate::from_json_line(&line) {
                    Ok(update) => {
                        if rates.apply(&update) > 0 {
                            info!("Exchange rates: {}", rates.summary());
                        }
                    }
                    Err(e) => warn!("Received malformed frame {:?}: {}", line.trim_end(), e),
                }
                line.clear();
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                continue;
            }
            Err(e) => return Err(RatesError::Io(e)),
        }
    }
    Ok(())
}

/// Sleep for `pause`, waking early if `shutdown` is set.
fn wait_before_retry(pause: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + pause;
    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn main() -> Result<(), RatesError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| RatesError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let server_ip = args.server_ip.trim().replace('"', "");
    let server_address = addr(&server_ip, args.port);
    let retry = Duration::from_secs(args.retry_secs);
    let mut rates = ExchangeRates::new(args.base, args.currencies);

    info!("Client is running. Press Ctrl+C to exit.");
    while !shutdown.load(Ordering::Relaxed) {
        if let Err(e) = stream_updates(&server_address, &mut rates, &shutdown) {
            warn!("Lost connection to exchange rates server: {}", e);
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            info!("Reconnecting in {} seconds...", retry.as_secs());
            wait_before_retry(retry, &shutdown);
        }
    }
    info!("Client stopped");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
