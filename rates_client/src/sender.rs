//! Sending the subscription request to the rates server.
//!
//! This module provides a small helper for encoding and sending a `SubscribeRequest`
//! on a freshly opened connection.
use log::info;
use rates_common::{RatesError, SubscribeRequest};
use std::io::Write;
use std::net::TcpStream;

/// Helper type for sending commands to the server.
pub struct CommandSender;

impl CommandSender {
    /// Write the subscription request as one JSON line.
    pub fn send_subscription(
        stream: &mut TcpStream,
        request: &SubscribeRequest,
    ) -> Result<(), RatesError> {
        let line = request.to_json_line()?;
        info!(
            "Sending subscription: base={} currencies={}",
            request.base_currency,
            request.requested_currencies.join(",")
        );
        stream.write_all(&line)?;
        stream.flush()?;
        Ok(())
    }
}
