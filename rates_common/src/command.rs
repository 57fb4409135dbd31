//! Subscription command sent by a client when it opens a stream.
//!
//! The command travels as a single line of JSON over the subscription TCP
//! connection; every frame that follows on that connection flows server to client.
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::error::RatesError;

/// Subscription request: which currency to express rates in and which rates to stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    /// Currency the subscriber wants values expressed against.
    pub base_currency: String,
    /// Currency codes to stream; unknown codes are ignored by the server.
    #[serde(default)]
    pub requested_currencies: Vec<String>,
}

impl SubscribeRequest {
    /// Creates a request from raw currency codes.
    pub fn new(base_currency: &str, requested_currencies: &[&str]) -> Self {
        SubscribeRequest {
            base_currency: String::from(base_currency),
            requested_currencies: requested_currencies.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Creates a request from known currencies.
    pub fn for_currencies(base_currency: Currency, requested_currencies: &[Currency]) -> Self {
        SubscribeRequest {
            base_currency: base_currency.code(),
            requested_currencies: requested_currencies.iter().map(|c| c.code()).collect(),
        }
    }

    /// Encode as one newline-terminated JSON line.
    pub fn to_json_line(&self) -> Result<Vec<u8>, RatesError> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Decode from a JSON line (the trailing newline is optional).
    pub fn from_json_line(line: &str) -> Result<Self, RatesError> {
        Ok(serde_json::from_str(line.trim_end())?)
    }
}
