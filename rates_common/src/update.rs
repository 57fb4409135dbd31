//! Rate update payload streamed from the server to a subscriber.
//!
//! An update carries the converted values of the currencies that changed, in the
//! order the subscriber requested them. The server never sends an empty update.
use serde::{Deserialize, Serialize};

use crate::error::RatesError;

/// A single converted rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    /// Currency code.
    pub currency: String,
    /// Value of one unit of the subscriber's base currency in `currency`.
    pub value: f64,
}

/// Ordered batch of converted rates for one subscriber.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateUpdate {
    /// Entries in watch-set order.
    pub rates: Vec<RateEntry>,
}

impl RateUpdate {
    /// Append an entry.
    pub fn push(&mut self, currency: &str, value: f64) {
        self.rates.push(RateEntry {
            currency: String::from(currency),
            value,
        });
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns `true` when there is nothing worth sending.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Encode the update as one newline-terminated JSON frame.
    pub fn to_json_line(&self) -> Result<Vec<u8>, RatesError> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Decode a JSON frame (the trailing newline is optional).
    pub fn from_json_line(line: &str) -> Result<Self, RatesError> {
        Ok(serde_json::from_str(line.trim_end())?)
    }
}
