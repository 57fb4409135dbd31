//! Auto-updated exchange rates table.
//!
//! The table starts empty and is filled from the server's update frames; a rate is only
//! available once the server has sent it at least once.
use chrono::{DateTime, Utc};
use log::debug;
use rates_common::{Currency, RateUpdate, RatesError, Result};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: f64,
    updated_at: DateTime<Utc>,
}

/// Latest known rates, expressed against the subscription's base currency.
#[derive(Debug)]
pub struct ExchangeRates {
    base_currency: Currency,
    requested_currencies: Vec<Currency>,
    rates: HashMap<Currency, Entry>,
}

impl ExchangeRates {
    /// Creates an empty table for the given subscription.
    pub fn new(base_currency: Currency, requested_currencies: Vec<Currency>) -> Self {
        Self {
            base_currency,
            requested_currencies,
            rates: HashMap::new(),
        }
    }

    /// Currency the values are expressed against.
    pub fn base_currency(&self) -> Currency {
        self.base_currency
    }

    /// Currencies this table subscribes to.
    pub fn requested_currencies(&self) -> &[Currency] {
        &self.requested_currencies
    }

    /// Checks if a rate for `currency` is available.
    pub fn contains(&self, currency: Currency) -> bool {
        self.rates.contains_key(&currency)
    }

    /// Returns the rate for `currency`, or `UnknownCurrency` if none was received yet.
    pub fn get(&self, currency: Currency) -> Result<f64> {
        self.rates
            .get(&currency)
            .map(|entry| entry.value)
            .ok_or_else(|| RatesError::UnknownCurrency(currency.code()))
    }

    /// When the rate for `currency` was last updated.
    pub fn last_updated(&self, currency: Currency) -> Option<DateTime<Utc>> {
        self.rates.get(&currency).map(|entry| entry.updated_at)
    }

    /// One-line view of the requested currencies, e.g.
    /// `1 EUR = USD 1.11550 (12:00:05), GBP n/a`.
    pub fn summary(&self) -> String {
        let columns: Vec<String> = self
            .requested_currencies
            .iter()
            .map(|&currency| {
                if !self.contains(currency) {
                    return format!("{} n/a", currency);
                }
                match (self.get(currency), self.last_updated(currency)) {
                    (Ok(value), Some(at)) => {
                        format!("{} {:.5} ({})", currency, value, at.format("%H:%M:%S"))
                    }
                    _ => format!("{} n/a", currency),
                }
            })
            .collect();
        format!("1 {} = {}", self.base_currency, columns.join(", "))
    }

    /// Store every rate carried by `update`; returns how many were applied.
    pub fn apply(&mut self, update: &RateUpdate) -> usize {
        let now = Utc::now();
        let mut applied = 0;
        for rate in &update.rates {
            match Currency::from_str(&rate.currency) {
                Ok(currency) => {
                    self.rates.insert(
                        currency,
                        Entry {
                            value: rate.value,
                            updated_at: now,
                        },
                    );
                    debug!(
                        "Exchange rate updated: 1 {} = {:.5} {}",
                        self.base_currency, rate.value, currency
                    );
                    applied += 1;
                }
                Err(_) => debug!("Skipping rate for unsupported currency {}", rate.currency),
            }
        }
        applied
    }
}
