//! In-memory exchange rate table.
//!
//! A `RateStore` maps currency codes to the value of one unit of the base currency in
//! that currency. The set of codes is fixed when the store is built; mutations only
//! move existing rates and never touch the base currency, whose rate stays at 1.0.
//! Conversion factors are computed from the current values on every call.

use rates_common::currency::{BASE_CURRENCY, default_rates};
use rates_common::{RatesError, Result};
use std::collections::BTreeMap;

/// Current rates of every known currency against the base currency.
#[derive(Debug, Clone)]
pub struct RateStore {
    base: String,
    rates: BTreeMap<String, f64>,
}

impl RateStore {
    /// Build a store from an explicit `(code, rate)` table.
    ///
    /// The table must contain `base` at exactly 1.0 and every rate must be positive.
    pub fn with_rates<I>(base: &str, table: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let rates: BTreeMap<String, f64> = table.into_iter().collect();

        match rates.get(base) {
            Some(rate) if *rate == 1.0 => {}
            Some(rate) => {
                return Err(RatesError::Format(format!(
                    "base currency {} must have rate 1.0, got {}",
                    base, rate
                )));
            }
            None => {
                return Err(RatesError::Format(format!(
                    "base currency {} missing from rate table",
                    base
                )));
            }
        }
        if let Some((code, rate)) = rates.iter().find(|(_, rate)| rate.is_nan() || **rate <= 0.0) {
            return Err(RatesError::Format(format!(
                "rate for {} must be positive, got {}",
                code, rate
            )));
        }

        Ok(Self {
            base: String::from(base),
            rates,
        })
    }

    /// The reference currency of the table.
    pub fn base_currency(&self) -> &str {
        &self.base
    }

    /// Returns `true` if `code` is one of the seeded currencies.
    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Known currency codes in a stable order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    /// Number of known currencies.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns `true` if the table holds no currencies.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Current rate of `code` against the base currency.
    pub fn get(&self, code: &str) -> Result<f64> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| RatesError::UnknownCurrency(String::from(code)))
    }

    /// Add `delta` to the rate of `code` and return the new rate.
    ///
    /// No clamping is applied; the driver bounds the delta magnitude.
    pub fn apply_change(&mut self, code: &str, delta: f64) -> Result<f64> {
        if code == self.base {
            return Err(RatesError::BaseCurrencyImmutable(String::from(code)));
        }
        let rate = self
            .rates
            .get_mut(code)
            .ok_or_else(|| RatesError::UnknownCurrency(String::from(code)))?;
        *rate += delta;
        Ok(*rate)
    }

    /// Factor converting an amount in `from` into `to`.
    pub fn conversion_factor(&self, from: &str, to: &str) -> Result<f64> {
        Ok(self.get(to)? / self.get(from)?)
    }

    /// Value of one unit of `subscriber_base` expressed in `code`.
    ///
    /// Pivots through the table's base currency: `rate(base) / rate(subscriber_base) * rate(code)`.
    /// The result is not finite once `subscriber_base` has drifted to zero.
    pub fn convert(&self, subscriber_base: &str, code: &str) -> Result<f64> {
        Ok(self.get(&self.base)? / self.get(subscriber_base)? * self.get(code)?)
    }
}

impl Default for RateStore {
    fn default() -> Self {
        Self {
            base: BASE_CURRENCY.code(),
            rates: default_rates().into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn eur_usd() -> RateStore {
        RateStore::with_rates(
            "EUR",
            vec![("EUR".to_string(), 1.0), ("USD".to_string(), 1.1155)],
        )
        .unwrap()
    }

    #[test]
    fn test_default_store_is_seeded() {
        let store = RateStore::default();
        assert_eq!(store.base_currency(), "EUR");
        assert_eq!(store.len(), 4);
        assert_eq!(store.get("EUR").unwrap(), 1.0);
        assert_eq!(store.get("PLN").unwrap(), 4.2853);
        assert_eq!(store.codes().collect::<Vec<_>>(), vec!["EUR", "GBP", "PLN", "USD"]);
    }

    #[test]
    fn test_get_unknown_currency_fails() {
        let store = RateStore::default();
        assert!(matches!(
            store.get("JPY"),
            Err(RatesError::UnknownCurrency(code)) if code == "JPY"
        ));
    }

    #[test]
    fn test_apply_change_adds_delta() {
        let mut store = eur_usd();
        let rate = store.apply_change("USD", 0.1).unwrap();
        assert!((rate - 1.2155).abs() < 1e-12);
        assert_eq!(store.get("USD").unwrap(), rate);
    }

    #[test]
    fn test_apply_change_does_not_clamp() {
        let mut store = eur_usd();
        let rate = store.apply_change("USD", -2.0).unwrap();
        assert!(rate < 0.0);
    }

    #[test]
    fn test_base_currency_is_immutable() {
        let mut store = RateStore::default();
        assert!(matches!(
            store.apply_change("EUR", 0.5),
            Err(RatesError::BaseCurrencyImmutable(_))
        ));
        assert_eq!(store.get("EUR").unwrap(), 1.0);
    }

    #[test]
    fn test_apply_change_unknown_currency_leaves_state() {
        let mut store = RateStore::default();
        let before: Vec<f64> = store.codes().map(|c| store.get(c).unwrap()).collect();
        assert!(matches!(
            store.apply_change("CHF", 0.5),
            Err(RatesError::UnknownCurrency(_))
        ));
        let after: Vec<f64> = store.codes().map(|c| store.get(c).unwrap()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_conversion_factor() {
        let store = RateStore::default();
        let factor = store.conversion_factor("USD", "PLN").unwrap();
        assert!((factor - 4.2853 / 1.1155).abs() < 1e-12);
        assert!(store.conversion_factor("USD", "XXX").is_err());
    }

    #[test]
    fn test_convert_pivots_through_base() {
        let store = RateStore::default();
        assert_eq!(store.convert("EUR", "USD").unwrap(), 1.1155);
        let value = store.convert("GBP", "USD").unwrap();
        assert!((value - 1.1155 / 0.85785).abs() < 1e-12);
    }

    #[test]
    fn test_with_rates_validates_table() {
        assert!(RateStore::with_rates("EUR", vec![("USD".to_string(), 1.1)]).is_err());
        assert!(RateStore::with_rates("EUR", vec![("EUR".to_string(), 2.0)]).is_err());
        assert!(
            RateStore::with_rates(
                "EUR",
                vec![("EUR".to_string(), 1.0), ("USD".to_string(), 0.0)]
            )
            .is_err()
        );
    }

    proptest! {
        #[test]
        fn prop_base_rate_stays_one(
            changes in proptest::collection::vec((0usize..3, -0.2f64..0.2), 0..64)
        ) {
            let mut store = RateStore::default();
            let movable = ["USD", "GBP", "PLN"];
            for (index, delta) in changes {
                store.apply_change(movable[index], delta).unwrap();
            }
            prop_assert_eq!(store.get("EUR").unwrap(), 1.0);
        }

        #[test]
        fn prop_self_conversion_is_identity(
            changes in proptest::collection::vec((0usize..3, -0.2f64..0.2), 0..64),
            pick in 0usize..4
        ) {
            let mut store = RateStore::default();
            let movable = ["USD", "GBP", "PLN"];
            for (index, delta) in changes {
                store.apply_change(movable[index], delta).unwrap();
            }
            let code = ["EUR", "USD", "GBP", "PLN"][pick];
            prop_assert_eq!(store.conversion_factor(code, code).unwrap(), 1.0);
        }
    }
}
