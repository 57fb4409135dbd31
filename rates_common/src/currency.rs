//! Currency codes and the default rate table shared between client and server.
//!
//! The set of known currencies is closed: the server seeds its rate table from
//! [`default_rates`] at startup and never registers new codes afterwards. Rates are
//! expressed as the value of one unit of [`BASE_CURRENCY`] in the given currency.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Reference currency of the rate table; its rate is always exactly 1.0.
pub const BASE_CURRENCY: Currency = Currency::EUR;

/// Set of supported currency codes.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
)]
#[value(rename_all = "verbatim")]
#[strum(ascii_case_insensitive)]
pub enum Currency {
    EUR,
    USD,
    GBP,
    PLN,
}

impl Currency {
    /// Initial rate of this currency against [`BASE_CURRENCY`].
    pub fn default_rate(self) -> f64 {
        match self {
            Currency::EUR => 1.0000,
            Currency::USD => 1.1155,
            Currency::GBP => 0.85785,
            Currency::PLN => 4.2853,
        }
    }

    /// Three-letter code as sent on the wire.
    pub fn code(self) -> String {
        self.to_string()
    }
}

/// Default `(code, rate)` table every server starts from.
pub fn default_rates() -> Vec<(String, f64)> {
    Currency::iter()
        .map(|currency| (currency.code(), currency.default_rate()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_base_currency_rate_is_one() {
        assert_eq!(BASE_CURRENCY.default_rate(), 1.0);
    }

    #[test]
    fn test_default_table_covers_every_currency() {
        let rates = default_rates();
        assert_eq!(rates.len(), Currency::iter().count());
        assert!(rates.contains(&("USD".to_string(), 1.1155)));
        assert!(rates.iter().all(|(_, rate)| *rate > 0.0));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(<Currency as FromStr>::from_str("gbp").unwrap(), Currency::GBP);
        assert_eq!(<Currency as FromStr>::from_str("PLN").unwrap(), Currency::PLN);
        assert!(<Currency as FromStr>::from_str("JPY").is_err());
    }

    #[test]
    fn test_code_matches_display() {
        assert_eq!(Currency::USD.code(), "USD");
    }
}
