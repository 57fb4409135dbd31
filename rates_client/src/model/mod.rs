//! Data model types kept by the rates client.
//!
//! - `exchange_rates`: local table updated from the server's stream.
pub mod exchange_rates;
