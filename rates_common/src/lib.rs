//!
//! Common types and utilities shared by the rates server and client.
//!
//! This crate aggregates:
//! - `error`: unified error type `RatesError` used across the workspace.
//! - `result`: handy `Result<T, RatesError>` alias.
//! - `currency`: known currency codes and the default rate table.
//! - `command`: subscription request sent by a client.
//! - `update`: rate update frames streamed back to subscribers.
//! - `net`: networking constants and small helpers.
#![warn(missing_docs)]
pub mod command;
pub mod currency;
pub mod error;
pub mod net;
pub mod result;
pub mod update;

pub use command::SubscribeRequest;
pub use currency::{BASE_CURRENCY, Currency};
pub use error::RatesError;
pub use result::Result;
pub use update::{RateEntry, RateUpdate};
