//! Random market movement for the rate table.
//!
//! On every tick each non-base currency moves with probability `probability` by a
//! delta drawn uniformly from `[-max_change, +max_change]`. The codes that moved are
//! returned so the broker can fan out only what changed.

use crate::model::rate_store::RateStore;
use log::info;
use rand::Rng;
use rates_common::{RatesError, Result};
use std::collections::HashSet;

/// Tick parameters of the rate random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSimulator {
    probability: f64,
    max_change: f64,
}

impl RateSimulator {
    /// Create a simulator; `probability` must lie in `[0, 1]` and `max_change` must be
    /// a finite, non-negative number.
    pub fn new(probability: f64, max_change: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(RatesError::Format(format!(
                "change probability must be within [0, 1], got {}",
                probability
            )));
        }
        if !max_change.is_finite() || max_change < 0.0 {
            return Err(RatesError::Format(format!(
                "max change must be a non-negative number, got {}",
                max_change
            )));
        }
        Ok(Self {
            probability,
            max_change,
        })
    }

    /// Probability that a single currency moves on a tick.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Largest absolute move per tick.
    pub fn max_change(&self) -> f64 {
        self.max_change
    }

    /// Run one tick against `store` and return the codes that changed.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        store: &mut RateStore,
        rng: &mut R,
    ) -> Result<HashSet<String>> {
        let candidates: Vec<String> = store
            .codes()
            .filter(|code| *code != store.base_currency())
            .map(String::from)
            .collect();

        let mut changed = HashSet::new();
        for code in candidates {
            if rng.random::<f64>() >= self.probability {
                continue;
            }
            let delta = self.max_change * (rng.random::<f64>() * 2.0 - 1.0);
            let rate = store.apply_change(&code, delta)?;
            info!(
                "Rate changed: {} {} ({}{})",
                code,
                rate,
                if delta < 0.0 { "" } else { "+" },
                delta
            );
            changed.insert(code);
        }
        Ok(changed)
    }
}
