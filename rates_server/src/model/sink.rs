//! Delivery seam between the subscription broker and a subscriber's transport.
//!
//! The broker only needs to hand a `RateUpdate` to a subscriber and learn whether the
//! hand-off worked. Anything that can do that implements `UpdateSink`: the TCP stream
//! adapter used in production, or an in-process `crossbeam_channel::Sender`.

use crossbeam_channel::Sender;
use rates_common::{RateUpdate, RatesError, Result};

/// Outbound half of one subscriber's stream.
pub trait UpdateSink {
    /// Push one update to the subscriber.
    ///
    /// An error means the transport is gone; the broker drops the subscription and
    /// never calls `push` on this sink again.
    fn push(&mut self, update: &RateUpdate) -> Result<()>;

    /// Returns `true` once the transport has signalled closure.
    ///
    /// Checked for subscriptions that had nothing to push, so a peer that left is
    /// removed even when no push would ever fail. Sinks that cannot tell report `false`.
    fn is_closed(&mut self) -> bool {
        false
    }
}

impl UpdateSink for Sender<RateUpdate> {
    fn push(&mut self, update: &RateUpdate) -> Result<()> {
        self.send(update.clone())
            .map_err(|e| RatesError::Transport(e.to_string()))
    }
}
