//! Payment Accumulator
//!
//! Folds the stream of progress notifications into the session's running
//! total. Asset scale and code are latched from the first notification of
//! each accumulation epoch; an epoch spans from one reset-to-zero until the
//! next drain.

use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::ProgressEvent;

/// Snapshot of the accumulated session total
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedTotal {
    pub total: Decimal,
    pub asset_scale: u8,
    pub asset_code: Option<String>,
}

struct EpochState {
    total: Decimal,
    asset_scale: u8,
    asset_code: Option<String>,
    /// Set by the first notification of the epoch, cleared by a drain.
    /// Tracked explicitly so a zero-amount first notification still latches
    /// and a later zero total never re-opens the latch.
    epoch_open: bool,
}

/// Folds progress notifications into `{total, scale, code}`
pub struct Accumulator {
    state: Mutex<EpochState>,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EpochState {
                total: Decimal::ZERO,
                asset_scale: 0,
                asset_code: None,
                epoch_open: false,
            }),
        }
    }

    /// Fold one progress notification into the total
    ///
    /// The first notification after a reset latches scale and code. Every
    /// delivered amount is added; nothing is batched or coalesced.
    pub fn record(&self, event: &ProgressEvent) -> Result<()> {
        let amount = event.amount_decimal()?;

        let mut state = self.state.lock().unwrap();
        if !state.epoch_open {
            state.asset_scale = event.asset_scale;
            state.asset_code = Some(event.asset_code.clone());
            state.epoch_open = true;
            tracing::debug!(
                scale = event.asset_scale,
                code = %event.asset_code,
                "accumulation epoch opened"
            );
        }
        state.total += amount;
        tracing::debug!(amount = %amount, total = %state.total, "progress recorded");
        Ok(())
    }

    /// Current snapshot; pure query
    pub fn read(&self) -> AccumulatedTotal {
        let state = self.state.lock().unwrap();
        AccumulatedTotal {
            total: state.total,
            asset_scale: state.asset_scale,
            asset_code: state.asset_code.clone(),
        }
    }

    /// Atomically return the snapshot and zero the total, closing the epoch
    ///
    /// Scale and code persist until the next epoch opens. The caller is
    /// expected to invoke this exactly once per settlement.
    pub fn drain_and_reset(&self) -> AccumulatedTotal {
        let mut state = self.state.lock().unwrap();
        let snapshot = AccumulatedTotal {
            total: state.total,
            asset_scale: state.asset_scale,
            asset_code: state.asset_code.clone(),
        };
        state.total = Decimal::ZERO;
        state.epoch_open = false;
        tracing::info!(total = %snapshot.total, "accumulator drained");
        snapshot
    }
}
