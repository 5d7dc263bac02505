// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FX rate source.
//!
//! The live USD to NGN rate is an external collaborator behind a trait so
//! the engine and its tests can substitute fixed rates. The engine always
//! caps whatever a source returns before pricing with it.

use async_trait::async_trait;

use numio_core::NumioError;

/// Source of the current USD to NGN exchange rate.
#[async_trait]
pub trait FxRateSource: Send + Sync {
    /// Returns the current rate in NGN per USD.
    async fn usd_to_ngn(&self) -> Result<f64, NumioError>;
}

/// Fixed-rate source, configured with `pricing.fx_rate_fallback`.
///
/// Stands in until a live feed is integrated; swapping one in only
/// touches the wiring, not the engine.
#[derive(Debug, Clone, Copy)]
pub struct StaticFxRate {
    rate: f64,
}

impl StaticFxRate {
    /// Creates a source that always reports `rate`.
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl FxRateSource for StaticFxRate {
    async fn usd_to_ngn(&self) -> Result<f64, NumioError> {
        Ok(self.rate)
    }
}
