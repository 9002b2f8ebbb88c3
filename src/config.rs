//! Configuration management for the engine and the CLI simulator.

use std::env;

use log::warn;

use crate::amm::quote::{DEFAULT_FEE_BPS, MAX_FEE_BPS};

/// Runtime configuration sourced from the environment (and a `.env` file
/// when present).
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Swap fee in basis points
    pub fee_bps: u16,
}

impl Config {
    /// Reads the configuration from the environment.
    ///
    /// `EDDY_FEE_BPS` sets the swap fee in basis points; `0` selects the
    /// fee-less pricing variant. Values above the maximum are clamped.
    #[must_use]
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let fee_bps = env::var("EDDY_FEE_BPS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_FEE_BPS);
        let fee_bps = if fee_bps > MAX_FEE_BPS {
            warn!("EDDY_FEE_BPS {fee_bps} above maximum, clamping to {MAX_FEE_BPS}");
            MAX_FEE_BPS
        } else {
            fee_bps
        };

        Self { fee_bps }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS,
        }
    }
}
