//! Spot prices derived from live reserves.
//!
//! These are instantaneous ratios, nothing more: a single large trade
//! moves them, which is inherent to constant-product pricing rather than
//! a defect. Anything that needs a manipulation-resistant price has to
//! aggregate over time on top of this.

use alloy::primitives::U256;

use super::engine::{lock, Amm};
use super::error::AmmError;
use super::quote::PRICE_SCALE;
use super::token::TokenId;

impl Amm {
    /// Spot price of `token_a` in units of `token_b`, scaled by 1e18:
    /// how much `token_b` one unit of `token_a` is worth at the current
    /// reserve ratio. Read-only.
    ///
    /// # Errors
    /// * `IdenticalTokens` if both tokens are the same
    /// * `EmptyReserves` if the pool is missing or either reserve is zero
    pub fn get_price(&self, token_a: TokenId, token_b: TokenId) -> Result<U256, AmmError> {
        let (key, pool) = self.registry().get(token_a, token_b)?;
        let Some(pool) = pool else {
            return Err(AmmError::EmptyReserves);
        };

        let pool = lock(&pool);
        let (reserve_a, reserve_b) = if key.is_token0(token_a) {
            (pool.reserve0(), pool.reserve1())
        } else {
            (pool.reserve1(), pool.reserve0())
        };
        if reserve_a == 0 || reserve_b == 0 {
            return Err(AmmError::EmptyReserves);
        }

        // reserve_b * 1e18 stays well under 256 bits for 128-bit reserves
        Ok(U256::from(reserve_b) * U256::from(PRICE_SCALE) / U256::from(reserve_a))
    }
}
