//! Deposits into and withdrawals out of a pool.
//!
//! Two properties of this accounting model are deliberate and worth
//! calling out, because they differ from what most constant-product
//! venues do:
//!
//! * Deposits are taken exactly as given. There is no re-balancing of the
//!   deposited amounts against the current reserve ratio, so a deposit at
//!   a ratio different from the pool's shifts the implied price.
//! * Shares are minted additively, `amount_a + amount_b`, rather than by
//!   geometric mean. A depositor at a skewed ratio is over- or
//!   under-credited relative to the pool's value. Changing either formula
//!   is a product decision, not a refactor.

use alloy::primitives::{Address, U256};
use log::debug;

use super::engine::{lock, Amm};
use super::error::AmmError;
use super::token::TokenId;

impl Amm {
    /// Deposits a pair of amounts into the pool for `(token_a, token_b)`
    /// and mints liquidity shares to `recipient`.
    ///
    /// Pulls both desired amounts from `caller` (who must have granted the
    /// vault an allowance), then credits reserves and shares in one step.
    /// Returns `(amount_a, amount_b, shares_minted)`.
    ///
    /// # Errors
    /// * `Expired` if `deadline` is in the past
    /// * `IdenticalTokens` if both tokens are the same
    /// * `InvalidReserves` if either desired amount is zero, or minting
    ///   would overflow
    /// * `TransferFailed` if the ledger rejects a pull
    /// * `SlippageExceeded` if a deposited amount is below its minimum
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        token_a: TokenId,
        token_b: TokenId,
        amount_a_desired: u128,
        amount_b_desired: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        caller: Address,
        recipient: Address,
        deadline: u64,
    ) -> Result<(u128, u128, u128), AmmError> {
        self.check_deadline(deadline)?;
        let (key, pool) = self.registry().resolve(token_a, token_b)?;

        // A one-sided deposit could leave shares outstanding against an
        // empty reserve; both sides must be positive
        if amount_a_desired == 0 || amount_b_desired == 0 {
            return Err(AmmError::InvalidReserves);
        }

        self.pull(token_a, caller, amount_a_desired)?;
        if let Err(err) = self.pull(token_b, caller, amount_b_desired) {
            self.refund(token_a, caller, amount_a_desired);
            return Err(err);
        }

        // Deposited amounts are the desired amounts as given; no
        // re-balancing against the current reserve ratio
        let (amount_a, amount_b) = (amount_a_desired, amount_b_desired);
        if amount_a < amount_a_min || amount_b < amount_b_min {
            self.refund(token_a, caller, amount_a);
            self.refund(token_b, caller, amount_b);
            return Err(AmmError::SlippageExceeded);
        }

        // Additive share minting
        let Some(shares_minted) = amount_a.checked_add(amount_b) else {
            self.refund(token_a, caller, amount_a);
            self.refund(token_b, caller, amount_b);
            return Err(AmmError::InvalidReserves);
        };

        let (amount0, amount1) = if key.is_token0(token_a) {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };

        let mut pool = lock(&pool);
        if let Err(err) = pool.credit(amount0, amount1, recipient, shares_minted) {
            drop(pool);
            self.refund(token_a, caller, amount_a);
            self.refund(token_b, caller, amount_b);
            return Err(err);
        }

        debug!(
            "minted {shares_minted} shares in {key} for {recipient}: +{amount_a} {token_a}, +{amount_b} {token_b}"
        );
        Ok((amount_a, amount_b, shares_minted))
    }

    /// Burns `share_amount` of `caller`'s liquidity shares in the pool for
    /// `(token_a, token_b)` and pays out the proportional slice of both
    /// reserves to `recipient`.
    ///
    /// Payout amounts use floor division; the fractional remainder stays
    /// in the pool. The share burn and the ledger payouts form one atomic
    /// unit: if the ledger rejects a payout, the pool is restored to its
    /// pre-call state. Returns `(amount_a, amount_b)`.
    ///
    /// # Errors
    /// * `Expired` if `deadline` is in the past
    /// * `IdenticalTokens` if both tokens are the same
    /// * `InsufficientLiquidity` if `caller` holds fewer than
    ///   `share_amount` shares (a missing or drained pool included)
    /// * `SlippageExceeded` if a computed amount is below its minimum
    /// * `TransferFailed` if the ledger rejects a payout
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        token_a: TokenId,
        token_b: TokenId,
        share_amount: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        caller: Address,
        recipient: Address,
        deadline: u64,
    ) -> Result<(u128, u128), AmmError> {
        self.check_deadline(deadline)?;
        let (key, pool) = self.registry().get(token_a, token_b)?;
        let pool = pool.ok_or(AmmError::InsufficientLiquidity)?;

        let mut pool = lock(&pool);
        let total_shares = pool.total_shares();
        if total_shares == 0 || pool.share_of(caller) < share_amount {
            return Err(AmmError::InsufficientLiquidity);
        }

        let amount0 = proportional(pool.reserve0(), share_amount, total_shares);
        let amount1 = proportional(pool.reserve1(), share_amount, total_shares);

        let (amount_a, amount_b) = if key.is_token0(token_a) {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < amount_a_min || amount_b < amount_b_min {
            return Err(AmmError::SlippageExceeded);
        }

        let snapshot = pool.snapshot_for(caller);
        pool.debit(amount0, amount1, caller, share_amount)?;

        // The burn above and the payouts below are one atomic unit; a
        // rejected payout restores the pre-call pool state
        if let Err(err) = self.push(token_a, recipient, amount_a) {
            pool.restore(snapshot);
            return Err(err);
        }
        if let Err(err) = self.push(token_b, recipient, amount_b) {
            pool.restore(snapshot);
            // The first payout already landed; reclaim it from the
            // recipient so ledger and pool state stay aligned
            if !self.ledger().transfer(token_a, recipient, self.vault(), amount_a) {
                log::error!(
                    "could not reclaim {amount_a} {token_a} from {recipient} after failed payout"
                );
            }
            return Err(err);
        }

        debug!(
            "burned {share_amount} shares in {key} for {caller}: -{amount_a} {token_a}, -{amount_b} {token_b}"
        );
        Ok((amount_a, amount_b))
    }
}

/// Floor of `reserve * share_amount / total_shares`, computed in 256-bit
/// integers. `total_shares` must be positive.
fn proportional(reserve: u128, share_amount: u128, total_shares: u128) -> u128 {
    let scaled = U256::from(reserve) * U256::from(share_amount) / U256::from(total_shares);
    // The quotient never exceeds `reserve`, so the narrowing cannot fail
    u128::try_from(scaled).unwrap_or(u128::MAX)
}
