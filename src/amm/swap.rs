//! Trades against a pool, and read-only quotes over live reserves.

use std::fmt::{self, Debug, Display};

use alloy::primitives::Address;
use log::debug;

use super::engine::{lock, Amm};
use super::error::AmmError;
use super::quote::{quote_in, quote_out};
use super::token::TokenId;

/// The direction of a trade relative to a pair's canonical token order.
///
/// In a pool holding `token0` and `token1`, a trade either sells `token0`
/// into the pool for `token1` or the other way around.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Sell `token0`, receive `token1`
    ZeroForOne,
    /// Sell `token1`, receive `token0`
    OneForZero,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroForOne => write!(f, "0>1"),
            Self::OneForZero => write!(f, "1>0"),
        }
    }
}

impl Amm {
    /// Sells an exact `amount_in` of `path[0]` for at least
    /// `amount_out_min` of `path[1]`, paying the output to `recipient`.
    ///
    /// The input is pulled from `caller`, the output is priced off the
    /// reserves as they stood when the operation started, and the fee
    /// configured on the engine stays in the pool for the liquidity
    /// providers. Returns the output amount.
    ///
    /// # Errors
    /// * `Expired` if `deadline` is in the past
    /// * `UnsupportedPath` unless the path has exactly two entries
    /// * `IdenticalTokens` if both path entries are the same token
    /// * `InvalidReserves` if the pool is missing or a reserve or
    ///   `amount_in` is zero
    /// * `TransferFailed` if the ledger rejects the pull or the payout
    /// * `InsufficientOutput` if the priced output is zero
    /// * `SlippageExceeded` if the priced output is below `amount_out_min`
    pub fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: u128,
        amount_out_min: u128,
        path: &[TokenId],
        caller: Address,
        recipient: Address,
        deadline: u64,
    ) -> Result<u128, AmmError> {
        self.check_deadline(deadline)?;
        let &[token_in, token_out] = path else {
            return Err(AmmError::UnsupportedPath);
        };
        let (key, pool) = self.registry().resolve(token_in, token_out)?;

        let mut pool = lock(&pool);
        let direction = if key.is_token0(token_in) {
            Direction::ZeroForOne
        } else {
            Direction::OneForZero
        };
        let (reserve_in, reserve_out) = match direction {
            Direction::ZeroForOne => (pool.reserve0(), pool.reserve1()),
            Direction::OneForZero => (pool.reserve1(), pool.reserve0()),
        };

        self.pull(token_in, caller, amount_in)?;

        // Priced off the reserves as of operation start
        let amount_out = match quote_out(amount_in, reserve_in, reserve_out, self.fee_bps()) {
            Ok(amount_out) => amount_out,
            Err(err) => {
                self.refund(token_in, caller, amount_in);
                return Err(err);
            }
        };
        if amount_out == 0 {
            self.refund(token_in, caller, amount_in);
            return Err(AmmError::InsufficientOutput);
        }
        if amount_out < amount_out_min {
            self.refund(token_in, caller, amount_in);
            return Err(AmmError::SlippageExceeded);
        }

        let snapshot = pool.snapshot_for(caller);
        if let Err(err) = pool.apply_swap(direction, amount_in, amount_out) {
            self.refund(token_in, caller, amount_in);
            return Err(err);
        }
        if let Err(err) = self.push(token_out, recipient, amount_out) {
            pool.restore(snapshot);
            self.refund(token_in, caller, amount_in);
            return Err(err);
        }

        debug!("swap {direction} in {key}: {amount_in} {token_in} -> {amount_out} {token_out}");
        Ok(amount_out)
    }

    /// Prices an exact-input trade against the pool's live reserves
    /// without executing it.
    ///
    /// # Errors
    /// * `IdenticalTokens` if both tokens are the same
    /// * `InvalidReserves` if the pool is missing, a reserve is zero, or
    ///   `amount_in` is zero
    pub fn get_amount_out(
        &self,
        amount_in: u128,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<u128, AmmError> {
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in, token_out)?;
        quote_out(amount_in, reserve_in, reserve_out, self.fee_bps())
    }

    /// Prices the input required for an exact output against the pool's
    /// live reserves without executing anything.
    ///
    /// # Errors
    /// * `IdenticalTokens` if both tokens are the same
    /// * `InvalidReserves` if the pool is missing, a reserve is zero, or
    ///   `amount_out` is zero or not below the outbound reserve
    pub fn get_amount_in(
        &self,
        amount_out: u128,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<u128, AmmError> {
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in, token_out)?;
        quote_in(amount_out, reserve_in, reserve_out, self.fee_bps())
    }

    /// Live reserves of a pair, oriented as `(reserve_in, reserve_out)`
    /// for a trade selling `token_in`.
    fn oriented_reserves(
        &self,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<(u128, u128), AmmError> {
        let (key, pool) = self.registry().get(token_in, token_out)?;
        let Some(pool) = pool else {
            return Err(AmmError::InvalidReserves);
        };
        let pool = lock(&pool);
        if key.is_token0(token_in) {
            Ok((pool.reserve0(), pool.reserve1()))
        } else {
            Ok((pool.reserve1(), pool.reserve0()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::amm::test_helpers::*;
    use crate::ledger::Ledger;
    use std::sync::Arc;

    /// Engine with a seeded 1000/2000 pool between token(1) and token(2).
    fn amm_with_pool() -> (Amm, Arc<crate::ledger::InMemoryLedger>) {
        let (amm, ledger) = funded_amm();
        amm.add_liquidity(
            token(1),
            token(2),
            1000,
            2000,
            0,
            0,
            account(1),
            account(1),
            DEADLINE,
        )
        .unwrap();
        (amm, ledger)
    }

    #[test]
    fn test_swap_moves_reserves_and_funds() {
        let (amm, ledger) = amm_with_pool();

        let amount_out = amm
            .swap_exact_tokens_for_tokens(
                100,
                0,
                &[token(1), token(2)],
                account(2),
                account(2),
                DEADLINE,
            )
            .unwrap();

        assert_eq!(amount_out, 181);
        let infos = amm.pools();
        assert_eq!(infos[0].reserve0, 1100);
        assert_eq!(infos[0].reserve1, 1819);

        assert_eq!(ledger.balance_of(token(1), account(2)), 1_000_000_000 - 100);
        assert_eq!(ledger.balance_of(token(2), account(2)), 1_000_000_000 + 181);
    }

    #[test]
    fn test_swap_reverse_direction() {
        let (amm, _) = amm_with_pool();

        let amount_out = amm
            .swap_exact_tokens_for_tokens(
                100,
                0,
                &[token(2), token(1)],
                account(2),
                account(2),
                DEADLINE,
            )
            .unwrap();

        assert_eq!(amount_out, 47);
        let infos = amm.pools();
        assert_eq!(infos[0].reserve0, 953);
        assert_eq!(infos[0].reserve1, 2100);
    }

    #[test]
    fn test_swap_raises_price_of_token_out() {
        let (amm, _) = amm_with_pool();

        let price_before = amm.get_price(token(2), token(1)).unwrap();
        amm.swap_exact_tokens_for_tokens(
            100,
            0,
            &[token(1), token(2)],
            account(2),
            account(2),
            DEADLINE,
        )
        .unwrap();
        let price_after = amm.get_price(token(2), token(1)).unwrap();

        // Buying token(2) makes it strictly more expensive in token(1)
        assert!(price_after > price_before);
    }

    #[test]
    fn test_swap_matches_read_only_quote() {
        let (amm, _) = amm_with_pool();

        let quoted = amm.get_amount_out(250, token(1), token(2)).unwrap();
        let swapped = amm
            .swap_exact_tokens_for_tokens(
                250,
                0,
                &[token(1), token(2)],
                account(2),
                account(2),
                DEADLINE,
            )
            .unwrap();
        assert_eq!(quoted, swapped);
    }

    #[test]
    fn test_get_amount_in_covers_exact_output() {
        let (amm, _) = amm_with_pool();

        let amount_in = amm.get_amount_in(181, token(1), token(2)).unwrap();
        let amount_out = amm
            .swap_exact_tokens_for_tokens(
                amount_in,
                181,
                &[token(1), token(2)],
                account(2),
                account(2),
                DEADLINE,
            )
            .unwrap();
        assert!(amount_out >= 181);
    }

    #[test]
    fn test_swap_without_fee() {
        // Fee-less engine: floor(in * r_out / (in + r_in)) with nothing
        // withheld for providers
        let (amm, _) = funded_amm_with_fee(0);
        amm.add_liquidity(
            token(1),
            token(2),
            1000,
            2000,
            0,
            0,
            account(1),
            account(1),
            DEADLINE,
        )
        .unwrap();

        let amount_out = amm
            .swap_exact_tokens_for_tokens(
                1000,
                0,
                &[token(1), token(2)],
                account(2),
                account(2),
                DEADLINE,
            )
            .unwrap();

        assert_eq!(amount_out, 1000);
        let infos = amm.pools();
        assert_eq!(infos[0].reserve0, 2000);
        assert_eq!(infos[0].reserve1, 1000);
    }

    #[test]
    fn test_swap_path_shape() {
        let (amm, _) = amm_with_pool();

        for path in [&[][..], &[token(1)][..], &[token(1), token(2), token(3)][..]] {
            assert_eq!(
                amm.swap_exact_tokens_for_tokens(100, 0, path, account(2), account(2), DEADLINE),
                Err(AmmError::UnsupportedPath)
            );
        }
        assert_eq!(
            amm.swap_exact_tokens_for_tokens(
                100,
                0,
                &[token(1), token(1)],
                account(2),
                account(2),
                DEADLINE
            ),
            Err(AmmError::IdenticalTokens)
        );
    }

    #[test]
    fn test_swap_empty_pool() {
        let (amm, _) = funded_amm();
        assert_eq!(
            amm.swap_exact_tokens_for_tokens(
                100,
                0,
                &[token(1), token(2)],
                account(2),
                account(2),
                DEADLINE
            ),
            Err(AmmError::InvalidReserves)
        );
    }

    #[test]
    fn test_swap_insufficient_output() {
        let (amm, ledger) = funded_amm();
        amm.add_liquidity(
            token(1),
            token(2),
            1_000_000,
            2,
            0,
            0,
            account(1),
            account(1),
            DEADLINE,
        )
        .unwrap();

        // One unit in cannot buy a single unit of the scarce side
        assert_eq!(
            amm.swap_exact_tokens_for_tokens(
                1,
                0,
                &[token(1), token(2)],
                account(2),
                account(2),
                DEADLINE
            ),
            Err(AmmError::InsufficientOutput)
        );
        // The pulled input was refunded
        assert_eq!(ledger.balance_of(token(1), account(2)), 1_000_000_000);
    }

    #[test]
    fn test_swap_slippage_refunds_input() {
        let (amm, ledger) = amm_with_pool();

        assert_eq!(
            amm.swap_exact_tokens_for_tokens(
                100,
                182, // quote is 181
                &[token(1), token(2)],
                account(2),
                account(2),
                DEADLINE
            ),
            Err(AmmError::SlippageExceeded)
        );
        assert_eq!(ledger.balance_of(token(1), account(2)), 1_000_000_000);
        assert_eq!(amm.pools()[0].reserve0, 1000);
    }

    #[test]
    fn test_swap_expired_leaves_state() {
        let (amm, ledger) = amm_with_pool();

        assert_eq!(
            amm.swap_exact_tokens_for_tokens(
                100,
                0,
                &[token(1), token(2)],
                account(2),
                account(2),
                NOW - 1
            ),
            Err(AmmError::Expired)
        );
        assert_eq!(amm.pools()[0].reserve0, 1000);
        assert_eq!(ledger.balance_of(token(1), account(2)), 1_000_000_000);
    }

    #[test]
    fn test_swap_rolls_back_on_failed_payout() {
        let rejecting = Arc::new(PayoutRejectingLedger::new());
        seed_accounts(&rejecting.inner, vault());
        let amm = amm_over(rejecting);
        amm.add_liquidity(
            token(1),
            token(2),
            1000,
            2000,
            0,
            0,
            account(1),
            account(1),
            DEADLINE,
        )
        .unwrap();

        assert_eq!(
            amm.swap_exact_tokens_for_tokens(
                100,
                0,
                &[token(1), token(2)],
                account(2),
                account(2),
                DEADLINE
            ),
            Err(AmmError::TransferFailed)
        );
        let infos = amm.pools();
        assert_eq!(infos[0].reserve0, 1000);
        assert_eq!(infos[0].reserve1, 2000);
    }

    #[test]
    fn test_direction_formatting() {
        assert_eq!(format!("{:?}", Direction::ZeroForOne), "0>1");
        assert_eq!(format!("{:?}", Direction::OneForZero), "1>0");
    }
}
