use std::collections::HashMap;

use alloy::primitives::Address;
use serde::Serialize;

use super::error::AmmError;
use super::swap::Direction;
use super::token::TokenId;

/// Bookkeeping state for one canonical pair: custodied reserves, total
/// outstanding liquidity shares, and the per-account share balances.
///
/// Reserves and shares are only ever updated together, through the checked
/// mutators below; both reserves are positive whenever any shares are
/// outstanding, and the share balances always sum to `total_shares`. A pool
/// whose shares have all been removed stays allocated but inert until
/// liquidity is added again.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    /// Custodied amount of the pair's `token0`
    reserve0: u128,
    /// Custodied amount of the pair's `token1`
    reserve1: u128,
    /// Sum of all outstanding liquidity shares
    total_shares: u128,
    /// Liquidity share balance per account
    shares: HashMap<Address, u128>,
}

/// Targeted undo record for one account's view of a pool.
///
/// Captured before a mutation, restored if the ledger leg of the operation
/// fails afterwards. Restoring is infallible: it assigns the recorded
/// values back verbatim.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PoolSnapshot {
    /// Reserve of `token0` at capture time
    reserve0: u128,
    /// Reserve of `token1` at capture time
    reserve1: u128,
    /// Total shares at capture time
    total_shares: u128,
    /// The account the snapshot tracks
    account: Address,
    /// That account's share balance at capture time
    account_shares: u128,
}

impl Pool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve of the pair's `token0`.
    #[must_use]
    pub const fn reserve0(&self) -> u128 {
        self.reserve0
    }

    /// Reserve of the pair's `token1`.
    #[must_use]
    pub const fn reserve1(&self) -> u128 {
        self.reserve1
    }

    /// Sum of all outstanding liquidity shares.
    #[must_use]
    pub const fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Share balance of `account`; zero for accounts that never deposited.
    #[must_use]
    pub fn share_of(&self, account: Address) -> u128 {
        self.shares.get(&account).copied().unwrap_or(0)
    }

    /// Adds deposited reserves and mints shares to `recipient` in one step.
    ///
    /// All four updated values are computed before any of them is assigned,
    /// so a failure leaves the pool untouched.
    ///
    /// # Errors
    /// * `InvalidReserves` if any updated value would overflow
    pub(crate) fn credit(
        &mut self,
        amount0: u128,
        amount1: u128,
        recipient: Address,
        minted: u128,
    ) -> Result<(), AmmError> {
        let reserve0 = self
            .reserve0
            .checked_add(amount0)
            .ok_or(AmmError::InvalidReserves)?;
        let reserve1 = self
            .reserve1
            .checked_add(amount1)
            .ok_or(AmmError::InvalidReserves)?;
        let total_shares = self
            .total_shares
            .checked_add(minted)
            .ok_or(AmmError::InvalidReserves)?;
        let account_shares = self
            .share_of(recipient)
            .checked_add(minted)
            .ok_or(AmmError::InvalidReserves)?;

        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
        self.total_shares = total_shares;
        self.shares.insert(recipient, account_shares);
        Ok(())
    }

    /// Pays out reserves and burns `burned` shares from `account` in one step.
    ///
    /// # Errors
    /// * `InsufficientLiquidity` if `account` holds fewer than `burned` shares
    /// * `InvalidReserves` if a reserve or the share total would underflow
    pub(crate) fn debit(
        &mut self,
        amount0: u128,
        amount1: u128,
        account: Address,
        burned: u128,
    ) -> Result<(), AmmError> {
        let account_shares = self
            .share_of(account)
            .checked_sub(burned)
            .ok_or(AmmError::InsufficientLiquidity)?;
        let reserve0 = self
            .reserve0
            .checked_sub(amount0)
            .ok_or(AmmError::InvalidReserves)?;
        let reserve1 = self
            .reserve1
            .checked_sub(amount1)
            .ok_or(AmmError::InvalidReserves)?;
        let total_shares = self
            .total_shares
            .checked_sub(burned)
            .ok_or(AmmError::InvalidReserves)?;

        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
        self.total_shares = total_shares;
        if account_shares == 0 {
            self.shares.remove(&account);
        } else {
            self.shares.insert(account, account_shares);
        }
        Ok(())
    }

    /// Applies a trade: grows the inbound reserve, shrinks the outbound one.
    ///
    /// # Errors
    /// * `InvalidReserves` if the inbound reserve would overflow or the
    ///   outbound reserve would underflow
    pub(crate) fn apply_swap(
        &mut self,
        direction: Direction,
        amount_in: u128,
        amount_out: u128,
    ) -> Result<(), AmmError> {
        let (reserve0, reserve1) = match direction {
            Direction::ZeroForOne => (
                self.reserve0.checked_add(amount_in),
                self.reserve1.checked_sub(amount_out),
            ),
            Direction::OneForZero => (
                self.reserve0.checked_sub(amount_out),
                self.reserve1.checked_add(amount_in),
            ),
        };
        let (Some(reserve0), Some(reserve1)) = (reserve0, reserve1) else {
            return Err(AmmError::InvalidReserves);
        };
        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
        Ok(())
    }

    /// Captures the values a mutation on behalf of `account` may change.
    pub(crate) fn snapshot_for(&self, account: Address) -> PoolSnapshot {
        PoolSnapshot {
            reserve0: self.reserve0,
            reserve1: self.reserve1,
            total_shares: self.total_shares,
            account,
            account_shares: self.share_of(account),
        }
    }

    /// Rolls the pool back to a previously captured snapshot.
    pub(crate) fn restore(&mut self, snapshot: PoolSnapshot) {
        self.reserve0 = snapshot.reserve0;
        self.reserve1 = snapshot.reserve1;
        self.total_shares = snapshot.total_shares;
        if snapshot.account_shares == 0 {
            self.shares.remove(&snapshot.account);
        } else {
            self.shares.insert(snapshot.account, snapshot.account_shares);
        }
    }
}

/// Read-only snapshot of one pool for listings and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct PoolInfo {
    /// The pair's first token in canonical order
    pub token0: TokenId,
    /// The pair's second token in canonical order
    pub token1: TokenId,
    /// Reserve of `token0`
    pub reserve0: u128,
    /// Reserve of `token1`
    pub reserve1: u128,
    /// Sum of all outstanding liquidity shares
    pub total_shares: u128,
}
