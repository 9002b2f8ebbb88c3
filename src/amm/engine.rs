//! Operation surface of the exchange engine.
//!
//! [`Amm`] ties the pieces together: the pair registry that owns pool
//! state, the external [`Ledger`] that custodies the actual assets, the
//! vault address the engine trades under, the swap fee, and a clock for
//! deadline checks. The operations themselves live next to the component
//! they belong to: deposits and withdrawals in `liquidity`, trades in
//! `swap`, spot prices in `oracle`.
//!
//! Every mutating operation is all-or-nothing. Funds are pulled before any
//! pool mutation, pool state is only committed once the ledger legs have
//! been verified (or is rolled back when a later leg fails), and a failure
//! at any step refunds whatever was already pulled.

use std::sync::Arc;

use alloy::primitives::Address;
use log::error;

use super::error::AmmError;
use super::pool::PoolInfo;
use super::registry::PairRegistry;
use super::token::TokenId;
use crate::ledger::Ledger;
use crate::utils::clock::{Clock, SystemClock};

/// The exchange engine: pool accounting plus ledger custody plumbing.
pub struct Amm {
    /// Owns every pool, keyed by canonical pair
    registry: PairRegistry,
    /// External asset custody; treated as untrusted
    ledger: Arc<dyn Ledger>,
    /// Account the engine custodies reserves under
    vault: Address,
    /// Swap fee in basis points, applied by the pricing formula
    fee_bps: u16,
    /// Time source for deadline checks
    clock: Arc<dyn Clock>,
}

impl Amm {
    /// Creates an engine over the given ledger, custodying reserves under
    /// `vault` and charging `fee_bps` per swap. Uses the system clock.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>, vault: Address, fee_bps: u16) -> Self {
        Self::with_clock(ledger, vault, fee_bps, Arc::new(SystemClock))
    }

    /// Creates an engine with an explicit clock. Tests pin the clock to a
    /// fixed instant to exercise deadline behavior.
    #[must_use]
    pub fn with_clock(
        ledger: Arc<dyn Ledger>,
        vault: Address,
        fee_bps: u16,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry: PairRegistry::new(),
            ledger,
            vault,
            fee_bps,
            clock,
        }
    }

    /// The pair registry owning this engine's pools.
    #[must_use]
    pub fn registry(&self) -> &PairRegistry {
        &self.registry
    }

    /// The swap fee in basis points.
    #[must_use]
    pub const fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    /// The account the engine custodies reserves under. Callers grant this
    /// address an allowance before depositing or swapping.
    #[must_use]
    pub const fn vault(&self) -> Address {
        self.vault
    }

    /// Liquidity share balance of `account` in the pool for the given
    /// pair; zero if the pool does not exist or the account never
    /// deposited.
    ///
    /// # Errors
    /// * `IdenticalTokens` if both tokens are the same
    pub fn liquidity_balance_of(
        &self,
        token_a: TokenId,
        token_b: TokenId,
        account: Address,
    ) -> Result<u128, AmmError> {
        let (_, pool) = self.registry.get(token_a, token_b)?;
        Ok(pool.map_or(0, |pool| lock(&pool).share_of(account)))
    }

    /// Snapshot of every pool, ordered by canonical token pair.
    #[must_use]
    pub fn pools(&self) -> Vec<PoolInfo> {
        self.registry.pool_infos()
    }

    /// Rejects operations whose deadline already passed. A deadline equal
    /// to the current second is still valid; the check runs once, at
    /// operation entry.
    pub(crate) fn check_deadline(&self, deadline: u64) -> Result<(), AmmError> {
        if self.clock.now() > deadline {
            return Err(AmmError::Expired);
        }
        Ok(())
    }

    /// Pulls `amount` of `token` from `from` into the vault, verifying the
    /// vault's observed balance delta rather than trusting the ledger's
    /// reported result. Anything that arrived despite a mismatch is sent
    /// back before failing.
    ///
    /// # Errors
    /// * `TransferFailed` if the ledger rejects the pull or the observed
    ///   delta differs from `amount`
    pub(crate) fn pull(
        &self,
        token: TokenId,
        from: Address,
        amount: u128,
    ) -> Result<(), AmmError> {
        let before = self.ledger.balance_of(token, self.vault);
        let claimed = self
            .ledger
            .transfer_from(token, self.vault, from, self.vault, amount);
        let received = self
            .ledger
            .balance_of(token, self.vault)
            .saturating_sub(before);

        if claimed && received == amount {
            return Ok(());
        }
        if received > 0 {
            self.refund(token, from, received);
        }
        Err(AmmError::TransferFailed)
    }

    /// Pays `amount` of `token` from the vault to `to`, verifying the
    /// vault's observed balance delta.
    ///
    /// # Errors
    /// * `TransferFailed` if the ledger rejects the payment or the
    ///   observed delta differs from `amount`
    pub(crate) fn push(&self, token: TokenId, to: Address, amount: u128) -> Result<(), AmmError> {
        if amount == 0 {
            return Ok(());
        }
        let before = self.ledger.balance_of(token, self.vault);
        let claimed = self.ledger.transfer(token, self.vault, to, amount);
        let sent = before.saturating_sub(self.ledger.balance_of(token, self.vault));

        if claimed && sent == amount {
            Ok(())
        } else {
            if sent > 0 {
                error!("ledger moved {sent} of {token} to {to} while reporting failure");
            }
            Err(AmmError::TransferFailed)
        }
    }

    /// Best-effort return of funds to `to` on an abort path. A refund the
    /// ledger rejects leaves the funds parked in the vault; that is logged
    /// loudly rather than escalated, since the originating error is
    /// already on its way to the caller.
    pub(crate) fn refund(&self, token: TokenId, to: Address, amount: u128) {
        if amount == 0 {
            return;
        }
        if !self.ledger.transfer(token, self.vault, to, amount) {
            error!("refund of {amount} {token} to {to} failed; funds held in vault");
        }
    }

    /// Shared access to the ledger for the operation modules.
    pub(crate) fn ledger(&self) -> &dyn Ledger {
        &*self.ledger
    }
}

/// Locks a pool mutex, recovering the guard if a previous holder panicked;
/// pool mutations are staged and only committed whole, so the state behind
/// a poisoned lock is still consistent.
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::amm::test_helpers::*;

    #[test]
    fn test_liquidity_balance_defaults_to_zero() {
        let (amm, _) = funded_amm();
        assert_eq!(
            amm.liquidity_balance_of(token(1), token(2), account(1)).unwrap(),
            0
        );
    }

    #[test]
    fn test_liquidity_balance_identical_tokens() {
        let (amm, _) = funded_amm();
        assert_eq!(
            amm.liquidity_balance_of(token(1), token(1), account(1)),
            Err(AmmError::IdenticalTokens)
        );
    }

    #[test]
    fn test_deadline_boundary() {
        let (amm, _) = funded_amm();
        assert_eq!(amm.check_deadline(NOW - 1), Err(AmmError::Expired));
        assert!(amm.check_deadline(NOW).is_ok());
        assert!(amm.check_deadline(NOW + 1).is_ok());
    }

    #[test]
    fn test_pull_rejects_dishonest_ledger() {
        // Ledger reports success without moving funds; the delta check
        // must catch it
        let amm = amm_over(std::sync::Arc::new(DishonestLedger));
        assert_eq!(
            amm.pull(token(1), account(1), 100),
            Err(AmmError::TransferFailed)
        );
    }

    #[test]
    fn test_pull_requires_allowance() {
        let (amm, ledger) = funded_amm();
        let stranger = account(9);
        ledger.mint(token(1), stranger, 1_000);
        // No approval granted to the vault
        assert_eq!(
            amm.pull(token(1), stranger, 100),
            Err(AmmError::TransferFailed)
        );
        assert_eq!(ledger.balance_of(token(1), stranger), 1_000);
    }
}
