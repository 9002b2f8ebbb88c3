use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};

use super::engine::Amm;
use super::quote::DEFAULT_FEE_BPS;
use super::token::TokenId;
use crate::ledger::{InMemoryLedger, Ledger};
use crate::utils::clock::FixedClock;

/// The instant every test clock is pinned to.
pub const NOW: u64 = 1_750_000_000;
/// A deadline comfortably in the pinned clock's future.
pub const DEADLINE: u64 = NOW + 60;

/// Deterministic account address from a small index.
pub fn account(n: u64) -> Address {
    Address::from_word(B256::from(U256::from(n)))
}

/// Deterministic token from a small index, in a namespace disjoint from
/// [`account`].
pub fn token(n: u64) -> TokenId {
    TokenId::new(account(0xA000 + n))
}

/// The vault address used by every test engine.
pub fn vault() -> Address {
    account(0xEE00)
}

/// Engine over the given ledger with the default fee and a pinned clock.
pub fn amm_over(ledger: Arc<dyn Ledger>) -> Amm {
    Amm::with_clock(ledger, vault(), DEFAULT_FEE_BPS, Arc::new(FixedClock(NOW)))
}

/// Mints generous balances of tokens 1..=3 to accounts 1 and 2 and
/// approves `spender` for all of them.
pub fn seed_accounts(ledger: &InMemoryLedger, spender: Address) {
    for account_n in [1, 2] {
        for token_n in [1, 2, 3] {
            ledger.mint(token(token_n), account(account_n), 1_000_000_000);
            ledger.approve(token(token_n), account(account_n), spender, u128::MAX);
        }
    }
}

/// Engine over a fresh in-memory ledger with two funded, approved
/// accounts.
pub fn funded_amm() -> (Amm, Arc<InMemoryLedger>) {
    funded_amm_with_fee(DEFAULT_FEE_BPS)
}

/// Same as [`funded_amm`] with an explicit swap fee.
pub fn funded_amm_with_fee(fee_bps: u16) -> (Amm, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    seed_accounts(&ledger, vault());
    let amm = Amm::with_clock(
        Arc::clone(&ledger) as Arc<dyn Ledger>,
        vault(),
        fee_bps,
        Arc::new(FixedClock(NOW)),
    );
    (amm, ledger)
}

/// Ledger that accepts inbound pulls but rejects every outbound payment,
/// for exercising rollback paths.
#[derive(Default)]
pub struct PayoutRejectingLedger {
    /// Honest books behind the rejecting facade
    pub inner: InMemoryLedger,
}

impl PayoutRejectingLedger {
    /// Creates the rejecting ledger over empty books.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for PayoutRejectingLedger {
    fn balance_of(&self, token: TokenId, account: Address) -> u128 {
        self.inner.balance_of(token, account)
    }

    fn transfer(&self, _token: TokenId, _from: Address, _to: Address, _amount: u128) -> bool {
        false
    }

    fn transfer_from(
        &self,
        token: TokenId,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> bool {
        self.inner.transfer_from(token, spender, from, to, amount)
    }

    fn allowance(&self, token: TokenId, owner: Address, spender: Address) -> u128 {
        self.inner.allowance(token, owner, spender)
    }

    fn approve(&self, token: TokenId, owner: Address, spender: Address, amount: u128) -> bool {
        self.inner.approve(token, owner, spender, amount)
    }
}

/// Ledger that reports success on everything while never moving a
/// balance, for exercising the delta verification.
pub struct DishonestLedger;

impl Ledger for DishonestLedger {
    fn balance_of(&self, _token: TokenId, _account: Address) -> u128 {
        0
    }

    fn transfer(&self, _token: TokenId, _from: Address, _to: Address, _amount: u128) -> bool {
        true
    }

    fn transfer_from(
        &self,
        _token: TokenId,
        _spender: Address,
        _from: Address,
        _to: Address,
        _amount: u128,
    ) -> bool {
        true
    }

    fn allowance(&self, _token: TokenId, _owner: Address, _spender: Address) -> u128 {
        u128::MAX
    }

    fn approve(&self, _token: TokenId, _owner: Address, _spender: Address, _amount: u128) -> bool {
        true
    }
}
