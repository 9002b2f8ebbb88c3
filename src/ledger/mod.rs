//! Asset custody collaborator.
//!
//! The engine never holds token balances itself; every movement of funds
//! goes through a [`Ledger`]. The trait mirrors a conventional token
//! ledger's capability set. Because there is no ambient transaction sender
//! here, the acting party is always an explicit argument.
//!
//! A ledger is untrusted: implementations have been observed to report
//! success without moving funds. Callers that care (the engine does)
//! verify balance deltas around each call instead of relying on the
//! returned flag alone.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use alloy::primitives::Address;

use crate::amm::token::TokenId;

/// Capability set of an external asset ledger.
pub trait Ledger: Send + Sync {
    /// Balance of `account` in `token`.
    fn balance_of(&self, token: TokenId, account: Address) -> u128;

    /// Moves `amount` of `token` from `from` to `to`. Returns whether the
    /// ledger reports success.
    fn transfer(&self, token: TokenId, from: Address, to: Address, amount: u128) -> bool;

    /// Moves `amount` of `token` from `from` to `to` on behalf of
    /// `spender`, consuming allowance. Returns whether the ledger reports
    /// success.
    fn transfer_from(
        &self,
        token: TokenId,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> bool;

    /// Remaining allowance granted by `owner` to `spender` for `token`.
    fn allowance(&self, token: TokenId, owner: Address, spender: Address) -> u128;

    /// Sets the allowance granted by `owner` to `spender` for `token`.
    /// Returns whether the ledger reports success.
    fn approve(&self, token: TokenId, owner: Address, spender: Address, amount: u128) -> bool;
}

/// Balance and allowance books of the in-memory ledger.
#[derive(Debug, Default)]
struct LedgerBooks {
    /// Balance per (token, account)
    balances: HashMap<(TokenId, Address), u128>,
    /// Allowance per (token, owner, spender)
    allowances: HashMap<(TokenId, Address, Address), u128>,
}

/// In-memory [`Ledger`] with conventional semantics: fixed supply per
/// mint, no rebasing, no transfer fees, and a reported success always
/// coinciding with an actual balance change.
///
/// Used by the test suite, the benchmarks, and the CLI simulator.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Books behind a single lock; operations are short and uncontended
    books: RwLock<LedgerBooks>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` of `token` to `account` out of thin air. Seeding
    /// hook for tests and simulations; saturates at the balance width.
    pub fn mint(&self, token: TokenId, account: Address, amount: u128) {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let balance = books.balances.entry((token, account)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

impl Ledger for InMemoryLedger {
    fn balance_of(&self, token: TokenId, account: Address) -> u128 {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .balances
            .get(&(token, account))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&self, token: TokenId, from: Address, to: Address, amount: u128) -> bool {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        move_balance(&mut books, token, from, to, amount)
    }

    fn transfer_from(
        &self,
        token: TokenId,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> bool {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);

        let Some(remaining) = books
            .allowances
            .get(&(token, from, spender))
            .copied()
            .unwrap_or(0)
            .checked_sub(amount)
        else {
            return false;
        };

        if !move_balance(&mut books, token, from, to, amount) {
            return false;
        }
        books.allowances.insert((token, from, spender), remaining);
        true
    }

    fn allowance(&self, token: TokenId, owner: Address, spender: Address) -> u128 {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&self, token: TokenId, owner: Address, spender: Address, amount: u128) -> bool {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        books.allowances.insert((token, owner, spender), amount);
        true
    }
}

/// Moves a balance inside the books, refusing on insufficient funds or a
/// receiver overflow. Both sides change or neither does.
fn move_balance(
    books: &mut LedgerBooks,
    token: TokenId,
    from: Address,
    to: Address,
    amount: u128,
) -> bool {
    if from == to {
        return books.balances.get(&(token, from)).copied().unwrap_or(0) >= amount;
    }

    let sender = books.balances.get(&(token, from)).copied().unwrap_or(0);
    let receiver = books.balances.get(&(token, to)).copied().unwrap_or(0);
    let (Some(sender), Some(receiver)) =
        (sender.checked_sub(amount), receiver.checked_add(amount))
    else {
        return false;
    };

    books.balances.insert((token, from), sender);
    books.balances.insert((token, to), receiver);
    true
}
