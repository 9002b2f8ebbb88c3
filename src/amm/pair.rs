use std::fmt::{self, Display};

use alloy::primitives::{keccak256, B256};

use super::error::AmmError;
use super::token::TokenId;

/// Canonical lookup key for an unordered pair of distinct tokens.
///
/// The two tokens are put into one deterministic order (smaller address
/// first) and the key is the keccak hash of their concatenated bytes, so
/// `PairKey::new(a, b)` and `PairKey::new(b, a)` are the same key. The
/// canonical order is kept alongside the hash: `reserve0` in a pool always
/// refers to `token0` here.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PairKey {
    /// Hash of the canonically ordered token addresses
    key: B256,
    /// The smaller token of the pair
    token0: TokenId,
    /// The larger token of the pair
    token1: TokenId,
}

impl PairKey {
    /// Derives the canonical key for an unordered pair.
    ///
    /// # Errors
    /// * `IdenticalTokens` if both tokens are the same
    pub fn new(token_a: TokenId, token_b: TokenId) -> Result<Self, AmmError> {
        if token_a == token_b {
            return Err(AmmError::IdenticalTokens);
        }
        let (token0, token1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };

        let mut bytes = [0u8; 40];
        bytes[..20].copy_from_slice(token0.as_slice());
        bytes[20..].copy_from_slice(token1.as_slice());

        Ok(Self {
            key: keccak256(bytes),
            token0,
            token1,
        })
    }

    /// The first token in canonical order.
    #[must_use]
    pub const fn token0(&self) -> TokenId {
        self.token0
    }

    /// The second token in canonical order.
    #[must_use]
    pub const fn token1(&self) -> TokenId {
        self.token1
    }

    /// Whether `token` is `token0` of this pair.
    #[must_use]
    pub fn is_token0(&self, token: TokenId) -> bool {
        token == self.token0
    }
}

impl Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
