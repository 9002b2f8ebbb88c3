use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::debug;

use super::error::AmmError;
use super::pair::PairKey;
use super::pool::{Pool, PoolInfo};
use super::token::TokenId;

/// Owns every pool, keyed by canonical pair.
///
/// Pools are created lazily the first time a pair is resolved for a
/// deposit and are never destroyed. Each pool sits behind its own mutex so
/// a concurrent host still sees one writer at a time per pair, while
/// operations on different pairs proceed independently. The registry is an
/// explicitly owned value passed by reference to every operation; there is
/// no ambient global store.
#[derive(Debug, Default)]
pub struct PairRegistry {
    /// Pool store, keyed by canonical pair
    pools: RwLock<HashMap<PairKey, Arc<Mutex<Pool>>>>,
}

impl PairRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an unordered pair to its canonical key and pool, creating
    /// an empty pool on first use. Aside from that lazy creation this has
    /// no side effects.
    ///
    /// # Errors
    /// * `IdenticalTokens` if both tokens are the same
    pub fn resolve(
        &self,
        token_a: TokenId,
        token_b: TokenId,
    ) -> Result<(PairKey, Arc<Mutex<Pool>>), AmmError> {
        let key = PairKey::new(token_a, token_b)?;

        let pools = self.pools.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = pools.get(&key) {
            return Ok((key, Arc::clone(pool)));
        }
        drop(pools);

        let mut pools = self.pools.write().unwrap_or_else(PoisonError::into_inner);
        // A racing writer may have created the pool between the two locks
        let pool = pools.entry(key).or_insert_with(|| {
            debug!("created pool {key} for {}/{}", key.token0(), key.token1());
            Arc::new(Mutex::new(Pool::new()))
        });
        Ok((key, Arc::clone(pool)))
    }

    /// Looks up an unordered pair without creating a pool, so read-only
    /// queries never allocate state.
    ///
    /// # Errors
    /// * `IdenticalTokens` if both tokens are the same
    pub fn get(
        &self,
        token_a: TokenId,
        token_b: TokenId,
    ) -> Result<(PairKey, Option<Arc<Mutex<Pool>>>), AmmError> {
        let key = PairKey::new(token_a, token_b)?;
        let pools = self.pools.read().unwrap_or_else(PoisonError::into_inner);
        Ok((key, pools.get(&key).map(Arc::clone)))
    }

    /// Snapshot of every pool, ordered by canonical token pair.
    #[must_use]
    pub fn pool_infos(&self) -> Vec<PoolInfo> {
        let pools = self.pools.read().unwrap_or_else(PoisonError::into_inner);
        let mut infos: Vec<PoolInfo> = pools
            .iter()
            .map(|(key, pool)| {
                let pool = pool.lock().unwrap_or_else(PoisonError::into_inner);
                PoolInfo {
                    token0: key.token0(),
                    token1: key.token1(),
                    reserve0: pool.reserve0(),
                    reserve1: pool.reserve1(),
                    total_shares: pool.total_shares(),
                }
            })
            .collect();
        infos.sort_by_key(|info| (info.token0, info.token1));
        infos
    }

    /// Number of pools created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no pool has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::amm::test_helpers::*;

    #[test]
    fn test_resolve_creates_one_pool_per_pair() {
        let registry = PairRegistry::new();
        assert!(registry.is_empty());

        let (key_ab, pool_ab) = registry.resolve(token(1), token(2)).unwrap();
        let (key_ba, pool_ba) = registry.resolve(token(2), token(1)).unwrap();

        assert_eq!(key_ab, key_ba);
        assert!(Arc::ptr_eq(&pool_ab, &pool_ba));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_identical_tokens() {
        let registry = PairRegistry::new();
        assert_eq!(
            registry.resolve(token(1), token(1)).err(),
            Some(AmmError::IdenticalTokens)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = PairRegistry::new();
        let (_, pool) = registry.get(token(1), token(2)).unwrap();
        assert!(pool.is_none());
        assert!(registry.is_empty());

        registry.resolve(token(1), token(2)).unwrap();
        let (_, pool) = registry.get(token(2), token(1)).unwrap();
        assert!(pool.is_some());
    }

    #[test]
    fn test_pool_infos_sorted_by_pair() {
        let registry = PairRegistry::new();
        registry.resolve(token(3), token(4)).unwrap();
        registry.resolve(token(1), token(2)).unwrap();

        let infos = registry.pool_infos();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].token0, token(1));
        assert_eq!(infos[1].token0, token(3));
        assert_eq!(infos[0].total_shares, 0);
    }
}
