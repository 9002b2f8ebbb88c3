use std::str::FromStr;

use alloy::primitives::Address;
use derive_more::Display;
use eyre::Error;
use serde::Serialize;

/// Opaque identifier for an asset tracked by the external ledger.
///
/// Wraps an address for strict typing. The derived total order carries no
/// business meaning; it exists so an unordered pair of tokens can be put
/// into one canonical order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, Serialize)]
pub struct TokenId(Address);

impl TokenId {
    /// Wraps an address as a token identifier.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// The underlying address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }

    /// The raw address bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<Address> for TokenId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for TokenId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let address = Address::parse_checksummed(s, None)?;
        Ok(Self(address))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_address_bytes() {
        let low = TokenId::new(Address::repeat_byte(0x01));
        let high = TokenId::new(Address::repeat_byte(0x02));
        assert!(low < high);
        assert_eq!(low, low);
    }

    #[test]
    fn test_parse_checksummed() {
        let token = TokenId::from_str("0x4200000000000000000000000000000000000006").unwrap();
        assert_eq!(
            token.address(),
            alloy::primitives::address!("0x4200000000000000000000000000000000000006")
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TokenId::from_str("not an address").is_err());
    }
}
