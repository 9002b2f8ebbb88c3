//! Pure swap pricing for constant-product pools.
//!
//! Nothing in here touches pool state: both quote functions take explicit
//! reserves and are used by the trading operations and by read-only quote
//! queries alike. All intermediate products are computed in 256-bit
//! integers so the full `amount * reserve` product can never overflow, and
//! every narrowing back to the reserve width is checked.

use alloy::primitives::U256;

use super::error::AmmError;

/// Default swap fee: 30 bps = 0.3%, retained by the pool for providers.
pub const DEFAULT_FEE_BPS: u16 = 30;
/// Basis-point denominator.
pub const BPS_DENOMINATOR: u16 = 10_000;
/// Highest fee the configuration accepts: 1000 bps = 10%.
pub const MAX_FEE_BPS: u16 = 1_000;
/// Fixed-point scale for spot prices (1e18).
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Output amount for an exact input against the given reserves.
///
/// With fee `f` in basis points the formula is
/// `floor(in * (10000 - f) * reserve_out / (reserve_in * 10000 + in * (10000 - f)))`.
/// At the default 30 bps this reduces to the familiar
/// `floor(in * 997 * reserve_out / (reserve_in * 1000 + in * 997))`, and at
/// zero bps to the fee-less `floor(in * reserve_out / (in + reserve_in))`.
///
/// Rounding is always floor, in the pool's favor, and the result is
/// strictly less than `reserve_out`: a single trade can never drain the
/// outbound side.
///
/// # Errors
/// * `InvalidReserves` if any of `amount_in`, `reserve_in`, `reserve_out`
///   is zero, if `fee_bps` is not below the basis-point denominator, or on
///   arithmetic overflow
pub fn quote_out(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee_bps: u16,
) -> Result<u128, AmmError> {
    if amount_in == 0 || reserve_in == 0 || reserve_out == 0 || fee_bps >= BPS_DENOMINATOR {
        return Err(AmmError::InvalidReserves);
    }

    let keep = U256::from(BPS_DENOMINATOR - fee_bps);
    let amount_in_kept = U256::from(amount_in)
        .checked_mul(keep)
        .ok_or(AmmError::InvalidReserves)?;
    let numerator = amount_in_kept
        .checked_mul(U256::from(reserve_out))
        .ok_or(AmmError::InvalidReserves)?;
    let denominator = U256::from(reserve_in)
        .checked_mul(U256::from(BPS_DENOMINATOR))
        .and_then(|scaled| scaled.checked_add(amount_in_kept))
        .ok_or(AmmError::InvalidReserves)?;

    u128::try_from(numerator / denominator).map_err(|_| AmmError::InvalidReserves)
}

/// Input amount required to receive an exact output from the given reserves.
///
/// Inverse of [`quote_out`], rounded up by one so the quoted input is always
/// sufficient: `floor(reserve_in * out * 10000 / ((reserve_out - out) * (10000 - f))) + 1`.
///
/// # Errors
/// * `InvalidReserves` if any of `amount_out`, `reserve_in`, `reserve_out`
///   is zero, if `amount_out` is not below `reserve_out`, if `fee_bps` is
///   not below the basis-point denominator, or on arithmetic overflow
pub fn quote_in(
    amount_out: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee_bps: u16,
) -> Result<u128, AmmError> {
    if amount_out == 0 || reserve_in == 0 || reserve_out == 0 || fee_bps >= BPS_DENOMINATOR {
        return Err(AmmError::InvalidReserves);
    }
    if amount_out >= reserve_out {
        return Err(AmmError::InvalidReserves);
    }

    let keep = U256::from(BPS_DENOMINATOR - fee_bps);
    let numerator = U256::from(reserve_in)
        .checked_mul(U256::from(amount_out))
        .and_then(|product| product.checked_mul(U256::from(BPS_DENOMINATOR)))
        .ok_or(AmmError::InvalidReserves)?;
    let denominator = U256::from(reserve_out - amount_out)
        .checked_mul(keep)
        .ok_or(AmmError::InvalidReserves)?;

    let amount_in = (numerator / denominator)
        .checked_add(U256::from(1u8))
        .ok_or(AmmError::InvalidReserves)?;
    u128::try_from(amount_in).map_err(|_| AmmError::InvalidReserves)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_out_with_default_fee() {
        // floor(100 * 997 * 2000 / (1000 * 1000 + 100 * 997))
        //   = floor(199_400_000 / 1_099_700) = 181
        assert_eq!(quote_out(100, 1000, 2000, DEFAULT_FEE_BPS).unwrap(), 181);
        // Reverse direction of the same pool
        assert_eq!(quote_out(100, 2000, 1000, DEFAULT_FEE_BPS).unwrap(), 47);
    }

    #[test]
    fn test_quote_out_without_fee() {
        for (amount_in, reserve_in, reserve_out, expected) in &[
            // floor(in * r_out / (in + r_in))
            (100u128, 1000u128, 2000u128, 181u128),
            (1000, 1000, 2000, 1000),
            (1000, 1000, 1000, 500),
            (1, 1_000_000, 1_000_000, 0),
        ] {
            assert_eq!(
                quote_out(*amount_in, *reserve_in, *reserve_out, 0).unwrap(),
                *expected
            );
        }
    }

    #[test]
    fn test_quote_out_rejects_zero_inputs() {
        for (amount_in, reserve_in, reserve_out) in
            &[(0u128, 1000u128, 2000u128), (100, 0, 2000), (100, 1000, 0)]
        {
            assert_eq!(
                quote_out(*amount_in, *reserve_in, *reserve_out, DEFAULT_FEE_BPS),
                Err(AmmError::InvalidReserves)
            );
        }
    }

    #[test]
    fn test_quote_out_rejects_full_fee() {
        assert_eq!(
            quote_out(100, 1000, 2000, BPS_DENOMINATOR),
            Err(AmmError::InvalidReserves)
        );
    }

    #[test]
    fn test_quote_out_never_drains_reserve_out() {
        for amount_in in [1u128, 500, 1_000, 1_000_000, u64::MAX as u128, u128::MAX] {
            for fee_bps in [0, DEFAULT_FEE_BPS, MAX_FEE_BPS] {
                let out = quote_out(amount_in, 1000, 2000, fee_bps).unwrap();
                assert!(out < 2000, "amount_in {amount_in} drained the pool");
            }
        }
    }

    #[test]
    fn test_quote_out_handles_wide_products() {
        // The full product overflows 128 bits but fits in 256
        let wide = u64::MAX as u128;
        let out = quote_out(wide, wide, wide, DEFAULT_FEE_BPS).unwrap();
        assert!(out < wide);
    }

    #[test]
    fn test_quote_out_fails_loudly_on_overflow() {
        // Near-maximum reserves push the scaled product past 256 bits;
        // that must surface as an error, never a wrapped result
        let huge = u128::MAX / 2;
        assert_eq!(
            quote_out(huge, huge, huge, DEFAULT_FEE_BPS),
            Err(AmmError::InvalidReserves)
        );
    }

    #[test]
    fn test_quote_in_with_default_fee() {
        // floor(1000 * 100 * 10000 / ((2000 - 100) * 9970)) + 1
        //   = floor(1_000_000_000 / 18_943_000) + 1 = 52 + 1 = 53
        assert_eq!(quote_in(100, 1000, 2000, DEFAULT_FEE_BPS).unwrap(), 53);
    }

    #[test]
    fn test_quote_in_rejects_bad_inputs() {
        for (amount_out, reserve_in, reserve_out) in &[
            (0u128, 1000u128, 2000u128),
            (100, 0, 2000),
            (100, 1000, 0),
            (2000, 1000, 2000),
            (2001, 1000, 2000),
        ] {
            assert_eq!(
                quote_in(*amount_out, *reserve_in, *reserve_out, DEFAULT_FEE_BPS),
                Err(AmmError::InvalidReserves)
            );
        }
    }

    #[test]
    fn test_quote_in_covers_quote_out() {
        // The quoted input must always buy at least the requested output
        for amount_out in [1u128, 10, 181, 500, 1999] {
            for fee_bps in [0, DEFAULT_FEE_BPS] {
                let amount_in = quote_in(amount_out, 1000, 2000, fee_bps).unwrap();
                let bought = quote_out(amount_in, 1000, 2000, fee_bps).unwrap();
                assert!(
                    bought >= amount_out,
                    "in {amount_in} bought {bought} < requested {amount_out}"
                );
            }
        }
    }
}
