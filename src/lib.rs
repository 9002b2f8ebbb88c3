/*!
 * # Eddy - Constant-Product Exchange Engine
 *
 * Eddy is a Rust implementation of a constant-product market maker: a
 * ledger-backed exchange where participants deposit paired assets into
 * shared pools, receive claim shares, and swap one asset for the other at
 * a price set by the pools' relative reserves.
 *
 * ## Core Features
 *
 * - **Pair Canonicalization**: One pool per unordered token pair
 * - **Pool Accounting**: Reserve and liquidity-share bookkeeping with
 *   checked, deterministic integer arithmetic
 * - **Swap Pricing**: Fee-adjusted constant-product quotes, floor-rounded
 *   in the pool's favor
 * - **Spot Prices**: Fixed-point price derivation from live reserves
 * - **Untrusted Custody**: Every ledger transfer is verified against the
 *   observed balance delta, and every operation is all-or-nothing
 *
 * ## Module Structure
 *
 * - `amm`: Pool accounting, pricing, and the operation surface
 * - `config`: Configuration management for the engine and simulator
 * - `ledger`: Asset custody collaborator and its in-memory reference
 * - `utils`: Clock and logging utilities
 */

/// Pool accounting, pricing, and the operation surface
pub mod amm;
/// Configuration management for the engine and simulator
pub mod config;
/// Asset custody collaborator
pub mod ledger;
/// Clock and logging utilities
pub mod utils;
