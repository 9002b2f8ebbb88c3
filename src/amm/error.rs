use thiserror::Error;

/// Failure taxonomy for every pool operation.
///
/// Each unmet precondition maps to exactly one variant. A failed operation
/// aborts as a whole: pool state is left untouched, nothing is retried
/// internally, and the caller decides whether to resubmit with adjusted
/// parameters (a fresh deadline, a looser minimum, a smaller amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmmError {
    /// The caller-supplied deadline passed before the operation started.
    #[error("deadline has passed")]
    Expired,

    /// A pair requires two distinct tokens.
    #[error("pair tokens must be distinct")]
    IdenticalTokens,

    /// A computed amount fell below the caller-supplied minimum.
    #[error("amount below the caller-supplied minimum")]
    SlippageExceeded,

    /// The caller holds fewer shares than the operation needs.
    #[error("share balance too low")]
    InsufficientLiquidity,

    /// The swap would produce zero output.
    #[error("swap output is zero")]
    InsufficientOutput,

    /// Amounts or reserves are zero where positive values are required,
    /// or an update would overflow the reserve width.
    #[error("invalid amounts or reserves")]
    InvalidReserves,

    /// A price was requested from a pool with an empty reserve.
    #[error("pool reserves are empty")]
    EmptyReserves,

    /// A swap path with anything other than exactly two tokens.
    #[error("swap path must contain exactly two tokens")]
    UnsupportedPath,

    /// The ledger rejected a transfer, or its reported result did not match
    /// the observed balance change.
    #[error("ledger transfer failed")]
    TransferFailed,
}
