/// Error types for ledger model operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A credential could not be decoded from Plutus data.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    /// An output reference string is malformed.
    #[error("invalid output reference: {0}")]
    InvalidOutRef(String),
    /// Adding two asset bundles overflowed a quantity.
    #[error("asset quantity overflow for {0}")]
    AmountOverflow(String),
    /// An underlying primitives error (forwarded from `progtoken-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] progtoken_primitives::PrimitivesError),
}
