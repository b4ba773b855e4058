/// Unified error type for all primitives operations.
///
/// Covers errors from hash parsing, asset-unit parsing and CBOR decoding.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid asset name: {0}")]
    InvalidAssetName(String),

    #[error("invalid unit: {0}")]
    InvalidUnit(String),

    #[error("invalid CBOR: {0}")]
    InvalidCbor(String),

    #[error("integer out of range")]
    IntegerOverflow,

    #[error("{0} trailing bytes after CBOR item")]
    TrailingBytes(usize),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
