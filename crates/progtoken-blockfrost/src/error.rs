//! Error types for Blockfrost operations.

use progtoken_ledger::LedgerError;
use progtoken_primitives::PrimitivesError;

/// Errors that can occur when interacting with a Blockfrost-compatible API.
#[derive(Debug, thiserror::Error)]
pub enum BlockfrostError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Server returned a non-2xx response.
    #[error("server error ({status_code}): {message}")]
    ServerError {
        /// HTTP status code.
        status_code: u16,
        /// Error message from server.
        message: String,
    },

    /// Resource not found (404).
    #[error("not found")]
    NotFound,

    /// The response parsed but does not describe a valid ledger object.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A hash, unit or datum in the response could not be decoded.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// A ledger value in the response could not be built.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
