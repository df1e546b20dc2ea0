//! Error types for the payme_core library.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading reference data or encoding payments.
///
/// Invalid IBANs and form values are not errors: they are reported through
/// boolean checks and [`crate::iban::IbanRejection`].
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred while reading a dataset source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Country rule dataset is malformed or incomplete.
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// LZMA compression or decompression failed.
    #[error("Compression error: {0}")]
    Compression(String),

    /// Encoded payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Logger could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// CRC-32 of a decoded payload does not match its header.
    #[error("Checksum mismatch: expected {expected:08X}, got {actual:08X}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DataFormat(err.to_string())
    }
}

impl From<liblzma::stream::Error> for Error {
    fn from(err: liblzma::stream::Error) -> Self {
        Error::Compression(err.to_string())
    }
}
