//! Error types for the VoxKit client.
//!
//! Every failure in this crate surfaces to the immediate caller as a
//! [`ClientError`]; nothing is retried internally. Retry and backoff, if
//! any, belong to the transport layer.

use thiserror::Error;

/// Errors that can occur during VoxKit client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Key material could not be decoded; fatal, never retried
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// A length-prefixed stream declared more bytes than it contains
    #[error("Truncated frame: {0}")]
    TruncatedFrame(String),

    /// The audio encoding has no decoder in this client
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// A codec decoder rejected its input mid-utterance
    #[error("Codec decode error: {0}")]
    CodecDecode(String),

    /// Source exceeds the configured maximum, checked before any frame is sent
    #[error("Source of {size} bytes exceeds maximum of {max} bytes")]
    OversizeSource { size: u64, max: u64 },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Channel could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// gRPC-level failure reported by the service
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::Status),

    /// Local file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Object storage failure during upload
    #[error("Storage error: {0}")]
    Storage(String),

    /// A storage URI that does not follow `storage://host/bucket/object`
    #[error("Invalid resource URI: {0}")]
    InvalidUri(String),

    /// Container file could not be written
    #[error("Container write error: {0}")]
    ContainerWrite(String),
}

/// Result type for VoxKit client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl From<hound::Error> for ClientError {
    fn from(err: hound::Error) -> Self {
        ClientError::ContainerWrite(err.to_string())
    }
}

impl From<object_store::Error> for ClientError {
    fn from(err: object_store::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}
