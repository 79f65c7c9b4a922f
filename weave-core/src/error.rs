//! Error types for the merkle weave.
//!
//! Provides structured errors with:
//! - Unique error codes for service responses
//! - Source error chaining
//! - Client vs server error categorization

use std::io;
use thiserror::Error;

/// Result type for weave operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes for service responses.
///
/// Codes are structured as:
/// - 1xxx: Validation errors (client)
/// - 5xxx: Storage errors (server)
/// - 6xxx: Internal errors (server)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Validation errors (1xxx)
    InvalidInput = 1001,
    InvalidIndex = 1002,
    InvalidProof = 1003,
    InvalidConfig = 1004,
    InvalidDigest = 1005,

    // Storage errors (5xxx)
    StorageWrite = 5001,
    StorageCorruption = 5002,

    // Internal errors (6xxx)
    HashingFailure = 6001,
    Serialization = 6002,
    Internal = 6003,
}

impl ErrorCode {
    /// Get the numeric code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Check if this is a client error.
    pub fn is_client_error(self) -> bool {
        (1000..5000).contains(&self.code())
    }

    /// Check if this is a server error.
    pub fn is_server_error(self) -> bool {
        self.code() >= 5000
    }

    /// Check if this error is retryable.
    ///
    /// Nothing inside the weave retries; this only advises the caller.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCode::StorageWrite)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Errors that can occur in the weave.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================================================
    // Validation Errors (client errors)
    // ========================================================================
    /// Entry rejected before any shard was touched.
    #[error("[{code}] invalid input: {message}")]
    InvalidInput { code: ErrorCode, message: String },

    /// Position out of range for a log or forest.
    #[error("[{code}] invalid index: {message}")]
    InvalidIndex { code: ErrorCode, message: String },

    /// Proof is malformed for the sizes it claims.
    #[error("[{code}] invalid proof: {message}")]
    InvalidProof { code: ErrorCode, message: String },

    /// Configuration rejected by validation.
    #[error("[{code}] invalid config: {message}")]
    InvalidConfig { code: ErrorCode, message: String },

    /// Digest could not be decoded.
    #[error("[{code}] invalid digest: {message}")]
    InvalidDigest {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ========================================================================
    // Storage Errors (server errors)
    // ========================================================================
    /// Storage driver failed to persist a node.
    #[error("[{code}] storage error: {message}")]
    Storage {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ========================================================================
    // Internal Errors (server errors)
    // ========================================================================
    /// The hash primitive failed. Not retryable.
    #[error("[{code}] hashing failure: {message}")]
    HashingFailure {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization failed.
    #[error("[{code}] serialization error: {message}")]
    Serialization {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal error.
    #[error("[{code}] internal error: {message}")]
    Internal { code: ErrorCode, message: String },
}

impl Error {
    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidInput { code, .. } => *code,
            Error::InvalidIndex { code, .. } => *code,
            Error::InvalidProof { code, .. } => *code,
            Error::InvalidConfig { code, .. } => *code,
            Error::InvalidDigest { code, .. } => *code,
            Error::Storage { code, .. } => *code,
            Error::HashingFailure { code, .. } => *code,
            Error::Serialization { code, .. } => *code,
            Error::Internal { code, .. } => *code,
        }
    }

    /// Check if this is a client error.
    pub fn is_client_error(&self) -> bool {
        self.code().is_client_error()
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        self.code().is_server_error()
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Error {
    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            code: ErrorCode::InvalidInput,
            message: message.into(),
        }
    }

    /// Create an InvalidIndex error.
    pub fn invalid_index(message: impl Into<String>) -> Self {
        Error::InvalidIndex {
            code: ErrorCode::InvalidIndex,
            message: message.into(),
        }
    }

    /// Create an InvalidProof error.
    pub fn invalid_proof(message: impl Into<String>) -> Self {
        Error::InvalidProof {
            code: ErrorCode::InvalidProof,
            message: message.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            code: ErrorCode::InvalidConfig,
            message: message.into(),
        }
    }

    /// Create an InvalidDigest error.
    pub fn invalid_digest(message: impl Into<String>) -> Self {
        Error::InvalidDigest {
            code: ErrorCode::InvalidDigest,
            message: message.into(),
            source: None,
        }
    }

    /// Create a Storage error for a failed write.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            code: ErrorCode::StorageWrite,
            message: message.into(),
            source: None,
        }
    }

    /// Create a Storage error for a record the driver returned inconsistently.
    pub fn storage_corruption(message: impl Into<String>) -> Self {
        Error::Storage {
            code: ErrorCode::StorageCorruption,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an I/O error raised by the hash primitive.
    pub fn hashing(e: io::Error) -> Self {
        Error::HashingFailure {
            code: ErrorCode::HashingFailure,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }

    /// Create an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            code: ErrorCode::Internal,
            message: message.into(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization {
            code: ErrorCode::Serialization,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            code: ErrorCode::Serialization,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::InvalidDigest {
            code: ErrorCode::InvalidDigest,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}
