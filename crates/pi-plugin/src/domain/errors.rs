//! # Domain Errors
//!
//! Error types for the pi plugin.
//!
//! User errors carry a stable numeric [`ErrorCode`] so that front ends can
//! react to them without parsing text. Everything else is either a fault in
//! stored data (`Integrity`, `CorruptBlob`, `UnexpectedDescriptor`), a
//! violated upstream invariant (`Internal`) or a collaborator failure.

use super::value_objects::Token;
use std::fmt;
use thiserror::Error;

/// Result type for plugin operations.
pub type PiResult<T> = Result<T, PiError>;

/// Machine-readable user error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Payload token is malformed or does not match the command token.
    TokenInvalid,
    /// Client public key could not be parsed.
    PublicKeyInvalid,
    /// Client signature is malformed or does not verify.
    SignatureInvalid,
    /// The requested billing status change violates a policy rule.
    BillingStatusChangeNotAllowed,
    /// The requested billing status is not a settable value.
    BillingStatusInvalid,
}

impl ErrorCode {
    /// Stable numeric code.
    pub fn code(self) -> u32 {
        match self {
            ErrorCode::TokenInvalid => 1,
            ErrorCode::PublicKeyInvalid => 2,
            ErrorCode::SignatureInvalid => 3,
            ErrorCode::BillingStatusChangeNotAllowed => 4,
            ErrorCode::BillingStatusInvalid => 5,
        }
    }

    /// Taxonomy class of this code.
    pub fn kind(self) -> ErrorKind {
        match self {
            ErrorCode::TokenInvalid | ErrorCode::BillingStatusInvalid => ErrorKind::Validation,
            ErrorCode::PublicKeyInvalid | ErrorCode::SignatureInvalid => ErrorKind::Signature,
            ErrorCode::BillingStatusChangeNotAllowed => ErrorKind::Policy,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCode::TokenInvalid => "token invalid",
            ErrorCode::PublicKeyInvalid => "public key invalid",
            ErrorCode::SignatureInvalid => "signature invalid",
            ErrorCode::BillingStatusChangeNotAllowed => "billing status change not allowed",
            ErrorCode::BillingStatusInvalid => "billing status invalid",
        })
    }
}

/// Error classes. None of them are retried by the plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Bad public key or signature.
    Signature,
    /// A business rule rejected the request.
    Policy,
    /// The record does not exist.
    NotFound,
    /// Stored data failed verification.
    Integrity,
    /// An upstream invariant was violated.
    Internal,
    /// A collaborator failed.
    Backend,
}

/// A user error reported back to the command caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginError {
    /// Plugin that raised the error
    pub plugin_id: String,
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable context
    pub context: String,
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} plugin error {} ({})",
            self.plugin_id,
            self.code.code(),
            self.code
        )?;
        if !self.context.is_empty() {
            write!(f, ": {}", self.context)?;
        }
        Ok(())
    }
}

/// Pi plugin errors.
#[derive(Debug, Error)]
pub enum PiError {
    /// User error with a machine-readable code.
    #[error("{0}")]
    Plugin(PluginError),

    /// Command payload could not be decoded.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Command id is not handled by this plugin.
    #[error("Invalid plugin command: {0}")]
    InvalidCommand(String),

    /// Record is absent from the backend.
    #[error("Record not found: {token}")]
    RecordNotFound {
        /// Requested token
        token: Token,
    },

    /// Blob carries a different data descriptor than expected.
    #[error("Unexpected data descriptor: got {got}, want {want}")]
    UnexpectedDescriptor {
        /// Descriptor found in the blob
        got: String,
        /// Descriptor expected
        want: String,
    },

    /// Blob payload digest does not match the stored digest.
    #[error("Data is not coherent: got digest {got}, want {want}")]
    Integrity {
        /// Digest recomputed over the payload
        got: String,
        /// Digest stored alongside the payload
        want: String,
    },

    /// Stored envelope or file could not be decoded.
    #[error("Corrupt blob: {0}")]
    CorruptBlob(String),

    /// Inputs that no status rule can classify.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Collaborator failure.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Reply could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid plugin configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PiError {
    /// Build a user error.
    pub fn plugin(plugin_id: &str, code: ErrorCode, context: impl Into<String>) -> Self {
        PiError::Plugin(PluginError {
            plugin_id: plugin_id.to_string(),
            code,
            context: context.into(),
        })
    }

    /// Taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PiError::Plugin(e) => e.code.kind(),
            PiError::MalformedPayload(_) | PiError::InvalidCommand(_) => ErrorKind::Validation,
            PiError::RecordNotFound { .. } => ErrorKind::NotFound,
            PiError::UnexpectedDescriptor { .. }
            | PiError::Integrity { .. }
            | PiError::CorruptBlob(_) => ErrorKind::Integrity,
            PiError::Internal(_) | PiError::Serialization(_) | PiError::Config(_) => {
                ErrorKind::Internal
            }
            PiError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// User error code, if this is a user error.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            PiError::Plugin(e) => Some(e.code),
            _ => None,
        }
    }

    /// Whether the caller caused this error.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::Signature | ErrorKind::Policy
        )
    }
}

impl From<serde_json::Error> for PiError {
    fn from(err: serde_json::Error) -> Self {
        PiError::Serialization(err.to_string())
    }
}

/// Client signature verification failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Public key is not a valid Ed25519 key.
    #[error("Invalid public key: {0}")]
    PublicKeyInvalid(String),

    /// Signature is malformed or does not verify.
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),
}

impl SignatureError {
    /// Matching user error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SignatureError::PublicKeyInvalid(_) => ErrorCode::PublicKeyInvalid,
            SignatureError::SignatureInvalid(_) => ErrorCode::SignatureInvalid,
        }
    }

    /// Human-readable context.
    pub fn context(&self) -> &str {
        match self {
            SignatureError::PublicKeyInvalid(c) | SignatureError::SignatureInvalid(c) => c,
        }
    }
}

/// Host backend failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Record does not exist.
    #[error("Record not found")]
    NotFound,

    /// Backend could not serve the request.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}
