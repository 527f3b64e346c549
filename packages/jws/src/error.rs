//! JWS error types

use thiserror::Error;

/// JWS operation result type
pub type JwsResult<T> = Result<T, JwsError>;

/// JWS error types
///
/// Signature mismatches are not errors: `verify` reports them as `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwsError {
    /// Identifier outside the closed algorithm set
    #[error("\"{0}\" is not a valid algorithm.\n  Supported algorithms are:\n  \"HS256\", \"HS384\", \"HS512\", \"RS256\", \"RS384\", \"RS512\", \"PS256\", \"PS384\", \"PS512\", \"ES256\", \"ES384\", \"ES512\" and \"none\".")]
    InvalidAlgorithm(String),

    /// Key material shape not accepted by the selected family and operation
    #[error("{algorithm} key must be {expected}")]
    InvalidKeyType {
        /// Algorithm the key was offered to
        algorithm: String,
        /// Human readable list of accepted shapes
        expected: &'static str,
    },

    /// Key shape was accepted but its contents could not be parsed
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// DER or JOSE signature bytes that cannot be converted
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// Verification attempted without pinning an algorithm
    #[error("Missing algorithm parameter for jws.verify")]
    MissingAlgorithm,

    /// Header or payload (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Write or close on an input that is already closed
    #[error("Input already closed: {0}")]
    InputClosed(&'static str),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JwsError {
    /// Create an invalid algorithm error
    #[inline]
    #[must_use]
    pub fn invalid_algorithm(alg: &str) -> Self {
        JwsError::InvalidAlgorithm(alg.to_string())
    }

    /// Create an invalid key type error
    #[inline]
    #[must_use]
    pub fn invalid_key_type(algorithm: &str, expected: &'static str) -> Self {
        JwsError::InvalidKeyType {
            algorithm: algorithm.to_string(),
            expected,
        }
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: &str) -> Self {
        JwsError::InvalidKey(msg.to_string())
    }

    /// Create a malformed signature error
    #[inline]
    #[must_use]
    pub fn malformed_signature(msg: &str) -> Self {
        JwsError::MalformedSignature(msg.to_string())
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(msg: &str) -> Self {
        JwsError::Serialization(msg.to_string())
    }

    /// Create an internal error
    #[inline]
    #[must_use]
    pub fn internal(msg: &str) -> Self {
        JwsError::Internal(msg.to_string())
    }
}
