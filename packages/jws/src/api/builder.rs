//! Builder API - entry point and configuration methods

use super::algorithms::{create_algorithm, Algorithm, AlgorithmPair, Family};
use super::keys::{self, KeyMaterial};
use super::validation::AsyncJwsResult;
use crate::compact;
use crate::error::{JwsError, JwsResult};
use crate::stream::{SignStreamBuilder, VerifyStreamBuilder};
use crate::types::{DecodeOptions, DecodedToken, Header, Payload, TextEncoding};
use tokio::sync::oneshot;

/// Direct entry point
pub struct Jws;

impl Jws {
    /// Create a new builder
    #[inline]
    #[must_use]
    pub fn builder() -> JwsBuilder {
        JwsBuilder::new()
    }

    /// Configure a streaming signer
    #[inline]
    #[must_use]
    pub fn sign_stream() -> SignStreamBuilder {
        SignStreamBuilder::default()
    }

    /// Configure a streaming verifier
    #[inline]
    #[must_use]
    pub fn verify_stream() -> VerifyStreamBuilder {
        VerifyStreamBuilder::default()
    }

    /// Sign/verify pair for an algorithm identifier
    ///
    /// # Errors
    /// `InvalidAlgorithm` for identifiers outside the supported set
    #[inline]
    pub fn algorithm(identifier: &str) -> JwsResult<AlgorithmPair> {
        create_algorithm(identifier)
    }
}

/// Fluent configuration for one-shot sign, verify and decode
#[derive(Debug, Clone, Default)]
pub struct JwsBuilder {
    pub(crate) algorithm: Option<Algorithm>,
    pub(crate) header: Option<Header>,
    pub(crate) key: Option<KeyMaterial>,
    pub(crate) encoding: TextEncoding,
    pub(crate) json_payload: bool,
}

impl JwsBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Algorithm used to sign (when the header names none) and pinned for verify
    #[inline]
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Protected header for signing
    #[inline]
    #[must_use]
    pub fn with_header(mut self, header: Header) -> Self {
        self.header = Some(header);
        self
    }

    /// Key of any shape
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<KeyMaterial>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set secret for HMAC algorithms
    #[inline]
    #[must_use]
    pub fn with_secret(self, secret: impl Into<KeyMaterial>) -> Self {
        self.with_key(secret)
    }

    /// Set private key for signing
    #[inline]
    #[must_use]
    pub fn with_private_key(self, key: impl Into<KeyMaterial>) -> Self {
        self.with_key(key)
    }

    /// Set public key for verification
    #[inline]
    #[must_use]
    pub fn with_public_key(self, key: impl Into<KeyMaterial>) -> Self {
        self.with_key(key)
    }

    /// Text encoding for payloads
    #[inline]
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Parse decoded payloads as JSON regardless of `typ`
    #[inline]
    #[must_use]
    pub fn with_json_payload(mut self, json: bool) -> Self {
        self.json_payload = json;
        self
    }

    fn signing_header(&self) -> JwsResult<Header> {
        let mut header = self.header.clone().unwrap_or_default();
        if header.alg.is_none() {
            match self.algorithm {
                Some(algorithm) => header.alg = Some(algorithm.to_string()),
                None => return Err(JwsError::invalid_algorithm("")),
            }
        }
        Ok(header)
    }

    /// The configured key, or an empty one for `none`
    fn key_for(&self, algorithm: Algorithm, signing: bool) -> JwsResult<KeyMaterial> {
        match (&self.key, algorithm.family()) {
            (Some(key), _) => Ok(key.clone()),
            (None, Family::None) => Ok(KeyMaterial::Bytes(Vec::new())),
            (None, _) => Err(keys::missing_key(algorithm, signing)),
        }
    }

    /// Sign a payload into a compact token
    ///
    /// # Errors
    /// `InvalidAlgorithm` when neither header nor builder names a supported algorithm,
    /// `InvalidKeyType`/`InvalidKey` for missing or unusable keys
    pub fn sign(&self, payload: impl Into<Payload>) -> JwsResult<String> {
        let header = self.signing_header()?;
        let algorithm = create_algorithm(header.alg.as_deref().unwrap_or_default())?.algorithm();
        let key = self.key_for(algorithm, true)?;
        compact::sign(&header, &payload.into(), &key, self.encoding)
    }

    /// Verify a token against the pinned algorithm. The token's own `alg` is ignored.
    ///
    /// # Errors
    /// `MissingAlgorithm` unless `with_algorithm` was called, key errors as for `sign`
    pub fn verify(&self, token: &str) -> JwsResult<bool> {
        let algorithm = self.algorithm.ok_or(JwsError::MissingAlgorithm)?;
        let key = self.key_for(algorithm, false)?;
        compact::verify(token, Some(algorithm.as_str()), &key)
    }

    /// Decode without verifying
    ///
    /// # Errors
    /// `Serialization` when a JSON payload was expected and could not be parsed
    pub fn decode(&self, token: &str) -> JwsResult<Option<DecodedToken>> {
        compact::decode(
            token,
            DecodeOptions::default()
                .json(self.json_payload)
                .with_encoding(self.encoding),
        )
    }

    /// Sign on a spawned task - returns `AsyncJwsResult`
    ///
    /// Must be called from within a tokio runtime.
    pub fn sign_async(self, payload: impl Into<Payload>) -> AsyncJwsResult<String> {
        let payload = payload.into();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let result = self.sign(payload);
            let _ = tx.send(result);
        });

        AsyncJwsResult::new(rx)
    }

    /// Verify on a spawned task - returns `AsyncJwsResult`
    ///
    /// Must be called from within a tokio runtime.
    pub fn verify_async(self, token: impl Into<String>) -> AsyncJwsResult<bool> {
        let token = token.into();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let result = self.verify(&token);
            let _ = tx.send(result);
        });

        AsyncJwsResult::new(rx)
    }
}
