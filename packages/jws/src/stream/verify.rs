//! Streaming verifier: key and token arrive independently

use super::barrier::{CompletionBarrier, StreamEvent, StreamState};
use crate::api::{Algorithm, AsyncJwsResult, KeyMaterial};
use crate::compact;
use crate::error::JwsResult;
use crate::types::{DecodeOptions, DecodedToken, TextEncoding};

/// Outcome of a streamed verification
#[derive(Debug, Clone, PartialEq)]
pub struct Verified {
    /// Whether the signature matched
    pub valid: bool,
    /// The token decoded with the stream's encoding, `None` if structurally invalid
    pub token: Option<DecodedToken>,
}

fn finalize(
    algorithm: Option<Algorithm>,
    encoding: TextEncoding,
    key: &KeyMaterial,
    token: &str,
) -> JwsResult<Verified> {
    let valid = compact::verify(token, algorithm.map(Algorithm::as_str), key)?;
    let token = compact::decode(token, DecodeOptions::default().with_encoding(encoding))?;
    Ok(Verified { valid, token })
}

/// Verifier fed through a key input and a token input
pub struct VerifyStream {
    algorithm: Option<Algorithm>,
    encoding: TextEncoding,
    barrier: CompletionBarrier<KeyMaterial, String, Verified>,
}

impl VerifyStream {
    fn new(algorithm: Option<Algorithm>, encoding: TextEncoding) -> Self {
        Self {
            algorithm,
            encoding,
            barrier: CompletionBarrier::new("key", "signature"),
        }
    }

    /// Append key bytes
    ///
    /// # Errors
    /// `InputClosed` once the key input has closed
    pub fn write_key(&mut self, chunk: impl AsRef<[u8]>) -> JwsResult<()> {
        self.barrier.write_first(chunk.as_ref())
    }

    /// Close the key input, finalizing if the token is already closed
    ///
    /// # Errors
    /// `InputClosed` if the key input was already closed
    pub fn end_key(&mut self) -> JwsResult<()> {
        let (algorithm, encoding) = (self.algorithm, self.encoding);
        self.barrier
            .close_first(|key, token| finalize(algorithm, encoding, &key, &token))
    }

    /// Append token text
    ///
    /// # Errors
    /// `InputClosed` once the token input has closed
    pub fn write_signature(&mut self, chunk: impl AsRef<[u8]>) -> JwsResult<()> {
        self.barrier.write_second(chunk.as_ref())
    }

    /// Close the token input, finalizing if the key is already closed
    ///
    /// # Errors
    /// `InputClosed` if the token input was already closed
    pub fn end_signature(&mut self) -> JwsResult<()> {
        let (algorithm, encoding) = (self.algorithm, self.encoding);
        self.barrier
            .close_second(|key, token| finalize(algorithm, encoding, &key, &token))
    }

    fn fill_key(&mut self, key: KeyMaterial) -> JwsResult<()> {
        let (algorithm, encoding) = (self.algorithm, self.encoding);
        self.barrier
            .fill_first(key, |key, token| finalize(algorithm, encoding, &key, &token))
    }

    fn fill_signature(&mut self, token: String) -> JwsResult<()> {
        let (algorithm, encoding) = (self.algorithm, self.encoding);
        self.barrier
            .fill_second(token, |key, token| finalize(algorithm, encoding, &key, &token))
    }

    /// Register an event listener. Events already emitted are not replayed.
    pub fn subscribe(&mut self, listener: impl FnMut(&StreamEvent<'_, Verified>) + Send + 'static) {
        self.barrier.subscribe(listener);
    }

    /// Future resolving to the verification outcome or the finalize error
    pub fn completion(&mut self) -> AsyncJwsResult<Verified> {
        self.barrier.completion()
    }

    /// `true` until finalized
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.barrier.is_readable()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.barrier.state()
    }
}

/// Options for a [`VerifyStream`]
#[derive(Default)]
pub struct VerifyStreamBuilder {
    algorithm: Option<Algorithm>,
    key: Option<KeyMaterial>,
    signature: Option<String>,
    encoding: TextEncoding,
    listeners: Vec<super::Listener<Verified>>,
}

impl VerifyStreamBuilder {
    /// Pin the algorithm; without it finalization fails with `MissingAlgorithm`
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Verification key of any accepted shape
    #[must_use]
    pub fn with_key(mut self, key: impl Into<KeyMaterial>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Public key for RSA, RSA-PSS and ECDSA
    #[must_use]
    pub fn with_public_key(self, key: impl Into<KeyMaterial>) -> Self {
        self.with_key(key)
    }

    /// Shared secret for HMAC
    #[must_use]
    pub fn with_secret(self, secret: impl Into<KeyMaterial>) -> Self {
        self.with_key(secret)
    }

    /// Whole token; the signature input closes when the stream opens
    #[must_use]
    pub fn with_signature(mut self, token: impl Into<String>) -> Self {
        self.signature = Some(token.into());
        self
    }

    /// Text encoding for the decoded payload
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Listener attached before any preset input closes
    #[must_use]
    pub fn on_event(
        mut self,
        listener: impl FnMut(&StreamEvent<'_, Verified>) + Send + 'static,
    ) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Open the stream, closing the preset key and then the preset token
    ///
    /// # Errors
    /// Never fails for a fresh stream; finalize failures are reported as events
    pub fn open(self) -> JwsResult<VerifyStream> {
        let mut stream = VerifyStream::new(self.algorithm, self.encoding);
        for listener in self.listeners {
            stream.subscribe(listener);
        }
        if let Some(key) = self.key {
            stream.fill_key(key)?;
        }
        if let Some(token) = self.signature {
            stream.fill_signature(token)?;
        }
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JwsError;
    use crate::types::{Header, Payload};
    use serde_json::json;

    fn token() -> String {
        compact::sign(
            &Header::jwt(Algorithm::Hs256),
            &Payload::from(json!({"sub": "123"})),
            &KeyMaterial::from("secret"),
            TextEncoding::Utf8,
        )
        .expect("sign")
    }

    #[tokio::test]
    async fn verifies_and_decodes() {
        let mut stream = VerifyStreamBuilder::default()
            .with_algorithm(Algorithm::Hs256)
            .with_signature(token())
            .open()
            .expect("open");
        let pending = stream.completion();
        stream.write_key("secret").expect("write");
        stream.end_key().expect("close");

        let verified = pending.await.expect("finalized");
        assert!(verified.valid);
        let decoded = verified.token.expect("decodable");
        assert_eq!(decoded.payload.as_json(), Some(&json!({"sub": "123"})));
    }

    #[tokio::test]
    async fn missing_algorithm_fails_the_stream() {
        let mut stream = VerifyStreamBuilder::default()
            .with_secret("secret")
            .with_signature(token())
            .open()
            .expect("open");
        assert_eq!(stream.state(), StreamState::Failed);
        assert_eq!(stream.completion().await, Err(JwsError::MissingAlgorithm));
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_not_an_error() {
        let mut stream = VerifyStreamBuilder::default()
            .with_algorithm(Algorithm::Hs256)
            .with_secret("wrong")
            .with_signature(token())
            .open()
            .expect("open");
        let verified = stream.completion().await.expect("finalized");
        assert!(!verified.valid);
        assert!(verified.token.is_some());
    }
}
