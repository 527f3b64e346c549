//! Streaming signer: key and payload arrive independently, the token is produced once both close

use super::barrier::{CompletionBarrier, StreamEvent, StreamState};
use crate::api::{Algorithm, AsyncJwsResult, KeyMaterial};
use crate::compact;
use crate::error::JwsResult;
use crate::types::{Header, Payload, TextEncoding};

/// Signer fed through two inputs; finalizes into a compact token
///
/// Streamed payload chunks are signed as raw bytes. A payload supplied whole through
/// [`SignStreamBuilder::with_payload`] keeps its shape (text is encoded with the
/// configured [`TextEncoding`]).
pub struct SignStream {
    header: Header,
    encoding: TextEncoding,
    barrier: CompletionBarrier<KeyMaterial, Payload, String>,
}

impl SignStream {
    fn new(header: Header, encoding: TextEncoding) -> Self {
        Self {
            header,
            encoding,
            barrier: CompletionBarrier::new("key", "payload"),
        }
    }

    /// Append key bytes
    ///
    /// # Errors
    /// `InputClosed` once the key input has closed
    pub fn write_key(&mut self, chunk: impl AsRef<[u8]>) -> JwsResult<()> {
        self.barrier.write_first(chunk.as_ref())
    }

    /// Close the key input, finalizing if the payload is already closed
    ///
    /// Finalization failures are reported as events, not returned.
    ///
    /// # Errors
    /// `InputClosed` if the key input was already closed
    pub fn end_key(&mut self) -> JwsResult<()> {
        let (header, encoding) = (&self.header, self.encoding);
        self.barrier
            .close_first(|key, payload| compact::sign(header, &payload, &key, encoding))
    }

    /// Append payload bytes
    ///
    /// # Errors
    /// `InputClosed` once the payload input has closed
    pub fn write_payload(&mut self, chunk: impl AsRef<[u8]>) -> JwsResult<()> {
        self.barrier.write_second(chunk.as_ref())
    }

    /// Close the payload input, finalizing if the key is already closed
    ///
    /// # Errors
    /// `InputClosed` if the payload input was already closed
    pub fn end_payload(&mut self) -> JwsResult<()> {
        let (header, encoding) = (&self.header, self.encoding);
        self.barrier
            .close_second(|key, payload| compact::sign(header, &payload, &key, encoding))
    }

    fn fill_key(&mut self, key: KeyMaterial) -> JwsResult<()> {
        let (header, encoding) = (&self.header, self.encoding);
        self.barrier
            .fill_first(key, |key, payload| compact::sign(header, &payload, &key, encoding))
    }

    fn fill_payload(&mut self, payload: Payload) -> JwsResult<()> {
        let (header, encoding) = (&self.header, self.encoding);
        self.barrier
            .fill_second(payload, |key, payload| compact::sign(header, &payload, &key, encoding))
    }

    /// Register an event listener. Events already emitted are not replayed.
    pub fn subscribe(&mut self, listener: impl FnMut(&StreamEvent<'_, String>) + Send + 'static) {
        self.barrier.subscribe(listener);
    }

    /// Future resolving to the token or the finalize error
    pub fn completion(&mut self) -> AsyncJwsResult<String> {
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

/// Options for a [`SignStream`]
#[derive(Default)]
pub struct SignStreamBuilder {
    header: Header,
    key: Option<KeyMaterial>,
    payload: Option<Payload>,
    encoding: TextEncoding,
    listeners: Vec<super::Listener<String>>,
}

impl SignStreamBuilder {
    /// Protected header; must carry `alg` unless [`with_algorithm`](Self::with_algorithm) is used
    #[must_use]
    pub fn with_header(mut self, header: Header) -> Self {
        self.header = header;
        self
    }

    /// Algorithm, used when the header does not name one
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.header.alg.get_or_insert_with(|| algorithm.to_string());
        self
    }

    /// Signing key of any accepted shape
    #[must_use]
    pub fn with_key(mut self, key: impl Into<KeyMaterial>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Shared secret for HMAC
    #[must_use]
    pub fn with_secret(self, secret: impl Into<KeyMaterial>) -> Self {
        self.with_key(secret)
    }

    /// Private key for RSA, RSA-PSS and ECDSA
    #[must_use]
    pub fn with_private_key(self, key: impl Into<KeyMaterial>) -> Self {
        self.with_key(key)
    }

    /// Whole payload; the payload input closes when the stream opens
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Text encoding for text payloads
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Listener attached before any preset input closes
    #[must_use]
    pub fn on_event(
        mut self,
        listener: impl FnMut(&StreamEvent<'_, String>) + Send + 'static,
    ) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Open the stream, closing the preset key and then the preset payload
    ///
    /// # Errors
    /// Never fails for a fresh stream; finalize failures are reported as events
    pub fn open(self) -> JwsResult<SignStream> {
        let mut stream = SignStream::new(self.header, self.encoding);
        for listener in self.listeners {
            stream.subscribe(listener);
        }
        if let Some(key) = self.key {
            stream.fill_key(key)?;
        }
        if let Some(payload) = self.payload {
            stream.fill_payload(payload)?;
        }
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JwsError;
    use std::sync::{Arc, Mutex};

    #[test]
    fn preset_inputs_finalize_on_open() {
        let tokens = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&tokens);
        let stream = SignStreamBuilder::default()
            .with_algorithm(Algorithm::Hs256)
            .with_secret("secret")
            .with_payload("hello")
            .on_event(move |event| {
                if let StreamEvent::Done(token) = event {
                    sink.lock().expect("lock").push(token.to_string());
                }
            })
            .open()
            .expect("open");

        assert_eq!(stream.state(), StreamState::Done);
        let tokens = tokens.lock().expect("lock");
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            compact::verify(&tokens[0], Some("HS256"), &"secret".into()),
            Ok(true),
        );
    }

    #[test]
    fn header_alg_wins_over_with_algorithm() {
        let stream = SignStreamBuilder::default()
            .with_header(Header::new(Algorithm::Hs512))
            .with_algorithm(Algorithm::Hs256)
            .open()
            .expect("open");
        assert_eq!(stream.header.alg.as_deref(), Some("HS512"));
    }

    #[test]
    fn writes_after_close_are_rejected() {
        let mut stream = SignStreamBuilder::default()
            .with_algorithm(Algorithm::Hs256)
            .with_payload("preset")
            .open()
            .expect("open");
        assert_eq!(
            stream.write_payload("late"),
            Err(JwsError::InputClosed("payload")),
        );
        stream.write_key("secret").expect("key open");
        stream.end_key().expect("close key");
        assert!(!stream.is_readable());
        assert_eq!(stream.end_key(), Err(JwsError::InputClosed("key")));
    }
}
