//! ECDSA signature format conversion
//!
//! Signing primitives produce and consume an ASN.1 DER `SEQUENCE { r INTEGER, s INTEGER }`.
//! Compact tokens carry the JOSE form instead: `r || s`, each big-endian and
//! left-padded to the curve's component width (32, 48 and 66 bytes for ES256,
//! ES384 and ES512). Non-minimal DER is accepted on input; output is always
//! minimal.

use crate::api::Algorithm;
use crate::error::JwsError;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;
/// Long-form length prefix for a single length byte
const LENGTH_ONE_BYTE: u8 = 0x81;

/// Width in bytes of each of `r` and `s` for an ECDSA algorithm
///
/// # Errors
/// `InvalidAlgorithm` for non-ECDSA algorithms
pub fn component_size(algorithm: Algorithm) -> Result<usize, JwsError> {
    match algorithm {
        Algorithm::Es256 => Ok(32),
        Algorithm::Es384 => Ok(48),
        Algorithm::Es512 => Ok(66),
        other => Err(JwsError::invalid_algorithm(other.as_str())),
    }
}

/// Byte cursor over DER input
struct Reader<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    fn byte(&mut self, what: &str) -> Result<u8, JwsError> {
        let byte = self.input.get(self.offset).copied().ok_or_else(|| {
            JwsError::malformed_signature(&format!("unexpected end of input reading {what}"))
        })?;
        self.offset += 1;
        Ok(byte)
    }

    fn expect_tag(&mut self, tag: u8, what: &str) -> Result<(), JwsError> {
        if self.byte(what)? == tag {
            Ok(())
        } else {
            Err(JwsError::malformed_signature(&format!(
                "could not find expected {what}"
            )))
        }
    }

    fn length(&mut self, what: &str) -> Result<usize, JwsError> {
        match self.byte(what)? {
            LENGTH_ONE_BYTE => Ok(usize::from(self.byte(what)?)),
            short if short < 0x80 => Ok(usize::from(short)),
            _ => Err(JwsError::malformed_signature(&format!(
                "unsupported length encoding for {what}"
            ))),
        }
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], JwsError> {
        if len > self.remaining() {
            return Err(JwsError::malformed_signature(&format!(
                "{what} specified length of {len}, only {} available",
                self.remaining()
            )));
        }
        let slice = &self.input[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// One INTEGER, with its sign-padding zero removed and checked against `width`
    fn integer(&mut self, width: usize, what: &str) -> Result<&'a [u8], JwsError> {
        self.expect_tag(TAG_INTEGER, &format!("\"int\" for \"{what}\""))?;
        let len = self.length(what)?;
        if len == 0 {
            return Err(JwsError::malformed_signature(&format!(
                "\"{what}\" has zero length"
            )));
        }
        let mut value = self.take(len, what)?;
        while value.len() > width {
            match value.split_first() {
                Some((&0, rest)) => value = rest,
                _ => {
                    return Err(JwsError::malformed_signature(&format!(
                        "\"{what}\" specified length of {len}, max of {} is acceptable",
                        width + 1
                    )));
                }
            }
        }
        Ok(value)
    }
}

/// Convert a DER signature to fixed-width JOSE `r || s`
///
/// # Errors
/// `MalformedSignature` unless `der` is exactly one SEQUENCE of two INTEGERs whose
/// values fit the curve width; `InvalidAlgorithm` for non-ECDSA algorithms
pub fn der_to_jose(der: &[u8], algorithm: Algorithm) -> Result<Vec<u8>, JwsError> {
    let width = component_size(algorithm)?;
    let mut reader = Reader::new(der);

    reader.expect_tag(TAG_SEQUENCE, "\"seq\"")?;
    let seq_len = reader.length("\"seq\"")?;
    if seq_len != reader.remaining() {
        return Err(JwsError::malformed_signature(&format!(
            "\"seq\" specified length of {seq_len}, {} remaining",
            reader.remaining()
        )));
    }

    let r = reader.integer(width, "r")?;
    let s = reader.integer(width, "s")?;
    if reader.remaining() != 0 {
        return Err(JwsError::malformed_signature(
            "expected to consume entire buffer",
        ));
    }

    let mut jose = vec![0u8; 2 * width];
    jose[width - r.len()..width].copy_from_slice(r);
    jose[2 * width - s.len()..].copy_from_slice(s);
    Ok(jose)
}

/// Minimal non-negative INTEGER content for a big-endian unsigned value
fn minimal_integer(component: &[u8]) -> Vec<u8> {
    let first_significant = component
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(component.len().saturating_sub(1));
    let trimmed = &component[first_significant..];
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.first().is_some_and(|&b| b & 0x80 != 0) {
        out.push(0);
    }
    out.extend_from_slice(trimmed);
    out
}

fn push_length(out: &mut Vec<u8>, len: usize) {
    if len >= 0x80 {
        out.push(LENGTH_ONE_BYTE);
    }
    // Components never exceed 67 bytes, so one length byte always suffices
    out.push(len as u8);
}

/// Convert a fixed-width JOSE signature to minimal DER
///
/// # Errors
/// `MalformedSignature` unless `jose` is exactly twice the curve width;
/// `InvalidAlgorithm` for non-ECDSA algorithms
pub fn jose_to_der(jose: &[u8], algorithm: Algorithm) -> Result<Vec<u8>, JwsError> {
    let width = component_size(algorithm)?;
    if jose.len() != 2 * width {
        return Err(JwsError::malformed_signature(&format!(
            "\"{algorithm}\" signatures must be \"{}\" bytes, saw \"{}\"",
            2 * width,
            jose.len()
        )));
    }

    let (r, s) = jose.split_at(width);
    let r = minimal_integer(r);
    let s = minimal_integer(s);

    let content_len = 2 + r.len() + 2 + s.len();
    let mut der = Vec::with_capacity(3 + content_len);
    der.push(TAG_SEQUENCE);
    push_length(&mut der, content_len);
    der.push(TAG_INTEGER);
    push_length(&mut der, r.len());
    der.extend_from_slice(&r);
    der.push(TAG_INTEGER);
    push_length(&mut der, s.len());
    der.extend_from_slice(&s);
    Ok(der)
}
