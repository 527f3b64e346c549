//! JWS type definitions

use crate::api::Algorithm;
use crate::error::{JwsError, JwsResult};
use base64::{
    engine::{general_purpose::STANDARD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Protected header of a compact token.
///
/// Any JSON object decodes into a header. `alg`, `typ` and `kid` are lifted out only
/// when they are strings; every other member, including a non-string `alg`, stays in
/// `extra`. Signing requires a string `alg`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Header {
    /// Algorithm identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Media type of the complete token, `"JWT"` triggers JSON payload decoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Key ID hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Remaining header members
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Header {
    /// Header carrying only the algorithm
    #[must_use]
    pub fn new(alg: Algorithm) -> Self {
        Self {
            alg: Some(alg.to_string()),
            ..Self::default()
        }
    }

    /// Header with `"typ": "JWT"`
    #[must_use]
    pub fn jwt(alg: Algorithm) -> Self {
        Self::new(alg).with_type("JWT")
    }

    /// Set the `typ` member
    #[must_use]
    pub fn with_type(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }

    /// Set the `kid` member
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Add an arbitrary member
    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Canonical JSON text of the header
    ///
    /// # Errors
    /// Returns `JwsError::Serialization` if an extra member cannot be serialized
    pub fn to_json(&self) -> JwsResult<String> {
        serde_json::to_string(self).map_err(|e| JwsError::serialization(&e.to_string()))
    }

    /// Whether the header declares a JWT (`typ` of `"JWT"`)
    #[must_use]
    pub fn is_jwt(&self) -> bool {
        self.typ.as_deref() == Some("JWT")
    }

    /// Header from the members of a decoded JSON object
    #[must_use]
    pub fn from_members(mut members: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            alg: take_string(&mut members, "alg"),
            typ: take_string(&mut members, "typ"),
            kid: take_string(&mut members, "kid"),
            extra: members,
        }
    }
}

/// Remove `name` when it holds a string, otherwise leave it in place
fn take_string(
    members: &mut serde_json::Map<String, serde_json::Value>,
    name: &str,
) -> Option<String> {
    if !members.get(name).is_some_and(serde_json::Value::is_string) {
        return None;
    }
    match members.remove(name) {
        Some(serde_json::Value::String(value)) => Some(value),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Map::deserialize(deserializer).map(Header::from_members)
    }
}

/// Payload to be signed.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Text, converted to bytes with the caller's [`TextEncoding`]
    Text(String),
    /// Raw bytes, used verbatim
    Bytes(Vec<u8>),
    /// JSON value, serialized compactly then treated as UTF-8 text
    Json(serde_json::Value),
}

impl Payload {
    /// Bytes that end up base64url-encoded in the payload segment
    ///
    /// # Errors
    /// Returns `JwsError::Serialization` if a JSON payload cannot be serialized
    pub fn to_bytes(&self, encoding: TextEncoding) -> JwsResult<Vec<u8>> {
        match self {
            Payload::Text(text) => Ok(encoding.encode(text)),
            Payload::Bytes(bytes) => Ok(bytes.clone()),
            Payload::Json(value) => serde_json::to_string(value)
                .map(|json| encoding.encode(&json))
                .map_err(|e| JwsError::serialization(&e.to_string())),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

/// Text encodings for payload conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per code unit (also known as "binary")
    Latin1,
    /// 7-bit ASCII, high bit dropped on decode
    Ascii,
    /// UTF-16 little endian
    Utf16Le,
    /// Hexadecimal text
    Hex,
    /// Standard base64 text
    Base64,
}

impl TextEncoding {
    /// Convert text into bytes
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            // Code units above 0xFF keep only their low byte
            TextEncoding::Latin1 | TextEncoding::Ascii => {
                text.encode_utf16().map(|unit| (unit & 0xFF) as u8).collect()
            }
            TextEncoding::Utf16Le => text
                .encode_utf16()
                .flat_map(u16::to_le_bytes)
                .collect(),
            TextEncoding::Hex => decode_hex_prefix(text),
            TextEncoding::Base64 => decode_base64_lenient(text),
        }
    }

    /// Convert bytes into text
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Ascii => bytes.iter().map(|&b| char::from(b & 0x7F)).collect(),
            TextEncoding::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            TextEncoding::Hex => hex::encode(bytes),
            TextEncoding::Base64 => STANDARD.encode(bytes),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = JwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "latin1" | "binary" => Ok(TextEncoding::Latin1),
            "ascii" => Ok(TextEncoding::Ascii),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(TextEncoding::Utf16Le),
            "hex" => Ok(TextEncoding::Hex),
            "base64" => Ok(TextEncoding::Base64),
            other => Err(JwsError::serialization(&format!(
                "Unknown text encoding: {other}"
            ))),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Utf16Le => "utf16le",
            TextEncoding::Hex => "hex",
            TextEncoding::Base64 => "base64",
        };
        f.write_str(name)
    }
}

/// Hex pairs up to the first invalid one
fn decode_hex_prefix(text: &str) -> Vec<u8> {
    text.as_bytes()
        .chunks_exact(2)
        .map_while(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        })
        .collect()
}

/// Base64 in either alphabet, padding optional, foreign characters skipped
fn decode_base64_lenient(text: &str) -> Vec<u8> {
    const LENIENT: GeneralPurpose = GeneralPurpose::new(
        &base64::alphabet::STANDARD,
        GeneralPurposeConfig::new()
            .with_decode_padding_mode(DecodePaddingMode::Indifferent)
            .with_decode_allow_trailing_bits(true),
    );

    let mut cleaned: String = text
        .chars()
        .take_while(|&c| c != '=')
        .filter_map(|c| match c {
            '-' => Some('+'),
            '_' => Some('/'),
            c if c.is_ascii_alphanumeric() || c == '+' || c == '/' => Some(c),
            _ => None,
        })
        .collect();
    // A lone trailing sextet carries no complete byte
    if cleaned.len() % 4 == 1 {
        cleaned.pop();
    }
    LENIENT.decode(cleaned).unwrap_or_default()
}

/// Options for [`crate::compact::decode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Parse the payload as JSON even when `typ` is not `"JWT"`
    pub json: bool,
    /// Encoding used to turn payload bytes into text
    pub encoding: TextEncoding,
}

impl DecodeOptions {
    /// Request JSON payload parsing
    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Set the payload text encoding
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Payload of a decoded token.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    /// Payload text, verbatim
    Text(String),
    /// Payload parsed as JSON
    Json(serde_json::Value),
}

impl DecodedPayload {
    /// Payload as text, if it was not parsed as JSON
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedPayload::Text(text) => Some(text),
            DecodedPayload::Json(_) => None,
        }
    }

    /// Payload as JSON, if it was parsed
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            DecodedPayload::Text(_) => None,
            DecodedPayload::Json(value) => Some(value),
        }
    }
}

/// Result of decoding a compact token. The signature is not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// Decoded protected header
    pub header: Header,
    /// Decoded payload
    pub payload: DecodedPayload,
    /// Signature segment, still base64url-encoded
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_serializes_in_declaration_order() {
        let header = Header::jwt(Algorithm::Hs256);
        assert_eq!(
            header.to_json().expect("header serializes"),
            r#"{"alg":"HS256","typ":"JWT"}"#
        );
    }

    #[test]
    fn header_keeps_unknown_members() {
        let header: Header =
            serde_json::from_str(r#"{"alg":"ES256","cty":"example","x5t":1}"#).expect("parse");
        assert_eq!(header.alg.as_deref(), Some("ES256"));
        assert_eq!(header.extra.get("cty"), Some(&json!("example")));
        assert_eq!(header.extra.get("x5t"), Some(&json!(1)));
    }

    #[test]
    fn non_string_registered_members_stay_in_extra() {
        let header: Header =
            serde_json::from_str(r#"{"alg":1,"typ":["JWT"],"kid":"k1"}"#).expect("parse");
        assert_eq!(header.alg, None);
        assert_eq!(header.typ, None);
        assert!(!header.is_jwt());
        assert_eq!(header.kid.as_deref(), Some("k1"));
        assert_eq!(header.extra.get("alg"), Some(&json!(1)));
        assert_eq!(header.extra.get("typ"), Some(&json!(["JWT"])));
        assert_eq!(
            header.to_json().expect("header serializes"),
            r#"{"kid":"k1","alg":1,"typ":["JWT"]}"#
        );
    }

    #[test]
    fn encodings_convert_text() {
        assert_eq!(TextEncoding::Utf8.encode("é"), vec![0xC3, 0xA9]);
        assert_eq!(TextEncoding::Latin1.encode("é"), vec![0xE9]);
        assert_eq!(TextEncoding::Utf16Le.encode("A"), vec![0x41, 0x00]);
        assert_eq!(TextEncoding::Hex.encode("00ff1g"), vec![0x00, 0xFF]);
        assert_eq!(TextEncoding::Base64.encode("aGk="), b"hi".to_vec());
        assert_eq!(TextEncoding::Base64.encode("aGk"), b"hi".to_vec());
    }

    #[test]
    fn encodings_decode_bytes() {
        assert_eq!(TextEncoding::Latin1.decode(&[0xE9]), "é");
        assert_eq!(TextEncoding::Ascii.decode(&[0xC1]), "A");
        assert_eq!(TextEncoding::Hex.decode(&[0xAB, 0x01]), "ab01");
        assert_eq!(TextEncoding::Utf16Le.decode(&[0x41, 0x00, 0x42]), "A");
    }

    #[test]
    fn encoding_names_parse() {
        assert_eq!("binary".parse::<TextEncoding>(), Ok(TextEncoding::Latin1));
        assert_eq!("UTF-8".parse::<TextEncoding>(), Ok(TextEncoding::Utf8));
        assert!("ebcdic".parse::<TextEncoding>().is_err());
    }

    #[test]
    fn json_payload_is_compact() {
        let payload = Payload::from(json!({"sub": "123"}));
        assert_eq!(
            payload.to_bytes(TextEncoding::Utf8).expect("serializes"),
            br#"{"sub":"123"}"#.to_vec()
        );
    }
}
