//! Compact serialization: `BASE64URL(header) "." BASE64URL(payload) "." BASE64URL(signature)`

use crate::api::algorithms::utils::{base64_url_decode, base64_url_encode};
use crate::api::{create_algorithm, KeyMaterial};
use crate::error::{JwsError, JwsResult};
use crate::types::{DecodeOptions, DecodedPayload, DecodedToken, Header, Payload, TextEncoding};

/// `[A-Za-z0-9_-]*`
fn is_segment(segment: &str) -> bool {
    segment
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Exactly three well-formed segments
fn split_segments(token: &str) -> Option<(&str, &str, &str)> {
    let mut parts = token.split('.');
    let header = parts.next()?;
    let payload = parts.next()?;
    let signature = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    [header, payload, signature]
        .iter()
        .all(|segment| is_segment(segment))
        .then_some((header, payload, signature))
}

/// Header segment that decodes to a JSON object
fn decode_header(segment: &str) -> Option<Header> {
    let bytes = base64_url_decode(segment).ok()?;
    match serde_json::from_slice::<serde_json::Value>(&bytes).ok()? {
        serde_json::Value::Object(members) => Some(Header::from_members(members)),
        _ => None,
    }
}

/// Text that is signed: `BASE64URL(header) "." BASE64URL(payload)`
///
/// The header is always serialized as UTF-8 JSON; `encoding` applies to text payloads only.
///
/// # Errors
/// `Serialization` if the header or a JSON payload cannot be serialized
pub fn secured_input(
    header: &Header,
    payload: &Payload,
    encoding: TextEncoding,
) -> JwsResult<String> {
    let header_json = header.to_json()?;
    let payload_bytes = payload.to_bytes(encoding)?;
    Ok(format!(
        "{}.{}",
        base64_url_encode(header_json.as_bytes()),
        base64_url_encode(&payload_bytes)
    ))
}

/// Produce a compact token signed with the algorithm named by `header.alg`
///
/// # Errors
/// `InvalidAlgorithm` when `alg` is absent or unknown, key errors from the selected family
pub fn sign(
    header: &Header,
    payload: &Payload,
    key: &KeyMaterial,
    encoding: TextEncoding,
) -> JwsResult<String> {
    let pair = create_algorithm(header.alg.as_deref().unwrap_or_default())?;
    let input = secured_input(header, payload, encoding)?;
    let signature = pair.sign(&input, key)?;
    tracing::debug!(algorithm = %pair.algorithm(), "token signed");
    Ok(format!("{input}.{signature}"))
}

/// Split and decode a token without checking its signature
///
/// Returns `Ok(None)` for tokens that are not three `[A-Za-z0-9_-]*` segments or whose
/// header is not a JSON object. The payload is parsed as JSON when the header's `typ`
/// is `"JWT"` or `options.json` is set.
///
/// # Errors
/// `Serialization` when JSON parsing of the payload was required and failed
pub fn decode(token: &str, options: DecodeOptions) -> JwsResult<Option<DecodedToken>> {
    let Some((header_segment, payload_segment, signature)) = split_segments(token) else {
        return Ok(None);
    };
    let Some(header) = decode_header(header_segment) else {
        return Ok(None);
    };
    let Ok(payload_bytes) = base64_url_decode(payload_segment) else {
        return Ok(None);
    };

    let text = options.encoding.decode(&payload_bytes);
    let payload = if header.is_jwt() || options.json {
        let value = serde_json::from_str(&text).map_err(|e| {
            JwsError::serialization(&format!("payload is not valid JSON: {e}"))
        })?;
        DecodedPayload::Json(value)
    } else {
        DecodedPayload::Text(text)
    };

    Ok(Some(DecodedToken {
        header,
        payload,
        signature: signature.to_string(),
    }))
}

/// Check a token's signature with a caller-pinned algorithm
///
/// The header is not consulted: the secured input and the signature are taken by position.
/// A token without a third segment is `Ok(false)`.
///
/// # Errors
/// `MissingAlgorithm` when `algorithm` is absent or empty, `InvalidAlgorithm` when unknown,
/// key and signature-format errors from the selected family
pub fn verify(token: &str, algorithm: Option<&str>, key: &KeyMaterial) -> JwsResult<bool> {
    let algorithm = match algorithm {
        Some(alg) if !alg.is_empty() => alg,
        _ => return Err(JwsError::MissingAlgorithm),
    };
    let pair = create_algorithm(algorithm)?;

    let mut parts = token.splitn(3, '.');
    let (Some(header), Some(payload)) = (parts.next(), parts.next()) else {
        return Ok(false);
    };
    let Some(signature) = parts.next().and_then(|rest| rest.split('.').next()) else {
        return Ok(false);
    };

    pair.verify(&format!("{header}.{payload}"), signature, key)
}

/// Syntax and header-decodability check, independent of the signature
#[must_use]
pub fn is_valid(token: &str) -> bool {
    split_segments(token)
        .and_then(|(header, _, _)| decode_header(header))
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Algorithm;
    use serde_json::json;

    const HS256_INPUT: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjMifQ";

    fn hs256_token(secret: &str) -> String {
        sign(
            &Header::jwt(Algorithm::Hs256),
            &Payload::from(json!({"sub": "123"})),
            &KeyMaterial::from(secret),
            TextEncoding::Utf8,
        )
        .expect("sign")
    }

    #[test]
    fn hs256_scenario() {
        let token = hs256_token("secret");
        assert!(token.starts_with(&format!("{HS256_INPUT}.")));
        assert_eq!(verify(&token, Some("HS256"), &"secret".into()), Ok(true));
        assert_eq!(verify(&token, Some("HS256"), &"wrong".into()), Ok(false));
    }

    #[test]
    fn verify_requires_pinned_algorithm() {
        let token = hs256_token("secret");
        assert_eq!(
            verify(&token, None, &"secret".into()),
            Err(JwsError::MissingAlgorithm),
        );
        assert_eq!(
            verify(&token, Some(""), &"secret".into()),
            Err(JwsError::MissingAlgorithm),
        );
        assert_eq!(
            verify(&token, Some("HS257"), &"secret".into()),
            Err(JwsError::invalid_algorithm("HS257"))
        );
    }

    #[test]
    fn verify_without_signature_segment_is_false() {
        assert_eq!(
            verify(HS256_INPUT, Some("HS256"), &"secret".into()),
            Ok(false),
        );
    }

    #[test]
    fn sign_without_alg_is_rejected() {
        let result = sign(
            &Header::default(),
            &Payload::from("x"),
            &KeyMaterial::from("secret"),
            TextEncoding::Utf8,
        );
        assert_eq!(result, Err(JwsError::invalid_algorithm("")));
    }

    #[test]
    fn decode_parses_jwt_payload() {
        let token = hs256_token("secret");
        let decoded = decode(&token, DecodeOptions::default())
            .expect("decode")
            .expect("structurally valid");
        assert_eq!(decoded.header.alg.as_deref(), Some("HS256"));
        assert_eq!(decoded.payload.as_json(), Some(&json!({"sub": "123"})));
        assert_eq!(Some(decoded.signature.as_str()), token.rsplit('.').next());
    }

    #[test]
    fn decode_keeps_plain_payload_as_text() {
        let token = sign(
            &Header::new(Algorithm::None),
            &Payload::from("hello"),
            &KeyMaterial::from(""),
            TextEncoding::Utf8,
        )
        .expect("sign");
        assert!(token.ends_with('.'));
        let decoded = decode(&token, DecodeOptions::default()).expect("decode").expect("valid");
        assert_eq!(decoded.payload.as_text(), Some("hello"));
        assert_eq!(decoded.signature, "");

        let forced = decode(&token, DecodeOptions::default().json(true));
        assert!(matches!(forced, Err(JwsError::Serialization(_))));
    }

    #[test]
    fn decode_rejects_structurally_invalid_tokens() {
        let not_object = base64_url_encode(b"[1,2]");
        let cases = [
            "".to_string(),
            "a.b".to_string(),
            "a.b.c.d".to_string(),
            format!("{HS256_INPUT}.sig+nature"),
            format!("{not_object}.e30.sig"),
            "abc.def.ghi".to_string(),
        ];
        for token in &cases {
            assert_eq!(decode(token, DecodeOptions::default()), Ok(None), "{token}");
            assert!(!is_valid(token), "{token}");
        }
    }

    #[test]
    fn is_valid_accepts_json_object_header() {
        assert!(is_valid(&hs256_token("secret")));
        assert!(is_valid(&format!("{}.def.ghi", base64_url_encode(b"{}"))));
    }

    #[test]
    fn header_members_of_any_type_are_accepted() {
        for header in [r#"{"alg":1}"#, r#"{"typ":["JWT"]}"#, r#"{"kid":7,"alg":"HS256"}"#] {
            let token = format!("{}.e30.", base64_url_encode(header.as_bytes()));
            assert!(is_valid(&token), "{header}");
            let decoded = decode(&token, DecodeOptions::default())
                .expect("decode")
                .expect("structurally valid");
            assert_eq!(decoded.payload.as_text(), Some("{}"));
        }

        let token = format!("{}.e30.", base64_url_encode(br#"{"alg":1}"#));
        let decoded = decode(&token, DecodeOptions::default()).expect("decode").expect("valid");
        assert_eq!(decoded.header.alg, None);
        assert_eq!(decoded.header.extra.get("alg"), Some(&json!(1)));
    }

    #[test]
    fn latin1_payload_encoding() {
        let header = Header::new(Algorithm::Hs256);
        let input =
            secured_input(&header, &Payload::from("é"), TextEncoding::Latin1).expect("input");
        assert!(input.ends_with(".6Q"));
        let utf8 = secured_input(&header, &Payload::from("é"), TextEncoding::Utf8).expect("input");
        assert!(utf8.ends_with(".w6k"));
    }
}
