//! HMAC-based signing (HS256, HS384, HS512)

use super::utils::{base64_url_encode, constant_time_eq};
use super::ShaDigest;
use crate::error::JwsError;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

fn mac<M: Mac + hmac::digest::KeyInit>(
    secret: &[u8],
    message: &[u8],
) -> Result<Vec<u8>, JwsError> {
    let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(secret)
        .map_err(|_| JwsError::invalid_key("Invalid HMAC key"))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Keyed digest over `message`
pub(crate) fn sign(digest: ShaDigest, message: &[u8], secret: &[u8]) -> Result<Vec<u8>, JwsError> {
    match digest {
        ShaDigest::Sha256 => mac::<HmacSha256>(secret, message),
        ShaDigest::Sha384 => mac::<HmacSha384>(secret, message),
        ShaDigest::Sha512 => mac::<HmacSha512>(secret, message),
    }
}

/// Recompute the signature text and compare it with `signature` in constant time.
///
/// The comparison is over the base64url text, so differently encoded but
/// equal-valued signatures do not match.
pub(crate) fn verify(
    digest: ShaDigest,
    message: &[u8],
    signature: &str,
    secret: &[u8],
) -> Result<bool, JwsError> {
    let expected = base64_url_encode(&sign(digest, message, secret)?);
    Ok(constant_time_eq(signature.as_bytes(), expected.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // RFC 4231 test case 2
    const KEY: &[u8] = b"Jefe";
    const DATA: &[u8] = b"what do ya want for nothing?";

    #[test]
    fn hmac_sha256_matches_rfc4231() {
        let tag = sign(ShaDigest::Sha256, DATA, KEY).expect("hmac");
        assert_eq!(
            tag,
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
    }

    #[test]
    fn digest_sizes_follow_algorithm() {
        assert_eq!(sign(ShaDigest::Sha384, DATA, KEY).expect("hmac").len(), 48);
        assert_eq!(sign(ShaDigest::Sha512, DATA, KEY).expect("hmac").len(), 64);
    }

    #[test]
    fn verify_is_exact_text_match() {
        let text = base64_url_encode(&sign(ShaDigest::Sha256, DATA, KEY).expect("hmac"));
        assert!(verify(ShaDigest::Sha256, DATA, &text, KEY).expect("verify"));
        assert!(!verify(ShaDigest::Sha256, DATA, &format!("{text}="), KEY).expect("verify"));
        assert!(!verify(ShaDigest::Sha256, DATA, &text, b"Jeff").expect("verify"));
    }
}
