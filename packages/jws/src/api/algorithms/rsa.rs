//! RSA-based signing: PKCS#1 v1.5 (RS256, RS384, RS512) and PSS (PS256, PS384, PS512)
//!
//! PSS uses a salt as long as the digest output, which is what `pss::SigningKey::new`
//! and `pss::VerifyingKey::new` configure.

use super::ShaDigest;
use crate::error::JwsError;
use p256::elliptic_curve::rand_core::OsRng;
use rsa::sha2::{Sha256, Sha384, Sha512};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier};
use rsa::{pkcs1v15, pss, RsaPrivateKey, RsaPublicKey};

fn signing_failed(e: rsa::signature::Error) -> JwsError {
    JwsError::invalid_key(&format!("RSA signing failed: {e}"))
}

/// Sign with RSASSA-PKCS1-v1_5
pub(crate) fn sign_pkcs1v15(
    digest: ShaDigest,
    message: &[u8],
    key: RsaPrivateKey,
) -> Result<Vec<u8>, JwsError> {
    let signature = match digest {
        ShaDigest::Sha256 => pkcs1v15::SigningKey::<Sha256>::new(key).try_sign(message),
        ShaDigest::Sha384 => pkcs1v15::SigningKey::<Sha384>::new(key).try_sign(message),
        ShaDigest::Sha512 => pkcs1v15::SigningKey::<Sha512>::new(key).try_sign(message),
    }
    .map_err(signing_failed)?;
    Ok(signature.to_vec())
}

/// Verify RSASSA-PKCS1-v1_5; a signature of the wrong size is simply invalid
pub(crate) fn verify_pkcs1v15(
    digest: ShaDigest,
    message: &[u8],
    signature: &[u8],
    key: RsaPublicKey,
) -> bool {
    let Ok(signature) = pkcs1v15::Signature::try_from(signature) else {
        return false;
    };
    match digest {
        ShaDigest::Sha256 => pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(message, &signature),
        ShaDigest::Sha384 => pkcs1v15::VerifyingKey::<Sha384>::new(key).verify(message, &signature),
        ShaDigest::Sha512 => pkcs1v15::VerifyingKey::<Sha512>::new(key).verify(message, &signature),
    }
    .is_ok()
}

/// Sign with RSASSA-PSS, MGF1 over the same digest
pub(crate) fn sign_pss(
    digest: ShaDigest,
    message: &[u8],
    key: RsaPrivateKey,
) -> Result<Vec<u8>, JwsError> {
    let mut rng = OsRng;
    let signature = match digest {
        ShaDigest::Sha256 => {
            pss::SigningKey::<Sha256>::new(key).try_sign_with_rng(&mut rng, message)
        }
        ShaDigest::Sha384 => {
            pss::SigningKey::<Sha384>::new(key).try_sign_with_rng(&mut rng, message)
        }
        ShaDigest::Sha512 => {
            pss::SigningKey::<Sha512>::new(key).try_sign_with_rng(&mut rng, message)
        }
    }
    .map_err(signing_failed)?;
    Ok(signature.to_vec())
}

/// Verify RSASSA-PSS
pub(crate) fn verify_pss(
    digest: ShaDigest,
    message: &[u8],
    signature: &[u8],
    key: RsaPublicKey,
) -> bool {
    let Ok(signature) = pss::Signature::try_from(signature) else {
        return false;
    };
    match digest {
        ShaDigest::Sha256 => pss::VerifyingKey::<Sha256>::new(key).verify(message, &signature),
        ShaDigest::Sha384 => pss::VerifyingKey::<Sha384>::new(key).verify(message, &signature),
        ShaDigest::Sha512 => pss::VerifyingKey::<Sha512>::new(key).verify(message, &signature),
    }
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_pair() -> (RsaPrivateKey, RsaPublicKey) {
        let private = RsaPrivateKey::new(&mut OsRng, 2048).expect("generate RSA key");
        let public = private.to_public_key();
        (private, public)
    }

    #[test]
    fn pkcs1v15_round_trip_and_tamper() {
        let (private, public) = key_pair();
        let signature =
            sign_pkcs1v15(ShaDigest::Sha384, b"payload", private).expect("sign");
        assert_eq!(signature.len(), 256);
        assert!(verify_pkcs1v15(ShaDigest::Sha384, b"payload", &signature, public.clone()));
        assert!(!verify_pkcs1v15(ShaDigest::Sha384, b"payloae", &signature, public.clone()));
        assert!(!verify_pkcs1v15(ShaDigest::Sha256, b"payload", &signature, public));
    }

    #[test]
    fn pss_round_trip_is_randomized() {
        let (private, public) = key_pair();
        let first = sign_pss(ShaDigest::Sha256, b"payload", private.clone()).expect("sign");
        let second = sign_pss(ShaDigest::Sha256, b"payload", private).expect("sign");
        assert_ne!(first, second);
        assert!(verify_pss(ShaDigest::Sha256, b"payload", &first, public.clone()));
        assert!(verify_pss(ShaDigest::Sha256, b"payload", &second, public.clone()));
        assert!(!verify_pss(ShaDigest::Sha256, b"other", &first, public));
    }

    #[test]
    fn truncated_signature_is_rejected_not_an_error() {
        let (_, public) = key_pair();
        assert!(!verify_pkcs1v15(ShaDigest::Sha256, b"payload", &[1, 2, 3], public.clone()));
        assert!(!verify_pss(ShaDigest::Sha256, b"payload", &[], public));
    }
}
