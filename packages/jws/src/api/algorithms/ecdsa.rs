//! ECDSA-based signing (ES256, ES384, ES512)
//!
//! The curve primitives speak ASN.1 DER; tokens carry the fixed-width JOSE form.
//! Every signature crosses [`crate::crypto::ecdsa_format`] on its way in or out.

use super::utils::{base64_url_decode, base64_url_encode};
use super::Algorithm;
use crate::api::keys::KeySource;
use crate::crypto::ecdsa_format::{der_to_jose, jose_to_der};
use crate::error::JwsError;

macro_rules! ec_curve {
    ($module:ident, $krate:ident, $alg:literal) => {
        mod $module {
            use super::{JwsError, KeySource};
            use p256::ecdsa::signature::{Signer, Verifier};
            use $krate::ecdsa::{Signature, SigningKey, VerifyingKey};
            use $krate::elliptic_curve::sec1::ToEncodedPoint;
            use $krate::pkcs8::{DecodePrivateKey, DecodePublicKey};
            use $krate::{PublicKey, SecretKey};

            fn secret_key(source: &KeySource) -> Result<SecretKey, JwsError> {
                let parsed = match source {
                    KeySource::Pem(pem) => SecretKey::from_pkcs8_pem(pem)
                        .ok()
                        .or_else(|| SecretKey::from_sec1_pem(pem).ok()),
                    KeySource::Der(der) => SecretKey::from_pkcs8_der(der)
                        .ok()
                        .or_else(|| SecretKey::from_sec1_der(der).ok())
                        .or_else(|| SecretKey::from_slice(der).ok()),
                };
                parsed.ok_or_else(|| {
                    JwsError::invalid_key(concat!("Invalid EC private key for ", $alg))
                })
            }

            fn public_key(source: &KeySource) -> Result<PublicKey, JwsError> {
                let parsed = match source {
                    KeySource::Pem(pem) => PublicKey::from_public_key_pem(pem).ok(),
                    KeySource::Der(der) => PublicKey::from_public_key_der(der)
                        .ok()
                        .or_else(|| PublicKey::from_sec1_bytes(der).ok()),
                };
                // A private key verifies through its public half
                parsed
                    .or_else(|| secret_key(source).ok().map(|secret| secret.public_key()))
                    .ok_or_else(|| {
                        JwsError::invalid_key(concat!("Invalid EC public key for ", $alg))
                    })
            }

            /// DER-encoded signature over `message`
            pub(super) fn sign_der(
                source: &KeySource,
                message: &[u8],
            ) -> Result<Vec<u8>, JwsError> {
                let secret = secret_key(source)?;
                let signing_key = SigningKey::from_bytes(&secret.to_bytes()).map_err(|e| {
                    JwsError::invalid_key(&format!("Invalid EC private key for {}: {e}", $alg))
                })?;
                let signature: Signature = signing_key.try_sign(message).map_err(|e| {
                    JwsError::invalid_key(&format!("{} signing failed: {e}", $alg))
                })?;
                Ok(signature.to_der().as_bytes().to_vec())
            }

            /// Check a DER-encoded signature; unparsable signatures are invalid, not errors
            pub(super) fn verify_der(
                source: &KeySource,
                message: &[u8],
                der: &[u8],
            ) -> Result<bool, JwsError> {
                let public = public_key(source)?;
                let verifying_key =
                    VerifyingKey::from_sec1_bytes(public.to_encoded_point(false).as_bytes())
                        .map_err(|e| {
                            JwsError::invalid_key(&format!(
                                "Invalid EC public key for {}: {e}",
                                $alg
                            ))
                        })?;
                let Ok(signature) = Signature::from_der(der) else {
                    return Ok(false);
                };
                Ok(verifying_key.verify(message, &signature).is_ok())
            }
        }
    };
}

ec_curve!(p256_curve, p256, "ES256");
ec_curve!(p384_curve, p384, "ES384");
ec_curve!(p521_curve, p521, "ES512");

/// Sign and return the base64url JOSE signature
pub(crate) fn sign(
    algorithm: Algorithm,
    source: &KeySource,
    message: &[u8],
) -> Result<String, JwsError> {
    let der = match algorithm {
        Algorithm::Es256 => p256_curve::sign_der(source, message)?,
        Algorithm::Es384 => p384_curve::sign_der(source, message)?,
        Algorithm::Es512 => p521_curve::sign_der(source, message)?,
        other => return Err(JwsError::invalid_algorithm(other.as_str())),
    };
    let jose = der_to_jose(&der, algorithm)?;
    Ok(base64_url_encode(&jose))
}

/// Verify a base64url JOSE signature.
///
/// # Errors
/// `MalformedSignature` when the signature text is not base64url or has the wrong width.
pub(crate) fn verify(
    algorithm: Algorithm,
    source: &KeySource,
    message: &[u8],
    signature: &str,
) -> Result<bool, JwsError> {
    let jose = base64_url_decode(signature)
        .map_err(|e| JwsError::malformed_signature(&format!("signature is not base64url: {e}")))?;
    let der = jose_to_der(&jose, algorithm)?;
    match algorithm {
        Algorithm::Es256 => p256_curve::verify_der(source, message, &der),
        Algorithm::Es384 => p384_curve::verify_der(source, message, &der),
        Algorithm::Es512 => p521_curve::verify_der(source, message, &der),
        other => Err(JwsError::invalid_algorithm(other.as_str())),
    }
}
