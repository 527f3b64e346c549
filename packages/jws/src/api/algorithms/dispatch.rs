//! Per-family dispatch of sign and verify
//!
//! Every family is matched exhaustively; adding an algorithm without wiring it
//! here is a compile error.

use super::utils::{base64_url_decode, base64_url_encode};
use super::{ecdsa, hmac, rsa, Algorithm, Family, ShaDigest};
use crate::api::keys::{self, KeyMaterial};
use crate::error::JwsError;

fn digest_of(algorithm: Algorithm) -> Result<ShaDigest, JwsError> {
    algorithm
        .digest()
        .ok_or_else(|| JwsError::internal("algorithm without digest reached a keyed family"))
}

/// Sign `message`, returning base64url signature text
pub(crate) fn sign(
    algorithm: Algorithm,
    message: &[u8],
    key: &KeyMaterial,
) -> Result<String, JwsError> {
    tracing::trace!(algorithm = %algorithm, "signing secured input");
    match algorithm.family() {
        Family::Hs => {
            let secret = keys::secret_key(algorithm, key)?;
            let tag = hmac::sign(digest_of(algorithm)?, message, &secret)?;
            Ok(base64_url_encode(&tag))
        }
        Family::Rs => {
            let source = keys::signing_key(algorithm, key)?;
            let private_key = keys::rsa_private_key(&source)?;
            let signature = rsa::sign_pkcs1v15(digest_of(algorithm)?, message, private_key)?;
            Ok(base64_url_encode(&signature))
        }
        Family::Ps => {
            let source = keys::signing_key(algorithm, key)?;
            let private_key = keys::rsa_private_key(&source)?;
            let signature = rsa::sign_pss(digest_of(algorithm)?, message, private_key)?;
            Ok(base64_url_encode(&signature))
        }
        Family::Es => {
            let source = keys::signing_key(algorithm, key)?;
            ecdsa::sign(algorithm, &source, message)
        }
        // Unsecured: the key is ignored, not validated
        Family::None => Ok(String::new()),
    }
}

/// Verify base64url `signature` over `message`
pub(crate) fn verify(
    algorithm: Algorithm,
    message: &[u8],
    signature: &str,
    key: &KeyMaterial,
) -> Result<bool, JwsError> {
    tracing::trace!(algorithm = %algorithm, "verifying secured input");
    let valid = match algorithm.family() {
        Family::Hs => {
            let secret = keys::secret_key(algorithm, key)?;
            hmac::verify(digest_of(algorithm)?, message, signature, &secret)?
        }
        Family::Rs => {
            let source = keys::verifying_key(algorithm, key)?;
            let public_key = keys::rsa_public_key(&source)?;
            match base64_url_decode(signature) {
                Ok(bytes) => {
                    rsa::verify_pkcs1v15(digest_of(algorithm)?, message, &bytes, public_key)
                }
                Err(_) => false,
            }
        }
        Family::Ps => {
            let source = keys::verifying_key(algorithm, key)?;
            let public_key = keys::rsa_public_key(&source)?;
            match base64_url_decode(signature) {
                Ok(bytes) => rsa::verify_pss(digest_of(algorithm)?, message, &bytes, public_key),
                Err(_) => false,
            }
        }
        Family::Es => {
            let source = keys::verifying_key(algorithm, key)?;
            ecdsa::verify(algorithm, &source, message, signature)?
        }
        Family::None => signature.is_empty(),
    };
    tracing::debug!(algorithm = %algorithm, valid, "signature checked");
    Ok(valid)
}
