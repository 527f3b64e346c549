//! JWS algorithm dispatch
//!
//! A closed set of algorithm identifiers, each carrying its family and digest
//! size. [`create_algorithm`] turns an identifier into an [`AlgorithmPair`]
//! bound to that algorithm's sign/verify operations and key-shape rules.

mod dispatch;
mod ecdsa;
mod hmac;
mod rsa;
pub(crate) mod utils;

use crate::api::keys::KeyMaterial;
use crate::error::{JwsError, JwsResult};
use std::{fmt, str::FromStr};

/// Algorithm family, independent of digest size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// HMAC with SHA-2
    Hs,
    /// RSASSA-PKCS1-v1_5 with SHA-2
    Rs,
    /// RSASSA-PSS with SHA-2
    Ps,
    /// ECDSA with SHA-2
    Es,
    /// Unsecured
    None,
}

impl Family {
    /// Whether the family uses a public/private key pair
    #[must_use]
    pub fn is_asymmetric(self) -> bool {
        matches!(self, Family::Rs | Family::Ps | Family::Es)
    }
}

/// SHA-2 digest used by a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaDigest {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl ShaDigest {
    /// Digest size in bits
    #[must_use]
    pub fn bits(self) -> u16 {
        match self {
            ShaDigest::Sha256 => 256,
            ShaDigest::Sha384 => 384,
            ShaDigest::Sha512 => 512,
        }
    }
}

/// Supported algorithm identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// HMAC using SHA-256
    Hs256,
    /// HMAC using SHA-384
    Hs384,
    /// HMAC using SHA-512
    Hs512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    Rs512,
    /// RSASSA-PSS using SHA-256
    Ps256,
    /// RSASSA-PSS using SHA-384
    Ps384,
    /// RSASSA-PSS using SHA-512
    Ps512,
    /// ECDSA using P-256 and SHA-256
    Es256,
    /// ECDSA using P-384 and SHA-384
    Es384,
    /// ECDSA using P-521 and SHA-512
    Es512,
    /// No digital signature or MAC
    None,
}

impl Algorithm {
    /// Every supported algorithm
    pub const ALL: [Algorithm; 13] = [
        Algorithm::Hs256,
        Algorithm::Hs384,
        Algorithm::Hs512,
        Algorithm::Rs256,
        Algorithm::Rs384,
        Algorithm::Rs512,
        Algorithm::Ps256,
        Algorithm::Ps384,
        Algorithm::Ps512,
        Algorithm::Es256,
        Algorithm::Es384,
        Algorithm::Es512,
        Algorithm::None,
    ];

    /// Identifier as it appears in the `alg` header
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Hs256 => "HS256",
            Algorithm::Hs384 => "HS384",
            Algorithm::Hs512 => "HS512",
            Algorithm::Rs256 => "RS256",
            Algorithm::Rs384 => "RS384",
            Algorithm::Rs512 => "RS512",
            Algorithm::Ps256 => "PS256",
            Algorithm::Ps384 => "PS384",
            Algorithm::Ps512 => "PS512",
            Algorithm::Es256 => "ES256",
            Algorithm::Es384 => "ES384",
            Algorithm::Es512 => "ES512",
            Algorithm::None => "none",
        }
    }

    /// Algorithm family
    #[must_use]
    pub fn family(self) -> Family {
        match self {
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => Family::Hs,
            Algorithm::Rs256 | Algorithm::Rs384 | Algorithm::Rs512 => Family::Rs,
            Algorithm::Ps256 | Algorithm::Ps384 | Algorithm::Ps512 => Family::Ps,
            Algorithm::Es256 | Algorithm::Es384 | Algorithm::Es512 => Family::Es,
            Algorithm::None => Family::None,
        }
    }

    /// Digest, absent for `none`
    #[must_use]
    pub fn digest(self) -> Option<ShaDigest> {
        match self {
            Algorithm::Hs256 | Algorithm::Rs256 | Algorithm::Ps256 | Algorithm::Es256 => {
                Some(ShaDigest::Sha256)
            }
            Algorithm::Hs384 | Algorithm::Rs384 | Algorithm::Ps384 | Algorithm::Es384 => {
                Some(ShaDigest::Sha384)
            }
            Algorithm::Hs512 | Algorithm::Rs512 | Algorithm::Ps512 | Algorithm::Es512 => {
                Some(ShaDigest::Sha512)
            }
            Algorithm::None => None,
        }
    }

    /// Digest size in bits, absent for `none`
    #[must_use]
    pub fn digest_bits(self) -> Option<u16> {
        self.digest().map(ShaDigest::bits)
    }
}

impl FromStr for Algorithm {
    type Err = JwsError;

    /// Literal match: `hs256` or `HS257` are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| JwsError::invalid_algorithm(s))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign/verify capability bound to one algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmPair {
    algorithm: Algorithm,
}

impl AlgorithmPair {
    /// Bind to an already parsed algorithm
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    /// The bound algorithm
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign the secured input, returning the base64url signature text
    ///
    /// # Errors
    /// `InvalidKeyType` if the key shape is not accepted for signing with this family,
    /// `InvalidKey` if the key cannot be parsed
    pub fn sign(&self, secured_input: &str, key: &KeyMaterial) -> JwsResult<String> {
        dispatch::sign(self.algorithm, secured_input.as_bytes(), key)
    }

    /// Check `signature` over the secured input. A mismatch is `Ok(false)`.
    ///
    /// # Errors
    /// `InvalidKeyType`/`InvalidKey` for unusable keys, `MalformedSignature` for
    /// ECDSA signatures of the wrong width
    pub fn verify(
        &self,
        secured_input: &str,
        signature: &str,
        key: &KeyMaterial,
    ) -> JwsResult<bool> {
        dispatch::verify(self.algorithm, secured_input.as_bytes(), signature, key)
    }
}

/// Look up the sign/verify pair for an identifier
///
/// # Errors
/// `InvalidAlgorithm` unless `identifier` matches `^(RS|PS|ES|HS)(256|384|512)$|^none$`
pub fn create_algorithm(identifier: &str) -> JwsResult<AlgorithmPair> {
    let algorithm = identifier.parse::<Algorithm>()?;
    tracing::trace!(algorithm = %algorithm, "algorithm selected");
    Ok(AlgorithmPair::new(algorithm))
}
