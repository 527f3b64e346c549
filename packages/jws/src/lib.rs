//! JSON Web Signature (JWS) core
//!
//! This crate provides:
//! - Algorithm dispatch for HS/RS/PS/ES 256/384/512 and `none`
//! - ECDSA signature conversion between DER and the fixed-width JOSE form
//! - Compact serialization: sign, decode, verify and a structural validity check
//! - Streaming sign/verify whose key and payload inputs may arrive in any order
//!
//! ```no_run
//! use cryypt_jws::{Algorithm, Jws};
//!
//! let jws = Jws::builder().with_algorithm(Algorithm::Hs256).with_secret("secret");
//! let token = jws.sign(r#"{"sub":"123"}"#)?;
//! assert!(jws.verify(&token)?);
//! # Ok::<(), cryypt_jws::JwsError>(())
//! ```

pub mod api;
pub mod compact;
pub mod crypto;
mod error;
pub mod stream;
mod types;

pub use api::{
    create_algorithm, Algorithm, AlgorithmPair, AsymmetricKeyType, AsyncJwsResult, Family, Jws,
    JwsBuilder, KeyHandle, KeyKind, KeyMaterial, KeyObject, ShaDigest,
};
pub use error::*;
pub use stream::{
    SignStream, SignStreamBuilder, StreamEvent, StreamState, Verified, VerifyStream,
    VerifyStreamBuilder,
};
pub use types::*;
