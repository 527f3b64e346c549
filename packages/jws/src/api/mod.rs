//! Public JWS API
//!
//! Algorithm dispatch, key material, the fluent builder and async result handles.

pub mod algorithms;
pub mod builder;
pub mod keys;
pub mod validation;

pub use algorithms::{create_algorithm, Algorithm, AlgorithmPair, Family, ShaDigest};
pub use builder::{Jws, JwsBuilder};
pub use keys::{AsymmetricKeyType, KeyHandle, KeyKind, KeyMaterial, KeyObject};
pub use validation::AsyncJwsResult;
