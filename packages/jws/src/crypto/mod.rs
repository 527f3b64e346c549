//! Signature encoding helpers shared by the algorithm implementations

pub mod ecdsa_format;
