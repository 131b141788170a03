//! Key primitives behind the HTTP signature scheme.

mod algorithm;
mod keys;
mod p256;
mod rsa;
mod secp256k1;
mod signer;

pub use algorithm::{HashAlgorithm, SignatureAlgorithm};
pub use keys::{signer_from_pem, verifier_from_pem};
pub use self::p256::{P256Signer, P256Verifier};
pub use self::rsa::{RsaSigner, RsaVerifier};
pub use secp256k1::{Secp256k1Signer, Secp256k1Verifier};
pub use signer::{KeySigner, KeyVerifier};
