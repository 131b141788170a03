use std::sync::Arc;

use anyhow::{Result, bail};

use super::p256::{P256Signer, P256Verifier};
use super::rsa::{RsaSigner, RsaVerifier};
use super::secp256k1::{Secp256k1Signer, Secp256k1Verifier};
use super::signer::{KeySigner, KeyVerifier};

/// Detects the key type of a PEM private key.
///
/// P-256 is tried first since it is the curve the services issue.
pub fn signer_from_pem(pem: &str) -> Result<Arc<dyn KeySigner>> {
    let pem = pem.trim();
    if let Ok(signer) = P256Signer::from_pem(pem) {
        return Ok(Arc::new(signer));
    }
    if let Ok(signer) = Secp256k1Signer::from_pem(pem) {
        return Ok(Arc::new(signer));
    }
    if let Ok(signer) = RsaSigner::from_pem(pem) {
        return Ok(Arc::new(signer));
    }
    bail!("unrecognized private key: expected a P-256, secp256k1 or RSA PEM key")
}

/// Detects the key type of a PEM public key.
pub fn verifier_from_pem(pem: &str) -> Result<Arc<dyn KeyVerifier>> {
    let pem = pem.trim();
    if let Ok(verifier) = P256Verifier::from_pem(pem) {
        return Ok(Arc::new(verifier));
    }
    if let Ok(verifier) = Secp256k1Verifier::from_pem(pem) {
        return Ok(Arc::new(verifier));
    }
    if let Ok(verifier) = RsaVerifier::from_pem(pem) {
        return Ok(Arc::new(verifier));
    }
    bail!("unrecognized public key: expected a P-256, secp256k1 or RSA PEM key")
}
