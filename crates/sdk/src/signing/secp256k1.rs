use std::sync::Arc;

use anyhow::{Result, anyhow};
use k256::SecretKey;
use k256::ecdsa::{
    Signature, SigningKey, VerifyingKey,
    signature::hazmat::{PrehashSigner, PrehashVerifier},
};
use k256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use sha2::{Digest, Sha256};

use super::algorithm::{HashAlgorithm, SignatureAlgorithm};
use super::signer::{KeySigner, KeyVerifier};

/// ECDSA signer using the secp256k1 curve.
pub struct Secp256k1Signer {
    signing_key: SigningKey,
}

impl Secp256k1Signer {
    pub fn from_pem(pem: &str) -> Result<Self> {
        let signing_key = match SigningKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(_) => SecretKey::from_sec1_pem(pem)
                .map(SigningKey::from)
                .map_err(|e| anyhow!("invalid secp256k1 private key: {e}"))?,
        };
        Ok(Self { signing_key })
    }

    /// Development key: the SHA-256 hash of the seed becomes the
    /// 32-byte private key.
    pub fn from_seed(seed: &str) -> Result<Self> {
        let hash = Sha256::digest(seed.as_bytes());
        let signing_key = SigningKey::from_bytes((&hash).into())
            .map_err(|e| anyhow!("invalid seed: {e}"))?;
        Ok(Self { signing_key })
    }
}

impl KeySigner for Secp256k1Signer {
    fn sign_digest(&self, digest: &[u8], _hash: HashAlgorithm) -> Result<Vec<u8>> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| anyhow!("secp256k1 sign_prehash failed: {e}"))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn verifier(&self) -> Arc<dyn KeyVerifier> {
        Arc::new(Secp256k1Verifier {
            verifying_key: *self.signing_key.verifying_key(),
        })
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Ecdsa
    }
}

pub struct Secp256k1Verifier {
    verifying_key: VerifyingKey,
}

impl Secp256k1Verifier {
    pub fn from_pem(pem: &str) -> Result<Self> {
        let verifying_key = VerifyingKey::from_public_key_pem(pem)
            .map_err(|e| anyhow!("invalid secp256k1 public key: {e}"))?;
        Ok(Self { verifying_key })
    }
}

impl KeyVerifier for Secp256k1Verifier {
    fn verify_digest(&self, digest: &[u8], signature: &[u8], _hash: HashAlgorithm) -> Result<()> {
        let signature = Signature::from_der(signature)
            .or_else(|_| Signature::from_slice(signature))
            .map_err(|e| anyhow!("malformed ECDSA signature: {e}"))?;
        // k256 only accepts low-S; other signers are not required to normalize.
        let signature = signature.normalize_s().unwrap_or(signature);
        self.verifying_key
            .verify_prehash(digest, &signature)
            .map_err(|e| anyhow!("secp256k1 signature mismatch: {e}"))
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Ecdsa
    }
}
