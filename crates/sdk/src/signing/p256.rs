use std::sync::Arc;

use anyhow::{Result, anyhow};
use p256::SecretKey;
use p256::ecdsa::{
    Signature, SigningKey, VerifyingKey,
    signature::hazmat::{PrehashSigner, PrehashVerifier},
};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};

use super::algorithm::{HashAlgorithm, SignatureAlgorithm};
use super::signer::{KeySigner, KeyVerifier};

/// ECDSA signer on the NIST P-256 curve.
///
/// Signatures are deterministic (RFC 6979) and DER encoded, which is what
/// OpenSSL-based counterparts produce and expect.
pub struct P256Signer {
    signing_key: SigningKey,
}

impl P256Signer {
    /// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) or SEC1 (`BEGIN EC PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let signing_key = match SigningKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(_) => SecretKey::from_sec1_pem(pem)
                .map(SigningKey::from)
                .map_err(|e| anyhow!("invalid P-256 private key: {e}"))?,
        };
        Ok(Self { signing_key })
    }

    /// Raw 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|e| anyhow!("invalid P-256 scalar: {e}"))?;
        Ok(Self { signing_key })
    }
}

impl KeySigner for P256Signer {
    fn sign_digest(&self, digest: &[u8], _hash: HashAlgorithm) -> Result<Vec<u8>> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| anyhow!("p256 sign_prehash failed: {e}"))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn verifier(&self) -> Arc<dyn KeyVerifier> {
        Arc::new(P256Verifier {
            verifying_key: *self.signing_key.verifying_key(),
        })
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Ecdsa
    }
}

pub struct P256Verifier {
    verifying_key: VerifyingKey,
}

impl P256Verifier {
    /// SubjectPublicKeyInfo PEM (`BEGIN PUBLIC KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let verifying_key = VerifyingKey::from_public_key_pem(pem)
            .map_err(|e| anyhow!("invalid P-256 public key: {e}"))?;
        Ok(Self { verifying_key })
    }
}

impl KeyVerifier for P256Verifier {
    fn verify_digest(&self, digest: &[u8], signature: &[u8], _hash: HashAlgorithm) -> Result<()> {
        // DER is the wire form; fixed-width r || s is accepted as well.
        let signature = Signature::from_der(signature)
            .or_else(|_| Signature::from_slice(signature))
            .map_err(|e| anyhow!("malformed ECDSA signature: {e}"))?;
        self.verifying_key
            .verify_prehash(digest, &signature)
            .map_err(|e| anyhow!("p256 signature mismatch: {e}"))
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Ecdsa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALAR: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];

    fn test_signer() -> P256Signer {
        P256Signer::from_bytes(&SCALAR).unwrap()
    }

    #[test]
    fn deterministic_signing() {
        let signer = test_signer();
        let digest = HashAlgorithm::Sha256.digest(b"hello");
        let sig1 = signer.sign_digest(&digest, HashAlgorithm::Sha256).unwrap();
        let sig2 = signer.sign_digest(&digest, HashAlgorithm::Sha256).unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn signature_is_der_sequence() {
        let signer = test_signer();
        let digest = HashAlgorithm::Sha256.digest(b"data");
        let sig = signer.sign_digest(&digest, HashAlgorithm::Sha256).unwrap();
        assert_eq!(sig[0], 0x30, "DER signatures start with a SEQUENCE tag");
        assert!(sig.len() <= 72);
    }

    #[test]
    fn signature_verifies() {
        let signer = test_signer();
        let digest = HashAlgorithm::Sha256.digest(b"verify me");
        let sig = signer.sign_digest(&digest, HashAlgorithm::Sha256).unwrap();
        signer
            .verifier()
            .verify_digest(&digest, &sig, HashAlgorithm::Sha256)
            .unwrap();
    }

    #[test]
    fn raw_signature_form_is_accepted() {
        let signer = test_signer();
        let digest = HashAlgorithm::Sha256.digest(b"raw");
        let der = signer.sign_digest(&digest, HashAlgorithm::Sha256).unwrap();
        let raw = Signature::from_der(&der).unwrap().to_bytes().to_vec();
        assert_eq!(raw.len(), 64);
        signer
            .verifier()
            .verify_digest(&digest, &raw, HashAlgorithm::Sha256)
            .unwrap();
    }

    #[test]
    fn longer_digests_are_supported() {
        let signer = test_signer();
        let digest = HashAlgorithm::Sha512.digest(b"long");
        let sig = signer.sign_digest(&digest, HashAlgorithm::Sha512).unwrap();
        signer
            .verifier()
            .verify_digest(&digest, &sig, HashAlgorithm::Sha512)
            .unwrap();
    }

    #[test]
    fn wrong_digest_is_rejected() {
        let signer = test_signer();
        let sig = signer
            .sign_digest(&HashAlgorithm::Sha256.digest(b"a"), HashAlgorithm::Sha256)
            .unwrap();
        let result = signer.verifier().verify_digest(
            &HashAlgorithm::Sha256.digest(b"b"),
            &sig,
            HashAlgorithm::Sha256,
        );
        assert!(result.is_err());
    }

    #[test]
    fn garbage_pem_is_rejected() {
        assert!(P256Signer::from_pem("not a key").is_err());
        assert!(P256Verifier::from_pem("not a key").is_err());
    }
}
