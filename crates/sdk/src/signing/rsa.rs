use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::algorithm::{HashAlgorithm, SignatureAlgorithm};
use super::signer::{KeySigner, KeyVerifier};

const RSA_KEY_BITS: usize = 2048;

fn padding_scheme(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

/// RSA PKCS#1 v1.5 signer.
pub struct RsaSigner {
    private_key: RsaPrivateKey,
}

impl RsaSigner {
    /// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1 (`BEGIN RSA PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let private_key = match RsaPrivateKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(_) => RsaPrivateKey::from_pkcs1_pem(pem).context("parsing RSA private key")?,
        };
        Ok(Self { private_key })
    }

    /// Development key: the SHA-256 hash of the seed seeds a deterministic
    /// CSPRNG used for RSA key generation.
    pub fn from_seed(seed: &str) -> Result<Self> {
        let hash = Sha256::digest(seed.as_bytes());
        let mut rng = ChaCha20Rng::from_seed(hash.into());
        let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS)
            .context("generating RSA key from seed")?;
        Ok(Self { private_key })
    }
}

impl KeySigner for RsaSigner {
    fn sign_digest(&self, digest: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>> {
        self.private_key
            .sign(padding_scheme(hash), digest)
            .map_err(|e| anyhow!("rsa signing failed: {e}"))
    }

    fn verifier(&self) -> Arc<dyn KeyVerifier> {
        Arc::new(RsaVerifier {
            public_key: self.private_key.to_public_key(),
        })
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Rsa
    }
}

pub struct RsaVerifier {
    public_key: RsaPublicKey,
}

impl RsaVerifier {
    /// Accepts SubjectPublicKeyInfo or PKCS#1 (`BEGIN RSA PUBLIC KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let public_key = match RsaPublicKey::from_public_key_pem(pem) {
            Ok(key) => key,
            Err(_) => RsaPublicKey::from_pkcs1_pem(pem).context("parsing RSA public key")?,
        };
        Ok(Self { public_key })
    }
}

impl KeyVerifier for RsaVerifier {
    fn verify_digest(&self, digest: &[u8], signature: &[u8], hash: HashAlgorithm) -> Result<()> {
        self.public_key
            .verify(padding_scheme(hash), digest, signature)
            .map_err(|e| anyhow!("rsa signature mismatch: {e}"))
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        SignatureAlgorithm::Rsa
    }
}
