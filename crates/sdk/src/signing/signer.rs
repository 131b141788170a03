use std::sync::Arc;

use super::algorithm::{HashAlgorithm, SignatureAlgorithm};

/// Private half of a key pair, able to sign request digests.
///
/// Implementations are sync because signing is CPU-bound.
/// For async backends (e.g. KMS), use `spawn_blocking`.
pub trait KeySigner: Send + Sync {
    /// Sign a digest that was produced with `hash`. Returns the encoded
    /// signature bytes as they travel on the wire.
    fn sign_digest(&self, digest: &[u8], hash: HashAlgorithm) -> anyhow::Result<Vec<u8>>;

    /// Matching public half.
    fn verifier(&self) -> Arc<dyn KeyVerifier>;

    fn algorithm(&self) -> SignatureAlgorithm;
}

/// Public half of a key pair.
pub trait KeyVerifier: Send + Sync {
    /// Check `signature` over a digest produced with `hash`.
    fn verify_digest(
        &self,
        digest: &[u8],
        signature: &[u8],
        hash: HashAlgorithm,
    ) -> anyhow::Result<()>;

    fn algorithm(&self) -> SignatureAlgorithm;
}
