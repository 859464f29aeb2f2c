//! Signature computation for the signature header.
//!
//! Grounded on `lib/signature.h`/`sign/rpmgensig.c`: the mandatory
//! digests (`RPMSIGTAG_SIZE`/`MD5`/`SHA1`) are always computed;
//! asymmetric signing (DSA/RSA/GPG/PGP) is modeled as a pluggable
//! [`Signer`] since no signing backend ships with this crate — which
//! backend to use is deployment policy, not something the build core
//! should hard-code (see `DESIGN.md`'s Open Question decision).

use md5::{Digest as _, Md5};
use sha1::Sha1;

/// Failures computing or producing a signature.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignError {
    #[error("no signing backend configured for {0:?}")]
    SigGen(AsymmetricAlgorithm),
}

/// The asymmetric signature kinds `lib/signature.h` enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsymmetricAlgorithm {
    Dsa,
    Rsa,
    Gpg,
    Pgp,
}

/// The always-computed digest set for a signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSet {
    pub size: u64,
    pub md5: [u8; 16],
    pub sha1: String,
}

/// Computes the mandatory SIZE/MD5/SHA1 triple over `data` (the
/// concatenation of the header and payload, per the package writer's
/// signing step).
pub fn compute_digests(data: &[u8]) -> DigestSet {
    let mut md5 = Md5::new();
    md5.update(data);
    let md5_digest: [u8; 16] = md5.finalize().into();

    let mut sha1 = Sha1::new();
    sha1.update(data);
    let sha1_digest = sha1.finalize();

    DigestSet {
        size: data.len() as u64,
        md5: md5_digest,
        sha1: hex::encode(sha1_digest),
    }
}

/// External-collaborator contract for asymmetric signing. A concrete
/// signer is supplied by the caller (e.g. a GPG or PKCS#1 backend);
/// this crate ships no such backend.
pub trait Signer {
    fn algorithm(&self) -> AsymmetricAlgorithm;
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignError>;
}

/// The always-available digest-only path: computes [`DigestSet`] but
/// refuses any asymmetric signing request.
pub struct NullAsymmetricSigner {
    algorithm: AsymmetricAlgorithm,
}

impl NullAsymmetricSigner {
    pub fn new(algorithm: AsymmetricAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl Signer for NullAsymmetricSigner {
    fn algorithm(&self) -> AsymmetricAlgorithm {
        self.algorithm
    }

    fn sign(&self, _data: &[u8]) -> Result<Vec<u8>, SignError> {
        Err(SignError::SigGen(self.algorithm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_set_reports_correct_size() {
        let digests = compute_digests(b"hello world");
        assert_eq!(digests.size, 11);
        assert_eq!(digests.sha1.len(), 40);
    }

    #[test]
    fn same_input_is_deterministic() {
        let a = compute_digests(b"payload");
        let b = compute_digests(b"payload");
        assert_eq!(a, b);
    }

    #[test]
    fn null_signer_always_fails() {
        let signer = NullAsymmetricSigner::new(AsymmetricAlgorithm::Gpg);
        assert_eq!(signer.sign(b"data").unwrap_err(), SignError::SigGen(AsymmetricAlgorithm::Gpg));
    }
}
