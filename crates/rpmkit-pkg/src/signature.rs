//! SignatureHeader assembly (spec.md §4.F step 3): SIZE/MD5/SHA1 plus
//! an optional asymmetric signature via the [`rpmkit_sign::Signer`]
//! contract.

use rpmkit_header::{tags, Header, TagValue};
use rpmkit_sign::Signer;

use crate::error::PkgError;

/// Builds the SignatureHeader for a finished package body.
///
/// `header_bytes` is the serialized main Header alone (for the
/// header-only SHA1 digest); `whole_file_bytes` is the Header followed
/// by the compressed payload (for SIZE/MD5, and for an optional
/// asymmetric signature over the whole file).
pub fn build(header_bytes: &[u8], whole_file_bytes: &[u8], signer: Option<&dyn Signer>) -> Result<Header, PkgError> {
    let digests = rpmkit_sign::compute_digests(whole_file_bytes);
    let header_sha1 = rpmkit_sign::compute_digests(header_bytes).sha1;

    let mut sig = Header::new();
    sig.put(tags::SIG_SIZE, TagValue::U32(vec![digests.size as u32]))?;
    sig.put(tags::SIG_MD5, TagValue::Bin(digests.md5.to_vec()))?;
    sig.put(tags::SIG_SHA1, TagValue::Str(header_sha1))?;

    if let Some(signer) = signer {
        use rpmkit_sign::AsymmetricAlgorithm::*;
        let (tag, signed_range) = match signer.algorithm() {
            Dsa => (tags::SIG_DSA, header_bytes),
            Rsa => (tags::SIG_RSA, header_bytes),
            Gpg => (tags::SIG_GPG, whole_file_bytes),
            Pgp => (tags::SIG_PGP, whole_file_bytes),
        };
        let signature = signer.sign(signed_range)?;
        sig.put(tag, TagValue::Bin(signature))?;
    }

    sig.reload(tags::HEADER_SIGNATURES)?;
    Ok(sig)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records the exact byte slice it was asked to sign, so tests can
    /// assert which range (header-only vs. whole-file) reached it.
    struct RecordingSigner {
        algorithm: rpmkit_sign::AsymmetricAlgorithm,
        seen: RefCell<Option<Vec<u8>>>,
    }

    impl rpmkit_sign::Signer for RecordingSigner {
        fn algorithm(&self) -> rpmkit_sign::AsymmetricAlgorithm {
            self.algorithm
        }

        fn sign(&self, data: &[u8]) -> Result<Vec<u8>, rpmkit_sign::SignError> {
            *self.seen.borrow_mut() = Some(data.to_vec());
            Ok(vec![0xAB])
        }
    }

    #[test]
    fn dsa_and_rsa_sign_the_header_only() {
        let header_bytes = b"header-only";
        let whole_file = b"header-only-plus-payload";
        for algorithm in [rpmkit_sign::AsymmetricAlgorithm::Dsa, rpmkit_sign::AsymmetricAlgorithm::Rsa] {
            let signer = RecordingSigner { algorithm, seen: RefCell::new(None) };
            build(header_bytes, whole_file, Some(&signer)).unwrap();
            assert_eq!(signer.seen.borrow().as_deref(), Some(&header_bytes[..]));
        }
    }

    #[test]
    fn gpg_and_pgp_sign_the_whole_file() {
        let header_bytes = b"header-only";
        let whole_file = b"header-only-plus-payload";
        for algorithm in [rpmkit_sign::AsymmetricAlgorithm::Gpg, rpmkit_sign::AsymmetricAlgorithm::Pgp] {
            let signer = RecordingSigner { algorithm, seen: RefCell::new(None) };
            build(header_bytes, whole_file, Some(&signer)).unwrap();
            assert_eq!(signer.seen.borrow().as_deref(), Some(&whole_file[..]));
        }
    }

    #[test]
    fn builds_size_md5_sha1_without_signer() {
        let header_bytes = b"fake-header";
        let whole_file = b"fake-header-plus-payload";
        let sig = build(header_bytes, whole_file, None).unwrap();
        assert!(sig.is_entry(tags::SIG_SIZE));
        assert!(sig.is_entry(tags::SIG_MD5));
        assert!(sig.is_entry(tags::SIG_SHA1));
        assert!(sig.is_entry(tags::HEADER_SIGNATURES));
    }

    #[test]
    fn propagates_signer_refusal() {
        let signer = rpmkit_sign::NullAsymmetricSigner::new(rpmkit_sign::AsymmetricAlgorithm::Gpg);
        let result = build(b"h", b"f", Some(&signer));
        assert!(matches!(result, Err(PkgError::SigGen(_))));
    }
}
