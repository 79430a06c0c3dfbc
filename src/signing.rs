//! The signing integration point (§4.12). Out of scope: certificate handling, PKCS#7/CMS
//! construction, and trust validation all live on the caller's side of this trait; the
//! engine only reserves the placeholder and substitutes the returned bytes.

use std::fmt;

/// A digest algorithm identifier passed through to the injected [`Signer`] unchanged
/// (the engine does not interpret it — it only needs to know how many placeholder bytes
/// a detached PKCS#7 signature of this kind is expected to take).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

/// Propagated verbatim into [`crate::error::Error::Signing`].
#[derive(Debug, Clone)]
pub struct SignError(pub String);

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SignError {}

/// `sign(covered, algo) -> signature bytes` (§4.12). `covered` is the exact plaintext the
/// `/ByteRange` entry will cover — the file up to the `/Contents` placeholder concatenated
/// with the file from just after it to EOF — not a pre-computed digest: this crate carries
/// no hashing dependency, so hashing `covered` under `algo` is this implementation's job,
/// same as the rest of the PKCS#7/CMS construction. Implementations wrap whatever keeps the
/// private key out of process memory longer than necessary — an HSM call, a KMS round trip,
/// a PKCS#11 session — the engine only ever sees the returned DER bytes.
pub trait Signer {
    fn sign(&self, covered: &[u8], algo: DigestAlgorithm) -> Result<Vec<u8>, SignError>;

    /// Upper bound on the encoded signature's byte length, used to size the
    /// `/Contents` placeholder before the signature can be computed. Defaults to the
    /// value typical for a detached PKCS#7 CMS blob over an RSA-2048 or P-256 key.
    fn max_signature_len(&self) -> usize {
        16 * 1024
    }
}
